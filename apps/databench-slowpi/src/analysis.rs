//! Simulated remote analysis
//!
//! Stands in for the kernel behind the channel. Consumes the page's outbound
//! frames and answers with encoded inbound frames:
//! - `run` → `__action` start, a `log` + `data` pair per batch, `__action` end
//! - `samples` → stored and echoed back as `data`

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use databench_bridge::{Frame, ACTION_ID_KEY, PROCESS_SIGNAL};
use rand::Rng;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Batches per run; one `data` update each
const BATCHES: u64 = 10;

pub struct SlowPi {
    samples: u64,
    inbound: Sender<String>,
}

impl SlowPi {
    pub fn new(samples: u64, inbound: Sender<String>) -> Self {
        Self { samples, inbound }
    }

    fn send(&self, signal: &str, load: Value) -> Result<()> {
        let text = Frame::new(signal, load).encode()?;
        self.inbound
            .send(text)
            .map_err(|_| anyhow!("page closed while sending '{}'", signal))
    }

    pub fn on_frame(&mut self, frame: Frame) -> Result<()> {
        match frame.signal.as_str() {
            "run" => {
                let id = frame
                    .load
                    .get(ACTION_ID_KEY)
                    .and_then(Value::as_u64)
                    .context("run without process id")?;
                self.run(id)
            }
            "samples" => {
                let samples = frame.load.as_f64().context("samples must be numeric")?;
                self.samples = samples.max(1.0) as u64;
                info!("Samples set to {}", self.samples);
                self.send("data", json!({ "samples": self.samples }))
            }
            other => {
                debug!("Analysis ignoring '{}'", other);
                Ok(())
            }
        }
    }

    fn run(&self, process_id: u64) -> Result<()> {
        self.send(PROCESS_SIGNAL, json!({ "id": process_id, "status": "start" }))?;

        let mut rng = rand::thread_rng();
        let per_batch = (self.samples / BATCHES).max(1);
        let mut inside = 0u64;
        let mut draws = 0u64;
        for _ in 0..BATCHES {
            for _ in 0..per_batch {
                let (x, y): (f64, f64) = (rng.gen(), rng.gen());
                if x * x + y * y <= 1.0 {
                    inside += 1;
                }
            }
            draws += per_batch;

            let p = inside as f64 / draws as f64;
            let uncertainty = 4.0 * (p * (1.0 - p) / draws as f64).sqrt();
            self.send("log", json!({ "draws": draws, "inside": inside }))?;
            self.send(
                "data",
                json!({
                    "pi": round(4.0 * p, 4),
                    "uncertainty": round(uncertainty, 4),
                }),
            )?;
        }

        self.send(PROCESS_SIGNAL, json!({ "id": process_id, "status": "end" }))
    }
}

fn round(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Serve frames until the page side goes away
pub fn serve(outbound: Receiver<Frame>, inbound: Sender<String>, samples: u64) {
    let mut analysis = SlowPi::new(samples, inbound);
    for frame in outbound.iter() {
        if let Err(e) = analysis.on_frame(frame) {
            warn!("Analysis error: {}", e);
            if analysis.send("error", json!(e.to_string())).is_err() {
                break;
            }
        }
    }
    info!("Analysis stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn decoded(rx: &Receiver<String>) -> Vec<Frame> {
        rx.try_iter().map(|text| Frame::decode(&text).unwrap()).collect()
    }

    #[test]
    fn test_run_brackets_updates_with_process_notices() {
        let (tx, rx) = unbounded();
        let mut analysis = SlowPi::new(100, tx);
        analysis
            .on_frame(Frame::new("run", json!({ "__action_id": 5 })))
            .unwrap();

        let frames = decoded(&rx);
        assert_eq!(frames.len(), 2 + 2 * BATCHES as usize);
        assert_eq!(frames[0].load, json!({ "id": 5, "status": "start" }));
        assert_eq!(frames.last().unwrap().load, json!({ "id": 5, "status": "end" }));

        let pi = frames[frames.len() - 2].load["pi"].as_f64().unwrap();
        assert!((0.0..=4.0).contains(&pi));
    }

    #[test]
    fn test_samples_echoed() {
        let (tx, rx) = unbounded();
        let mut analysis = SlowPi::new(100, tx);
        analysis.on_frame(Frame::new("samples", json!(2500))).unwrap();
        assert_eq!(decoded(&rx), vec![Frame::new("data", json!({ "samples": 2500 }))]);
    }

    #[test]
    fn test_run_without_id_fails() {
        let (tx, _rx) = unbounded();
        let mut analysis = SlowPi::new(100, tx);
        assert!(analysis.on_frame(Frame::new("run", json!({}))).is_err());
    }
}
