//! Databench slowpi demo
//!
//! Builds a headless page, wires it to a [`LocalChannel`] and runs a
//! simulated Monte-Carlo pi analysis on a worker thread:
//!
//! ```text
//!  page ──emit──▶ LocalChannel ──outbound──▶ analysis thread
//!   ▲                  │                          │
//!   └──bindings◀──deliver_frame◀──inbound (JSON)──┘
//! ```
//!
//! Usage: `databench-slowpi [config.yaml|config.toml|config.json]`

mod analysis;

use anyhow::{Context, Result};
use databench_bridge::{
    BindableTarget, BridgeConfig, EventKind, HeadlessElement, LocalChannel, RangeBinding, TriggerBinding,
    WiringBuilder,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long to wait for the analysis before giving up
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

struct Page {
    body: Arc<HeadlessElement>,
    run: Arc<HeadlessElement>,
    samples: Arc<HeadlessElement>,
    samples_label: Arc<HeadlessElement>,
    pi: Arc<HeadlessElement>,
    uncertainty: Arc<HeadlessElement>,
    log: Arc<HeadlessElement>,
    alerts: Arc<HeadlessElement>,
}

impl Page {
    fn build(config: &BridgeConfig) -> Self {
        let alerts = HeadlessElement::new("div")
            .with_attr("id", &config.status.element_id)
            .into_shared();
        let run = HeadlessElement::new("button")
            .with_attr("data-action", "run")
            .with_text("Run")
            .into_shared();
        let samples_label = HeadlessElement::new("label")
            .with_attr("for", "samples")
            .with_text("Samples:")
            .into_shared();
        let samples = HeadlessElement::new("input")
            .with_attr("type", "range")
            .with_attr("id", "samples")
            .with_attr("value", "1000")
            .with_attr("min", "100")
            .with_attr("max", "10000")
            .with_attr("step", "100")
            .into_shared();
        let pi = HeadlessElement::new("span").with_attr("id", "pi").into_shared();
        let uncertainty = HeadlessElement::new("span")
            .with_attr("id", "uncertainty")
            .into_shared();
        let footer = HeadlessElement::new("span")
            .with_attr("data-skipwire", "true")
            .with_text("slowpi demo")
            .into_shared();
        let log = HeadlessElement::new("pre")
            .with_attr("id", &config.log.element_id)
            .into_shared();

        let body = HeadlessElement::new("body")
            .with_child(alerts.clone())
            .with_child(run.clone())
            .with_child(samples_label.clone())
            .with_child(samples.clone())
            .with_child(pi.clone())
            .with_child(uncertainty.clone())
            .with_child(log.clone())
            .with_child(footer)
            .into_shared();

        Self {
            body,
            run,
            samples,
            samples_label,
            pi,
            uncertainty,
            log,
            alerts,
        }
    }

    fn print(&self) {
        println!("{}", self.samples_label.text());
        println!("pi = {} ± {}", self.pi.text(), self.uncertainty.text());
        println!("--- log ---\n{}", self.log.text());
        let alerts = self.alerts.text();
        if !alerts.is_empty() {
            println!("--- alerts ---\n{}", alerts);
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut builder = WiringBuilder::new();
    if let Some(path) = std::env::args().nth(1) {
        builder = builder
            .config_file(&path)
            .with_context(|| format!("loading config {}", path))?;
    }
    let config = builder.current_config().clone();
    let page = Page::build(&config);
    let wiring = builder.document(page.body.clone()).build()?;

    let channel = LocalChannel::shared();
    wiring.wire_all(channel.clone());

    let range = wiring
        .find::<RangeBinding>("samples")
        .context("samples slider not wired")?;
    range.set_label_format(Arc::new(|v: f64| format!("{} draws", v)));
    let trigger = wiring
        .find::<TriggerBinding>("run")
        .context("run button not wired")?;

    let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded::<String>();
    let outbound = channel.outbound();
    let worker = thread::spawn(move || analysis::serve(outbound, inbound_tx, 1000));

    // Move the slider, release it, then start a run
    page.samples.set_value("5000");
    page.samples.dispatch(EventKind::Input);
    page.samples.dispatch(EventKind::Change);
    page.run.dispatch(EventKind::Click);
    info!("Run started: {:?}", trigger.state());

    while trigger.state().is_active() {
        let text = inbound_rx
            .recv_timeout(RESPONSE_TIMEOUT)
            .context("analysis stopped responding")?;
        if let Err(e) = channel.deliver_frame(&text) {
            warn!("Inbound frame rejected: {}", e);
        }
    }
    // Drain whatever arrived after the end notice
    for text in inbound_rx.try_iter() {
        if let Err(e) = channel.deliver_frame(&text) {
            warn!("Inbound frame rejected: {}", e);
        }
    }

    page.print();

    // Dropping every channel handle closes the outbound queue
    drop((range, trigger, wiring, channel));
    if worker.join().is_err() {
        warn!("Analysis thread panicked");
    }
    Ok(())
}
