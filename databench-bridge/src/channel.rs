//! Channel contract and in-memory router
//!
//! [`Channel`] is the seam towards the transport. Bindings subscribe to wire
//! signals, emit actions, observe outbound categories and follow process
//! lifecycles through it; none of them know how frames travel.
//!
//! [`LocalChannel`] routes everything in memory. A transport feeds it with
//! [`LocalChannel::deliver_frame`] and drains [`LocalChannel::outbound`];
//! tests call [`LocalChannel::deliver`] directly.
//!
//! ```text
//!  transport ──deliver_frame──▶ LocalChannel ──on(wire signal)──▶ bindings
//!                                   │  ▲
//!                 outbound queue ◀──┘  └──emit(action)── bindings
//!                                        (pre_emit interceptors first)
//! ```

use crate::data::{Frame, ProcessId, ProcessNotice, ProcessStatus, PROCESS_SIGNAL};
use crate::error::{BridgeError, BridgeResult};
use crate::naming::WireSignal;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Inbound message callback; receives the projected load
pub type SignalHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Outbound observer; returns the (possibly modified) load
pub type Interceptor = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Process lifecycle callback
pub type ProcessHandler = Arc<dyn Fn(ProcessStatus) + Send + Sync>;

/// Error sink; `None` clears
pub type ErrorSink = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Duplex message channel as consumed by the bindings
pub trait Channel: Send + Sync {
    /// Subscribe to a wire signal
    fn on(&self, signal: &WireSignal, handler: SignalHandler);

    /// Send an action; fire-and-forget
    fn emit(&self, action: &str, load: Value);

    /// Observe/transform outbound loads of one signal category
    fn pre_emit(&self, signal: &str, interceptor: Interceptor);

    /// Follow start/end notifications of one process
    fn on_process(&self, process_id: ProcessId, handler: ProcessHandler);

    /// Install the error sink; the last registration wins
    fn set_error_sink(&self, sink: ErrorSink);

    /// Hand a message (or `None` to clear) to the error sink
    fn report_error(&self, message: Option<&str>);
}

/// In-memory [`Channel`] implementation
pub struct LocalChannel {
    /// Wire signal subscriptions in registration order
    subscriptions: RwLock<Vec<(WireSignal, SignalHandler)>>,
    /// Outbound interceptors by signal category
    interceptors: RwLock<HashMap<String, Vec<Interceptor>>>,
    /// Process handlers by process id
    processes: RwLock<HashMap<ProcessId, Vec<ProcessHandler>>>,
    /// Designated error sink
    error_sink: RwLock<Option<ErrorSink>>,
    /// Outbound frame queue
    outbound_sender: Sender<Frame>,
    outbound_receiver: Receiver<Frame>,
}

impl LocalChannel {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            subscriptions: RwLock::new(Vec::new()),
            interceptors: RwLock::new(HashMap::new()),
            processes: RwLock::new(HashMap::new()),
            error_sink: RwLock::new(None),
            outbound_sender: tx,
            outbound_receiver: rx,
        }
    }

    /// Create a channel ready to be shared with bindings
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Receiver side of the outbound queue, for the transport
    pub fn outbound(&self) -> Receiver<Frame> {
        self.outbound_receiver.clone()
    }

    /// Take every frame emitted so far
    pub fn drain_outbound(&self) -> Vec<Frame> {
        self.outbound_receiver.try_iter().collect()
    }

    /// Number of wire signal subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Number of processes with live handlers
    pub fn open_processes(&self) -> usize {
        self.processes.read().len()
    }

    /// Decode and route one inbound JSON frame
    ///
    /// Decode failures are also reported to the error sink.
    pub fn deliver_frame(&self, text: &str) -> BridgeResult<()> {
        match Frame::decode(text) {
            Ok(frame) => {
                self.deliver(&frame.signal, frame.load);
                Ok(())
            }
            Err(e) => {
                warn!("Dropping inbound frame: {}", e);
                self.report_error(Some(&e.to_string()));
                Err(e)
            }
        }
    }

    /// Route one inbound message to its subscribers
    pub fn deliver(&self, signal: &str, load: Value) {
        if signal == PROCESS_SIGNAL {
            self.deliver_process_notice(&load);
        }

        // Handlers may subscribe or emit while running
        let handlers: Vec<(WireSignal, SignalHandler)> = self
            .subscriptions
            .read()
            .iter()
            .filter(|(wire, _)| wire.signal() == signal)
            .cloned()
            .collect();

        if handlers.is_empty() {
            debug!("No subscribers for signal '{}'", signal);
        }

        for (wire, handler) in handlers {
            if let Some(projected) = wire.project(&load) {
                handler(projected);
            }
        }
    }

    fn deliver_process_notice(&self, load: &Value) {
        let notice: ProcessNotice = match serde_json::from_value(load.clone()) {
            Ok(n) => n,
            Err(e) => {
                debug!("Ignoring malformed process notice {}: {}", load, e);
                return;
            }
        };
        let status = notice.status();

        let handlers = if status == ProcessStatus::End {
            // Process record ends with its end notice
            self.processes.write().remove(&notice.id).unwrap_or_default()
        } else {
            self.processes
                .read()
                .get(&notice.id)
                .cloned()
                .unwrap_or_default()
        };

        debug!(
            "Process {} reported '{}' ({} handlers)",
            notice.id,
            status,
            handlers.len()
        );
        for handler in handlers {
            handler(status.clone());
        }
    }

    fn try_emit(&self, action: &str, load: Value) -> BridgeResult<()> {
        let interceptors: Vec<Interceptor> = self
            .interceptors
            .read()
            .get(action)
            .cloned()
            .unwrap_or_default();
        let load = interceptors
            .into_iter()
            .fold(load, |load, interceptor| interceptor(load));

        self.outbound_sender
            .send(Frame::new(action, load))
            .map_err(|_| BridgeError::ChannelClosed(action.to_string()))
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for LocalChannel {
    fn on(&self, signal: &WireSignal, handler: SignalHandler) {
        debug!("Subscribing to {}", signal);
        self.subscriptions.write().push((signal.clone(), handler));
    }

    fn emit(&self, action: &str, load: Value) {
        if let Err(e) = self.try_emit(action, load) {
            warn!("{}", e);
        }
    }

    fn pre_emit(&self, signal: &str, interceptor: Interceptor) {
        self.interceptors
            .write()
            .entry(signal.to_string())
            .or_default()
            .push(interceptor);
    }

    fn on_process(&self, process_id: ProcessId, handler: ProcessHandler) {
        self.processes
            .write()
            .entry(process_id)
            .or_default()
            .push(handler);
    }

    fn set_error_sink(&self, sink: ErrorSink) {
        *self.error_sink.write() = Some(sink);
    }

    fn report_error(&self, message: Option<&str>) {
        let sink = self.error_sink.read().clone();
        match sink {
            Some(sink) => sink(message),
            None => {
                if let Some(msg) = message {
                    warn!("Unhandled channel error: {}", msg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<Value>>>, SignalHandler) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: SignalHandler = Arc::new(move |v: &Value| sink.lock().push(v.clone()));
        (seen, handler)
    }

    #[test]
    fn test_bare_subscription_gets_full_load() {
        let channel = LocalChannel::new();
        let (seen, handler) = recorder();
        channel.on(&WireSignal::Bare("status".into()), handler);

        channel.deliver("status", json!({"pi-estimate": 3.1}));
        channel.deliver("other", json!(1));
        assert_eq!(*seen.lock(), vec![json!({"pi-estimate": 3.1})]);
    }

    #[test]
    fn test_field_subscription_projects_load() {
        let channel = LocalChannel::new();
        let (seen, handler) = recorder();
        channel.on(&WireSignal::field("data", "samples"), handler);

        channel.deliver("data", json!({"samples": 2500}));
        channel.deliver("data", json!({"other": 1}));
        assert_eq!(*seen.lock(), vec![json!(2500)]);
    }

    #[test]
    fn test_delivery_order_preserved() {
        let channel = LocalChannel::new();
        let (seen, handler) = recorder();
        channel.on(&WireSignal::Bare("log".into()), handler);
        for i in 0..5 {
            channel.deliver("log", json!(i));
        }
        assert_eq!(*seen.lock(), (0..5).map(|i| json!(i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_emit_runs_interceptors_in_order() {
        let channel = LocalChannel::new();
        channel.pre_emit("log", Arc::new(|v: Value| json!([v, "a"])));
        channel.pre_emit("log", Arc::new(|v: Value| json!([v, "b"])));

        channel.emit("log", json!("x"));
        channel.emit("run", json!("y"));

        let frames = channel.drain_outbound();
        assert_eq!(frames[0], Frame::new("log", json!([["x", "a"], "b"])));
        assert_eq!(frames[1], Frame::new("run", json!("y")));
    }

    #[test]
    fn test_process_handlers_dropped_after_end() {
        let channel = LocalChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        channel.on_process(9, Arc::new(move |s: ProcessStatus| sink.lock().push(s)));

        channel.deliver(PROCESS_SIGNAL, json!({"id": 9, "status": "start"}));
        channel.deliver(PROCESS_SIGNAL, json!({"id": 8, "status": "end"}));
        assert_eq!(channel.open_processes(), 1);
        channel.deliver(PROCESS_SIGNAL, json!({"id": 9, "status": "end"}));
        channel.deliver(PROCESS_SIGNAL, json!({"id": 9, "status": "start"}));

        assert_eq!(*seen.lock(), vec![ProcessStatus::Start, ProcessStatus::End]);
        assert_eq!(channel.open_processes(), 0);
    }

    #[test]
    fn test_malformed_frame_reaches_error_sink() {
        let channel = LocalChannel::new();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        channel.set_error_sink(Arc::new(move |m: Option<&str>| {
            sink.lock().push(m.map(str::to_string))
        }));

        assert!(channel.deliver_frame("{oops").is_err());
        assert!(channel.deliver_frame(r#"{"signal":"log","load":"ok"}"#).is_ok());
        let errors = errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_deref().unwrap().starts_with("malformed frame"));
    }

    #[test]
    fn test_error_sink_last_registration_wins() {
        let channel = LocalChannel::new();
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let a = first.clone();
        let b = second.clone();
        channel.set_error_sink(Arc::new(move |_: Option<&str>| *a.lock() += 1));
        channel.set_error_sink(Arc::new(move |_: Option<&str>| *b.lock() += 1));

        channel.report_error(Some("boom"));
        assert_eq!(*first.lock(), 0);
        assert_eq!(*second.lock(), 1);
    }
}
