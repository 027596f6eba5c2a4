//! Trigger binding
//!
//! Binds a `<button>`. A click while idle starts a process: a fresh process
//! id is emitted under the action name (inside the payload hook's output,
//! under `__action_id`) and the button is disabled until the remote reports
//! `end` for that id. Clicks while active are dropped.

use crate::binding::{Binding, ElementKind};
use crate::channel::Channel;
use crate::controller::{ProcessController, ProcessState};
use crate::data::{process_payload, ProcessId, ProcessStatus};
use crate::naming::BindingNames;
use crate::target::{EventKind, Target};
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Hook shaping the activation payload
pub type PayloadFormat = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Button-like element starting remote processes
pub struct TriggerBinding {
    target: Target,
    names: BindingNames,
    /// Idle/Active state machine
    process: ProcessController,
    /// Class applied while active
    disabled_class: String,
    payload_format: RwLock<PayloadFormat>,
    /// Set once attached
    channel: RwLock<Option<Arc<dyn Channel>>>,
}

impl TriggerBinding {
    pub fn new(target: Target, names: BindingNames, disabled_class: &str) -> Self {
        Self {
            target,
            names,
            process: ProcessController::new(),
            disabled_class: disabled_class.to_string(),
            payload_format: RwLock::new(Arc::new(|payload: Value| payload)),
            channel: RwLock::new(None),
        }
    }

    /// Replace the activation payload hook
    pub fn set_payload_format(&self, format: PayloadFormat) {
        *self.payload_format.write() = format;
    }

    pub fn state(&self) -> ProcessState {
        self.process.state()
    }

    /// Local activation path
    ///
    /// Returns the started process id, or `None` when detached or already
    /// active.
    pub fn activate(self: &Arc<Self>) -> Option<ProcessId> {
        let channel = self.channel.read().clone()?;
        let process_id = self.process.begin()?;
        self.render();

        let weak = Arc::downgrade(self);
        channel.on_process(
            process_id,
            Arc::new(move |status: ProcessStatus| {
                if let Some(trigger) = weak.upgrade() {
                    trigger.on_status(process_id, status);
                }
            }),
        );

        let format = self.payload_format.read().clone();
        let payload = format(process_payload(process_id));
        info!(
            "Trigger '{}' started process {}",
            self.names.action_name, process_id
        );
        channel.emit(&self.names.action_name, payload);
        Some(process_id)
    }

    fn on_status(&self, process_id: ProcessId, status: ProcessStatus) {
        if self.process.notify(process_id, &status) {
            self.render();
        }
    }
}

impl Binding for TriggerBinding {
    fn kind(&self) -> ElementKind {
        ElementKind::Trigger
    }

    fn names(&self) -> &BindingNames {
        &self.names
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn value(&self) -> Value {
        Value::String(self.target.text())
    }

    fn set_value(&self, value: &Value) {
        self.target.set_text(&crate::binding::value_text(value));
    }

    fn render(&self) {
        self.target
            .set_class(&self.disabled_class, self.process.is_active());
    }

    fn attach(self: Arc<Self>, channel: Arc<dyn Channel>) {
        *self.channel.write() = Some(channel);

        let weak: Weak<Self> = Arc::downgrade(&self);
        self.target.listen(
            EventKind::Click,
            Arc::new(move || {
                if let Some(trigger) = weak.upgrade() {
                    if trigger.activate().is_none() {
                        debug!("Click on '{}' ignored", trigger.names.action_name);
                    }
                }
            }),
        );
        self.render();
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
