//! Text input binding
//!
//! Bidirectional. A committed edit (`change`) emits the formatted value
//! under the action name; keystroke mode additionally emits on every
//! `keyup`. Inbound values are written straight to the control and do not
//! emit.

use crate::binding::{value_text, Binding, ElementKind};
use crate::channel::Channel;
use crate::naming::BindingNames;
use crate::target::{EventKind, ListenerId, Target};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Hook applied to values in both directions
pub type InputFormat = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub struct TextInputBinding {
    target: Target,
    names: BindingNames,
    format: RwLock<InputFormat>,
    /// `keyup` listener while keystroke mode is on
    keystroke_listener: Mutex<Option<ListenerId>>,
    channel: RwLock<Option<Arc<dyn Channel>>>,
}

impl TextInputBinding {
    pub fn new(target: Target, names: BindingNames) -> Self {
        Self {
            target,
            names,
            format: RwLock::new(Arc::new(|value: &str| value.to_string())),
            keystroke_listener: Mutex::new(None),
            channel: RwLock::new(None),
        }
    }

    pub fn set_format(&self, format: InputFormat) {
        *self.format.write() = format;
    }

    /// Current control value through the format hook
    pub fn text(&self) -> String {
        let format = self.format.read().clone();
        format(&self.target.value())
    }

    /// Local commit path: emit the current value
    pub fn commit(&self) {
        let Some(channel) = self.channel.read().clone() else {
            debug!("Text input '{}' not attached", self.names.action_name);
            return;
        };
        channel.emit(&self.names.action_name, Value::String(self.text()));
    }

    /// Emit on every keystroke as well as on commit
    ///
    /// Enabling twice keeps a single listener; disabling when off is a no-op.
    pub fn trigger_on_keystroke(self: &Arc<Self>, enabled: bool) {
        let mut listener = self.keystroke_listener.lock();
        match (enabled, *listener) {
            (true, None) => {
                let weak = Arc::downgrade(self);
                let id = self.target.listen(
                    EventKind::KeyUp,
                    Arc::new(move || {
                        if let Some(input) = weak.upgrade() {
                            input.commit();
                        }
                    }),
                );
                *listener = Some(id);
            }
            (false, Some(id)) => {
                self.target.unlisten(id);
                *listener = None;
            }
            _ => {}
        }
    }

    pub fn triggers_on_keystroke(&self) -> bool {
        self.keystroke_listener.lock().is_some()
    }
}

impl Binding for TextInputBinding {
    fn kind(&self) -> ElementKind {
        ElementKind::TextInput
    }

    fn names(&self) -> &BindingNames {
        &self.names
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn value(&self) -> Value {
        Value::String(self.text())
    }

    fn set_value(&self, value: &Value) {
        let format = self.format.read().clone();
        self.target.set_value(&format(&value_text(value)));
    }

    fn render(&self) {}

    fn attach(self: Arc<Self>, channel: Arc<dyn Channel>) {
        *self.channel.write() = Some(channel.clone());

        let weak = Arc::downgrade(&self);
        channel.on(
            &self.names.wire_signal,
            Arc::new(move |value: &Value| {
                if let Some(input) = weak.upgrade() {
                    input.set_value(value);
                }
            }),
        );

        let weak = Arc::downgrade(&self);
        self.target.listen(
            EventKind::Change,
            Arc::new(move || {
                if let Some(input) = weak.upgrade() {
                    input.commit();
                }
            }),
        );
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
