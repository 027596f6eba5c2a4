//! Image binding
//!
//! Channel → element only. The load is expected to be a ready-to-use source
//! string (URL or data URI).

use crate::binding::{value_text, Binding, ElementKind};
use crate::channel::Channel;
use crate::naming::BindingNames;
use crate::target::Target;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

pub struct ImageBinding {
    target: Target,
    names: BindingNames,
}

impl ImageBinding {
    pub fn new(target: Target, names: BindingNames) -> Self {
        Self { target, names }
    }
}

impl Binding for ImageBinding {
    fn kind(&self) -> ElementKind {
        ElementKind::Image
    }

    fn names(&self) -> &BindingNames {
        &self.names
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn value(&self) -> Value {
        Value::String(self.target.src())
    }

    fn set_value(&self, value: &Value) {
        self.target.set_src(&value_text(value));
    }

    fn render(&self) {}

    fn attach(self: Arc<Self>, channel: Arc<dyn Channel>) {
        let weak = Arc::downgrade(&self);
        channel.on(
            &self.names.wire_signal,
            Arc::new(move |value: &Value| {
                if let Some(image) = weak.upgrade() {
                    image.set_value(value);
                }
            }),
        );
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
