//! Text display binding
//!
//! Channel → element only. Structured loads render as indented JSON,
//! scalars as plain text.

use crate::binding::{Binding, ElementKind};
use crate::channel::Channel;
use crate::data::display_text;
use crate::naming::BindingNames;
use crate::target::Target;
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Hook turning an inbound load into display text
pub type TextFormat = Arc<dyn Fn(&Value) -> String + Send + Sync>;

pub struct TextDisplayBinding {
    target: Target,
    names: BindingNames,
    format: RwLock<TextFormat>,
}

impl TextDisplayBinding {
    pub fn new(target: Target, names: BindingNames) -> Self {
        Self {
            target,
            names,
            format: RwLock::new(Arc::new(display_text)),
        }
    }

    pub fn set_format(&self, format: TextFormat) {
        *self.format.write() = format;
    }
}

impl Binding for TextDisplayBinding {
    fn kind(&self) -> ElementKind {
        ElementKind::TextDisplay
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
        let format = self.format.read().clone();
        self.target.set_text(&format(value));
    }

    fn render(&self) {}

    fn attach(self: Arc<Self>, channel: Arc<dyn Channel>) {
        let weak = Arc::downgrade(&self);
        channel.on(
            &self.names.wire_signal,
            Arc::new(move |value: &Value| {
                if let Some(display) = weak.upgrade() {
                    display.set_value(value);
                }
            }),
        );
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::LocalChannel;
    use crate::headless::HeadlessElement;
    use crate::naming::NameOrdinal;
    use crate::target::BindableTarget;
    use serde_json::json;

    #[test]
    fn test_renders_data_field() {
        let el = HeadlessElement::new("span").with_attr("id", "pi").into_shared();
        let names = BindingNames::resolve(el.as_ref(), &NameOrdinal::new());
        let display = Arc::new(TextDisplayBinding::new(el.clone(), names));
        let channel = LocalChannel::shared();
        display.clone().attach(channel.clone());

        channel.deliver("data", json!({"pi": 3.14}));
        assert_eq!(el.text(), "3.14");

        channel.deliver("data", json!({"pi": {"estimate": 3}}));
        assert_eq!(el.text(), "{\n  \"estimate\": 3\n}");
        assert!(channel.drain_outbound().is_empty());
    }

    #[test]
    fn test_bare_signal_and_custom_format() {
        let el = HeadlessElement::new("span")
            .with_attr("data-signal", "status")
            .into_shared();
        let names = BindingNames::resolve(el.as_ref(), &NameOrdinal::new());
        let display = Arc::new(TextDisplayBinding::new(el.clone(), names));
        display.set_format(Arc::new(|v: &Value| format!("pi ~ {}", v["pi-estimate"])));
        let channel = LocalChannel::shared();
        display.clone().attach(channel.clone());

        channel.deliver("status", json!({"pi-estimate": 3.1}));
        assert_eq!(el.text(), "pi ~ 3.1");
    }
}
