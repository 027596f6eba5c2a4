//! Binding interface
//!
//! A [`Binding`] connects one element to the channel under its resolved
//! names. The dispatcher only ever sees this capability set; the concrete
//! variants live in [`crate::widgets`].
//!
//! Inbound values arrive through [`Binding::set_value`], which never emits.
//! Emission happens only on local interaction paths inside each variant.

use crate::channel::Channel;
use crate::naming::{BindingNames, WireSignal};
use crate::target::{BindableTarget, Target};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Element kinds the dispatcher knows how to bind, in wiring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<button>`
    Trigger,
    /// `<input type="text">`
    TextInput,
    /// `<span>`
    TextDisplay,
    /// `<input type="range">`
    RangeInput,
    /// `<img data-signal=...>`
    Image,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Trigger,
        ElementKind::TextInput,
        ElementKind::TextDisplay,
        ElementKind::RangeInput,
        ElementKind::Image,
    ];

    /// Whether the element is of this kind (skip/bound checks aside)
    pub fn matches(&self, target: &dyn BindableTarget) -> bool {
        let tag = target.tag();
        match self {
            ElementKind::Trigger => tag == "button",
            ElementKind::TextInput => tag == "input" && input_type(target) == "text",
            ElementKind::TextDisplay => tag == "span",
            ElementKind::RangeInput => tag == "input" && input_type(target) == "range",
            ElementKind::Image => {
                tag == "img"
                    && target
                        .attribute(crate::target::ATTR_SIGNAL)
                        .is_some_and(|signal| !signal.is_empty())
            }
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Trigger => "trigger",
            ElementKind::TextInput => "text-input",
            ElementKind::TextDisplay => "text-display",
            ElementKind::RangeInput => "range-input",
            ElementKind::Image => "image",
        };
        write!(f, "{}", name)
    }
}

fn input_type(target: &dyn BindableTarget) -> String {
    target
        .attribute("type")
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_default()
}

/// One element wired to the channel
pub trait Binding: Send + Sync {
    fn kind(&self) -> ElementKind;

    fn names(&self) -> &BindingNames;

    fn target(&self) -> &Target;

    /// Current value as the remote would receive it
    fn value(&self) -> Value;

    /// Apply an inbound value; never emits
    fn set_value(&self, value: &Value);

    /// Re-apply presentation from current state
    fn render(&self);

    /// Subscribe to the channel and to local events
    fn attach(self: Arc<Self>, channel: Arc<dyn Channel>);

    /// Upcast for typed lookups
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn action_name(&self) -> &str {
        &self.names().action_name
    }

    fn wire_signal(&self) -> &WireSignal {
        &self.names().wire_signal
    }
}

/// Text form of an inbound scalar (`null` becomes empty)
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessElement;

    #[test]
    fn test_kind_matching() {
        let text = HeadlessElement::new("input").with_attr("type", "text");
        let untyped = HeadlessElement::new("input");
        let range = HeadlessElement::new("input").with_attr("type", "range");
        let checkbox = HeadlessElement::new("input").with_attr("type", "checkbox");
        let img = HeadlessElement::new("img").with_attr("id", "plot");
        let signal_img = HeadlessElement::new("img").with_attr("data-signal", "plot");
        let empty_signal_img = HeadlessElement::new("img").with_attr("data-signal", "");

        assert!(ElementKind::TextInput.matches(&text));
        assert!(!ElementKind::TextInput.matches(&untyped));
        assert!(ElementKind::RangeInput.matches(&range));
        assert!(!ElementKind::TextInput.matches(&range));
        assert!(!ElementKind::TextInput.matches(&checkbox));
        assert!(!ElementKind::Image.matches(&img));
        assert!(ElementKind::Image.matches(&signal_img));
        assert!(!ElementKind::Image.matches(&empty_signal_img));
        assert!(ElementKind::Trigger.matches(&HeadlessElement::new("button")));
        assert!(ElementKind::TextDisplay.matches(&HeadlessElement::new("span")));
    }
}
