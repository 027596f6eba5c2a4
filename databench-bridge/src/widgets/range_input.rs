//! Range input binding
//!
//! Binds `<input type="range">` plus an optional `<label for=...>`.
//!
//! - stored value → control units via `to_control`, back via `from_control`
//! - `input` (dragging) re-renders the label only
//! - `change` (release) emits the stored value under the action name
//! - inbound values are applied only when they change the raw control value
//!
//! The label's initial text is captured once at construction and used as
//! the prefix of every render: `"<prefix> <formatted value>"`, or just the
//! formatted value when the label starts out empty.

use crate::binding::{Binding, ElementKind};
use crate::channel::Channel;
use crate::naming::BindingNames;
use crate::target::{EventKind, Target};
use parking_lot::RwLock;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// Unit conversion between stored and control values
pub type Transform = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Label formatter for the stored value
pub type LabelFormat = Arc<dyn Fn(f64) -> String + Send + Sync>;

pub struct RangeBinding {
    target: Target,
    names: BindingNames,
    /// Paired label, if any
    label: Option<Target>,
    /// Label text captured at bind time
    label_prefix: String,
    to_control: RwLock<Transform>,
    from_control: RwLock<Transform>,
    label_format: RwLock<LabelFormat>,
    channel: RwLock<Option<Arc<dyn Channel>>>,
}

impl RangeBinding {
    pub fn new(target: Target, names: BindingNames, label: Option<Target>) -> Self {
        let label_prefix = label.as_ref().map(|l| l.text()).unwrap_or_default();
        Self {
            target,
            names,
            label,
            label_prefix,
            to_control: RwLock::new(Arc::new(|v: f64| v)),
            from_control: RwLock::new(Arc::new(|v: f64| v)),
            label_format: RwLock::new(Arc::new(format_number)),
            channel: RwLock::new(None),
        }
    }

    /// Replace both unit transforms; they should be inverses
    pub fn set_transforms(&self, to_control: Transform, from_control: Transform) {
        *self.to_control.write() = to_control;
        *self.from_control.write() = from_control;
        self.render();
    }

    pub fn set_label_format(&self, format: LabelFormat) {
        *self.label_format.write() = format;
        self.render();
    }

    /// Stored value derived from the raw control value
    pub fn get_value(&self) -> f64 {
        let raw = self.target.value();
        let control = raw.trim().parse::<f64>().unwrap_or_else(|_| {
            debug!("Range '{}' has non-numeric value '{}'", self.names.action_name, raw);
            0.0
        });
        let from_control = self.from_control.read().clone();
        from_control(control)
    }

    /// Apply a stored value; returns whether the control changed
    pub fn set_number(&self, value: f64) -> bool {
        let to_control = self.to_control.read().clone();
        let raw = format_number(to_control(value));
        if raw == self.target.value() {
            return false;
        }
        self.target.set_value(&raw);
        self.render();
        true
    }

    /// Local commit path: emit the stored value
    pub fn commit(&self) {
        let Some(channel) = self.channel.read().clone() else {
            debug!("Range '{}' not attached", self.names.action_name);
            return;
        };
        channel.emit(&self.names.action_name, number_value(self.get_value()));
    }
}

impl Binding for RangeBinding {
    fn kind(&self) -> ElementKind {
        ElementKind::RangeInput
    }

    fn names(&self) -> &BindingNames {
        &self.names
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn value(&self) -> Value {
        number_value(self.get_value())
    }

    fn set_value(&self, value: &Value) {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(number) => {
                self.set_number(number);
            }
            None => debug!(
                "Range '{}' ignoring non-numeric value {}",
                self.names.action_name, value
            ),
        }
    }

    fn render(&self) {
        let Some(label) = &self.label else {
            return;
        };
        let format = self.label_format.read().clone();
        let value = format(self.get_value());
        if self.label_prefix.is_empty() {
            label.set_text(&value);
        } else {
            label.set_text(&format!("{} {}", self.label_prefix, value));
        }
    }

    fn attach(self: Arc<Self>, channel: Arc<dyn Channel>) {
        *self.channel.write() = Some(channel.clone());

        let weak = Arc::downgrade(&self);
        channel.on(
            &self.names.wire_signal,
            Arc::new(move |value: &Value| {
                if let Some(range) = weak.upgrade() {
                    range.set_value(value);
                }
            }),
        );

        let weak = Arc::downgrade(&self);
        self.target.listen(
            EventKind::Input,
            Arc::new(move || {
                if let Some(range) = weak.upgrade() {
                    range.render();
                }
            }),
        );

        let weak = Arc::downgrade(&self);
        self.target.listen(
            EventKind::Change,
            Arc::new(move || {
                if let Some(range) = weak.upgrade() {
                    range.commit();
                }
            }),
        );

        self.render();
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Shortest text form of a number (`2500`, `0.5`)
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Integral values become JSON integers, everything else a float
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
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

    fn samples(
        with_label: bool,
    ) -> (
        Arc<HeadlessElement>,
        Option<Arc<HeadlessElement>>,
        Arc<RangeBinding>,
        Arc<LocalChannel>,
    ) {
        let el = HeadlessElement::new("input")
            .with_attr("type", "range")
            .with_attr("id", "samples")
            .with_attr("value", "1000")
            .with_attr("min", "100")
            .with_attr("max", "10000")
            .with_attr("step", "100")
            .into_shared();
        let label = with_label.then(|| {
            HeadlessElement::new("label")
                .with_attr("for", "samples")
                .with_text("Samples:")
                .into_shared()
        });
        let names = BindingNames::resolve(el.as_ref(), &NameOrdinal::new());
        let range = Arc::new(RangeBinding::new(
            el.clone(),
            names,
            label.clone().map(|l| l as Target),
        ));
        let channel = LocalChannel::shared();
        range.clone().attach(channel.clone());
        (el, label, range, channel)
    }

    #[test]
    fn test_samples_scenario() {
        let (el, label, range, _channel) = samples(true);
        let label = label.unwrap();
        assert_eq!(range.get_value(), 1000.0);
        assert_eq!(range.value(), json!(1000));
        assert_eq!(label.text(), "Samples: 1000");

        assert!(range.set_number(2500.0));
        assert_eq!(el.value(), "2500");
        assert!(label.text().contains("2500"));
    }

    #[test]
    fn test_round_trip_boundaries() {
        let (_el, _label, range, _channel) = samples(false);
        for v in [100.0, 200.0, 5000.0, 9900.0, 10000.0, 0.5] {
            range.set_number(v);
            assert_eq!(range.get_value(), v);
        }
    }

    #[test]
    fn test_equal_value_does_not_render() {
        let (el, label, range, channel) = samples(true);
        let label = label.unwrap();
        let writes = label.content_writes();
        let value_writes = el.value_writes();

        assert!(!range.set_number(1000.0));
        channel.deliver("data", json!({"samples": 1000}));
        channel.deliver("data", json!({"samples": "1000"}));
        assert_eq!(label.content_writes(), writes);
        assert_eq!(el.value_writes(), value_writes);

        channel.deliver("data", json!({"samples": 3000}));
        assert_eq!(label.content_writes(), writes + 1);
        assert_eq!(el.value_writes(), value_writes + 1);
        assert!(channel.drain_outbound().is_empty());
    }

    #[test]
    fn test_drag_renders_release_emits() {
        let (el, label, _range, channel) = samples(true);
        let label = label.unwrap();

        el.set_value("4200");
        el.dispatch(EventKind::Input);
        assert_eq!(label.text(), "Samples: 4200");
        assert!(channel.drain_outbound().is_empty());

        el.dispatch(EventKind::Change);
        let frames = channel.drain_outbound();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].signal, "samples");
        assert_eq!(frames[0].load, json!(4200));
    }

    #[test]
    fn test_transforms() {
        let (el, label, range, channel) = samples(true);
        let label = label.unwrap();
        range.set_transforms(
            Arc::new(|v: f64| v / 10.0),
            Arc::new(|v: f64| v * 10.0),
        );
        range.set_label_format(Arc::new(|v: f64| format!("{:.1}k", v / 1000.0)));
        assert_eq!(label.text(), "Samples: 10.0k");

        range.set_number(2000.0);
        assert_eq!(el.value(), "200");
        assert_eq!(label.text(), "Samples: 2.0k");

        el.dispatch(EventKind::Change);
        assert_eq!(channel.drain_outbound()[0].load, json!(2000));
    }

    #[test]
    fn test_empty_label_has_no_leading_space() {
        let el = HeadlessElement::new("input")
            .with_attr("type", "range")
            .with_attr("id", "r")
            .with_attr("value", "5")
            .into_shared();
        let label = HeadlessElement::new("label").with_attr("for", "r").into_shared();
        let names = BindingNames::resolve(el.as_ref(), &NameOrdinal::new());
        let range = Arc::new(RangeBinding::new(el, names, Some(label.clone() as Target)));
        range.render();
        assert_eq!(label.text(), "5");
    }

    #[test]
    fn test_number_value() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(0.25), json!(0.25));
    }
}
