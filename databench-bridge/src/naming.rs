//! Naming resolution
//!
//! Every binding derives two names from its element's attributes:
//!
//! - the *action name* it emits under:
//!   `data-action` → `name` → `id` → `element<ordinal>`
//! - the *wire signal* it listens to:
//!   `data-signal` (bare, or `signal:field`), otherwise the same chain as the
//!   action name wrapped as `{data: <name>}`
//!
//! The ordinal comes from a [`NameOrdinal`] shared by all bindings of one
//! wiring context and is drawn once per binding, whether or not the fallback
//! name ends up being used.

use crate::target::{BindableTarget, ATTR_ACTION, ATTR_SIGNAL};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Signal carrying datastore updates from the remote analysis
pub const DATA_SIGNAL: &str = "data";

/// Separator in `data-signal="signal:field"`
pub const SIGNAL_SEPARATOR: char = ':';

/// Prefix of synthesized fallback names
pub const FALLBACK_PREFIX: &str = "element";

/// Monotonic counter handing out fallback ordinals
///
/// Clones share the same counter. Access happens from the event loop only,
/// so relaxed ordering is sufficient.
#[derive(Debug, Clone, Default)]
pub struct NameOrdinal {
    next: Arc<AtomicU64>,
}

impl NameOrdinal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next ordinal
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Ordinal the next binding will receive
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }

    /// Restart numbering at zero
    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}

/// What inbound messages a binding listens to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireSignal {
    /// Receive the full load of this signal
    Bare(String),
    /// Receive `load[field]` whenever `signal` fires
    Field { signal: String, field: String },
}

impl WireSignal {
    pub fn field(signal: impl Into<String>, field: impl Into<String>) -> Self {
        WireSignal::Field {
            signal: signal.into(),
            field: field.into(),
        }
    }

    /// Signal name the channel subscribes to
    pub fn signal(&self) -> &str {
        match self {
            WireSignal::Bare(signal) => signal,
            WireSignal::Field { signal, .. } => signal,
        }
    }

    /// Project an inbound load; `None` when the field is absent
    pub fn project<'a>(&self, load: &'a Value) -> Option<&'a Value> {
        match self {
            WireSignal::Bare(_) => Some(load),
            WireSignal::Field { field, .. } => load.as_object()?.get(field),
        }
    }

    /// JSON form: a string, or a single-entry `{signal: field}` object
    pub fn to_value(&self) -> Value {
        match self {
            WireSignal::Bare(signal) => Value::String(signal.clone()),
            WireSignal::Field { signal, field } => {
                let mut map = Map::new();
                map.insert(signal.clone(), Value::String(field.clone()));
                Value::Object(map)
            }
        }
    }
}

impl fmt::Display for WireSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireSignal::Bare(signal) => write!(f, "{}", signal),
            WireSignal::Field { signal, field } => write!(f, "{}{}{}", signal, SIGNAL_SEPARATOR, field),
        }
    }
}

/// Resolved identity of one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingNames {
    pub action_name: String,
    pub wire_signal: WireSignal,
    pub ordinal: u64,
}

impl BindingNames {
    /// Draw an ordinal and resolve both names
    pub fn resolve(target: &dyn BindableTarget, ordinal: &NameOrdinal) -> Self {
        let ordinal = ordinal.next();
        Self {
            action_name: resolve_action_name(target, ordinal),
            wire_signal: resolve_wire_signal(target, ordinal),
            ordinal,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn identifying_name(target: &dyn BindableTarget, ordinal: u64) -> String {
    non_empty(target.attribute(ATTR_ACTION))
        .or_else(|| non_empty(target.attribute("name")))
        .or_else(|| non_empty(target.id()))
        .unwrap_or_else(|| format!("{}{}", FALLBACK_PREFIX, ordinal))
}

/// `data-action` → `name` → `id` → `element<ordinal>`
pub fn resolve_action_name(target: &dyn BindableTarget, ordinal: u64) -> String {
    identifying_name(target, ordinal)
}

/// `data-signal` if present, else `{data: <action name chain>}`
pub fn resolve_wire_signal(target: &dyn BindableTarget, ordinal: u64) -> WireSignal {
    match non_empty(target.attribute(ATTR_SIGNAL)) {
        Some(signal) => parse_signal_attribute(&signal),
        None => WireSignal::field(DATA_SIGNAL, identifying_name(target, ordinal)),
    }
}

/// `"signal:field"` maps, anything without a separator stays bare
pub fn parse_signal_attribute(raw: &str) -> WireSignal {
    match raw.split_once(SIGNAL_SEPARATOR) {
        Some((signal, field)) => WireSignal::field(signal, field),
        None => WireSignal::Bare(raw.to_string()),
    }
}
