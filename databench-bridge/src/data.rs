//! Wire data types
//!
//! Frames exchanged with the remote analysis, process notices and the small
//! payload helpers shared by the bindings and widgets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reserved payload key carrying a trigger's process identifier
pub const ACTION_ID_KEY: &str = "__action_id";

/// Reserved signal on which the remote reports process start/end
pub const PROCESS_SIGNAL: &str = "__action";

/// Client-generated process identifier
pub type ProcessId = u64;

/// One message on the wire: `{"signal": ..., "load": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub signal: String,
    #[serde(default)]
    pub load: Value,
}

impl Frame {
    pub fn new(signal: impl Into<String>, load: Value) -> Self {
        Self {
            signal: signal.into(),
            load,
        }
    }

    /// Decode a frame from JSON text
    pub fn decode(text: &str) -> crate::BridgeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode the frame as JSON text
    pub fn encode(&self) -> crate::BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Lifecycle status reported for a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Start,
    End,
    /// Any status this layer does not act on
    Other(String),
}

impl ProcessStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "start" => ProcessStatus::Start,
            "end" => ProcessStatus::End,
            other => ProcessStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Start => write!(f, "start"),
            ProcessStatus::End => write!(f, "end"),
            ProcessStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Load of a `__action` frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessNotice {
    pub id: ProcessId,
    pub status: String,
}

impl ProcessNotice {
    pub fn status(&self) -> ProcessStatus {
        ProcessStatus::parse(&self.status)
    }
}

/// Payload object carrying a process identifier under the reserved key
pub fn process_payload(process_id: ProcessId) -> Value {
    let mut map = Map::new();
    map.insert(ACTION_ID_KEY.to_string(), Value::from(process_id));
    Value::Object(map)
}

/// Strings pass through, everything else is serialized as compact JSON
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Scalars pass through as text, objects and arrays become indented JSON
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}
