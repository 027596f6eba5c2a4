//! Bridge configuration
//!
//! Per-element behavior comes from attributes only. This holds the widget
//! defaults (log bounds, banner element, disabled class), loadable from
//! YAML, TOML or JSON. Every field has a default.

use crate::error::{BridgeError, BridgeResult};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub log: LogConfig,
    pub status: StatusConfig,
    pub trigger: TriggerConfig,
}

/// Rolling log widget
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Id of the element the log renders into
    pub element_id: String,
    /// Signal categories recorded in both directions
    pub signals: Vec<String>,
    /// Maximum number of entries kept
    pub limit_number: usize,
    /// Maximum rendered characters per entry
    pub limit_length: usize,
    /// Minimum width of the source label
    pub label_width: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            element_id: "log".to_string(),
            signals: vec!["log".to_string(), "warn".to_string(), "error".to_string()],
            limit_number: 20,
            limit_length: 250,
            label_width: 8,
        }
    }
}

/// Deduplicated status banner
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatusConfig {
    pub element_id: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            element_id: "databench-alerts".to_string(),
        }
    }
}

/// Trigger presentation
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriggerConfig {
    /// Class applied while a process is outstanding
    pub disabled_class: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            disabled_class: "disabled".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Load from a `.yaml`/`.yml`, `.toml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigIo {
            path: display.clone(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, &extension).map_err(|e| match e {
            BridgeError::ConfigParse { message, .. } => BridgeError::ConfigParse {
                path: display,
                message,
            },
            other => other,
        })
    }

    /// Parse config text in the given format (`yaml`, `yml`, `toml`, `json`)
    pub fn parse(content: &str, format: &str) -> BridgeResult<Self> {
        let parse_error = |message: String| BridgeError::ConfigParse {
            path: format!("<{}>", format),
            message,
        };
        match format {
            "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
            "toml" => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            "json" => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            other => Err(BridgeError::UnsupportedConfig(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.log.element_id, "log");
        assert_eq!(config.log.signals, vec!["log", "warn", "error"]);
        assert_eq!(config.log.limit_number, 20);
        assert_eq!(config.log.limit_length, 250);
        assert_eq!(config.status.element_id, "databench-alerts");
        assert_eq!(config.trigger.disabled_class, "disabled");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "log:\n  limit_number: 5\n  signals: [log]\n";
        let config = BridgeConfig::parse(yaml, "yaml").unwrap();
        assert_eq!(config.log.limit_number, 5);
        assert_eq!(config.log.signals, vec!["log"]);
        assert_eq!(config.log.limit_length, 250);
        assert_eq!(config.status, StatusConfig::default());
    }

    #[test]
    fn test_toml_and_json() {
        let toml = "[status]\nelement_id = \"alerts\"\n";
        let config = BridgeConfig::parse(toml, "toml").unwrap();
        assert_eq!(config.status.element_id, "alerts");

        let json = r#"{"trigger": {"disabled_class": "busy"}}"#;
        let config = BridgeConfig::parse(json, "json").unwrap();
        assert_eq!(config.trigger.disabled_class, "busy");
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(matches!(
            BridgeConfig::parse("", "ini"),
            Err(BridgeError::UnsupportedConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = BridgeConfig::from_path("/nonexistent/databench.yaml").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigIo { .. }));
    }
}
