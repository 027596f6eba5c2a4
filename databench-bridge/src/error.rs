//! Bridge error types
//!
//! Binding operations never fail outward; these errors only surface at the
//! transport seam (frame decoding, outbound queue) and while loading config.

use thiserror::Error;

/// Errors produced by the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Inbound frame could not be decoded
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Outbound queue receiver was dropped
    #[error("channel closed, dropped emission for '{0}'")]
    ChannelClosed(String),

    /// Wiring was built without a document root
    #[error("no document root to wire")]
    MissingDocument,

    /// No element with the requested id in the subtree
    #[error("element not found: #{0}")]
    ElementNotFound(String),

    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Config file has an extension we cannot load
    #[error("unsupported config format: {0}")]
    UnsupportedConfig(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::MalformedFrame(err.to_string())
    }
}

/// Result alias used across the crate
pub type BridgeResult<T> = Result<T, BridgeError>;
