//! Error types for the request engine.
//!
//! These cover failures that are not themselves OGC exceptions: malformed
//! markup and configuration that cannot be decoded. Codecs translate them
//! into protocol exceptions at their boundary.

use thiserror::Error;

/// Result type alias using WmsError.
pub type WmsResult<T> = Result<T, WmsError>;

/// Primary error type for non-protocol failures.
#[derive(Debug, Error)]
pub enum WmsError {
    // === Markup Errors ===
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Unexpected root element: expected {expected}, found {found}")]
    UnexpectedRoot { expected: String, found: String },

    #[error("Invalid content in <{element}>: {message}")]
    InvalidContent { element: String, message: String },

    // === Configuration Errors ===
    #[error("Invalid capabilities configuration: {0}")]
    Config(String),
}

impl WmsError {
    /// True for failures where the input is not well-formed markup at all.
    pub fn is_malformed(&self) -> bool {
        matches!(self, WmsError::MalformedXml(_))
    }
}

impl From<serde_json::Error> for WmsError {
    fn from(err: serde_json::Error) -> Self {
        WmsError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for WmsError {
    fn from(err: serde_yaml::Error) -> Self {
        WmsError::Config(format!("YAML error: {}", err))
    }
}
