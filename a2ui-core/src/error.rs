//! Error types for a2ui-core.

use thiserror::Error;

/// Result type alias using a2ui-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the fallible edges of the engine.
///
/// Message processing itself never fails; these surface only when parsing a
/// single line, reading a stream, or loading configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// A line parsed as JSON but is not a recognized protocol message
    #[error("Malformed message: {message}")]
    MalformedMessage {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading the message stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a malformed message error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a malformed message error with source.
    pub fn malformed_with_source(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedMessage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
