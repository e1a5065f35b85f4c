//! Error types for circuit construction and blueprint loading.

use pinweave_core::error::PinError;
use thiserror::Error;

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, CircuitError>;

#[derive(Debug, Error)]
pub enum CircuitError {
    /// Pin-level failure (unknown tag, lock violation, proxy misuse, ...).
    #[error(transparent)]
    Pin(#[from] PinError),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("duplicate node name: {0}")]
    DuplicateName(String),

    /// An endpoint that is not of the form `node.tag`.
    #[error("malformed endpoint {0:?}, expected `node.tag`")]
    Endpoint(String),

    #[error("unsupported blueprint format: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CircuitError {
    pub fn unknown_node(name: impl Into<String>) -> Self {
        CircuitError::UnknownNode(name.into())
    }
}
