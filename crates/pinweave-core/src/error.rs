//! Error types for pinweave operations.
//!
//! Structural failures (unknown tags, topology violations) are returned as
//! [`PinError`]. Application failures inside an agent are not errors in this
//! sense: they are emitted on the agent's `error` channel as
//! [`AgentError`](crate::types::AgentError).

use crate::types::{AgentError, AgentId};
use thiserror::Error;

/// Result type for pinweave operations.
pub type Result<T> = std::result::Result<T, PinError>;

/// Errors that can occur while building or wiring a pin graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PinError {
    /// Lookup of a tag that was never declared.
    #[error("tag not found: {tag}")]
    TagNotFound { tag: String },

    /// Attempt to attach a pin or add a child after lock.
    #[error("topology is locked, cannot add {tag}")]
    Locked { tag: String },

    /// The same tag was declared twice.
    #[error("duplicate tag: {tag}")]
    DuplicateTag { tag: String },

    /// Emit or lookup on a topic channel that was never defined.
    #[error("unknown channel: {channel}")]
    UnknownChannel { channel: String },

    /// A topic channel was requested with the wrong event type.
    #[error("channel {channel} carries a different event type")]
    ChannelType { channel: String },

    /// The node registry has no factory for this path.
    #[error("no factory registered for path: {path}")]
    UnknownPath { path: String },

    /// The facade is already delegating to a core.
    #[error("{id} is already proxied")]
    AlreadyProxied { id: AgentId },

    /// Application-level failure surfaced through a fallible API.
    #[error("runtime error: {0}")]
    Runtime(AgentError),
}

impl From<AgentError> for PinError {
    fn from(e: AgentError) -> Self {
        PinError::Runtime(e)
    }
}

// Convenience constructors
impl PinError {
    pub fn tag_not_found(tag: impl Into<String>) -> Self {
        PinError::TagNotFound { tag: tag.into() }
    }

    pub fn locked(tag: impl Into<String>) -> Self {
        PinError::Locked { tag: tag.into() }
    }

    pub fn duplicate_tag(tag: impl Into<String>) -> Self {
        PinError::DuplicateTag { tag: tag.into() }
    }

    pub fn unknown_channel(channel: impl Into<String>) -> Self {
        PinError::UnknownChannel {
            channel: channel.into(),
        }
    }

    pub fn unknown_path(path: impl Into<String>) -> Self {
        PinError::UnknownPath { path: path.into() }
    }

    /// Whether this error is a topology violation (late mutation).
    pub fn is_topology_violation(&self) -> bool {
        matches!(self, PinError::Locked { .. })
    }
}
