//! Shared types used across all pinweave crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The value carried by agent pins.
///
/// Pins are generic, but agents wire heterogeneous children together, so
/// every agent pin carries a dynamic JSON value.
pub type Payload = serde_json::Value;

/// Unique identifier for an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic ID (for testing).
    pub fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(0, seed))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent-{}", self.0.simple())
    }
}

/// Opaque token returned by every subscribe call.
///
/// Pass it back to the channel it came from to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

impl Subscription {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Runtime failure reported by an agent on its `error` channel.
///
/// These are never returned from pin operations; they are observable only
/// by subscribing to [`crate::agent::Agent::on_error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentError {
    pub message: String,
    /// The agent that reported the failure, if known.
    pub source: Option<AgentId>,
}

impl AgentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: AgentId) -> Self {
        self.source = Some(source);
        self
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(id) => write!(f, "{} (from {})", self.message, id),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<&str> for AgentError {
    fn from(message: &str) -> Self {
        AgentError::new(message)
    }
}

impl From<String> for AgentError {
    fn from(message: String) -> Self {
        AgentError::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_ids_are_stable() {
        assert_eq!(AgentId::from_seed(7), AgentId::from_seed(7));
        assert_ne!(AgentId::from_seed(7), AgentId::from_seed(8));
    }

    #[test]
    fn agent_error_normalizes_strings() {
        let err: AgentError = "boom".into();
        assert_eq!(err.message, "boom");
        assert!(err.source.is_none());

        let id = AgentId::from_seed(1);
        let err = err.with_source(id);
        assert_eq!(err.to_string(), format!("boom (from {})", id));
    }
}
