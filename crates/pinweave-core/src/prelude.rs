//! Pinweave Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use pinweave_core::prelude::*;
//! ```

pub use crate::types::{AgentError, AgentId, Payload, Subscription};

pub use crate::topic::{Channel, Topic};

pub use crate::pin::{Activation, ControlPin, InputPin, OutputPin, Pin, SignalPin};

pub use crate::pinmap::{Entry, PinMap};

pub use crate::signature::Signature;

pub use crate::agent::{Agent, AgentBuilder, PinFactories, ProxyFlag};

pub use crate::node::{downcast_node, Node};

pub use crate::error::{PinError, Result};
