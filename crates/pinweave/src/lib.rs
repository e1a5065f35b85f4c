//! # Pinweave
//!
//! Typed, hierarchical, reactive pin-and-signal graphs.
//!
//! Agents expose named input, output and signal pins declared by a
//! signature. Composites own child agents and wire them to an internal
//! mirror of their own pins. A facade agent can delegate to a core agent,
//! and circuits host whole graphs described by blueprints.
//!
//! ## Quick Start
//!
//! ```rust
//! use pinweave::prelude::*;
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! // A composite whose `x` input flows through a relay to its `y` output.
//! let echo = Composite::new(
//!     Signature::new().inputs(["x"]).outputs(["y"]),
//!     Rc::new(NodeRegistry::new()),
//!     |c| {
//!         let relay = c.relay("r")?;
//!         c.input("x")?.connect(relay.agent().input("in")?);
//!         relay.agent().output("out")?.connect(c.output("y")?);
//!         Ok(())
//!     },
//! )
//! .unwrap();
//!
//! // Host it in a circuit.
//! let mut circuit = Circuit::new();
//! circuit.insert("echo", Rc::new(echo)).unwrap();
//! circuit.send(&Endpoint::new("echo", "x"), json!("hi")).unwrap();
//!
//! let node = circuit.node("echo").unwrap();
//! assert_eq!(node.agent().output("y").unwrap().last(), Some(json!("hi")));
//! ```
//!
//! ## Architecture
//!
//! - [`pinweave_core`] - Topics, pins, pin maps, agents and delegation
//! - [`pinweave_agents`] - Composites, the node registry and leaf node kinds
//! - [`pinweave_runtime`] - Circuits and blueprints
//!
//! ## Delegation
//!
//! ```rust
//! use pinweave::prelude::*;
//! use serde_json::json;
//!
//! let facade = Agent::new(Signature::new().inputs(["x"])).unwrap();
//! let core = Agent::new(Signature::new().inputs(["x"])).unwrap();
//! facade.proxy(&core).unwrap();
//!
//! facade.input("x").unwrap().receive(json!(42));
//! assert_eq!(core.input("x").unwrap().last(), Some(json!(42)));
//! ```

// Re-export all subcrates
pub use pinweave_agents as agents;
pub use pinweave_core as core;
pub use pinweave_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use pinweave::prelude::*;
/// ```
pub mod prelude {
    // Core and agents
    pub use pinweave_agents::prelude::*;

    // Runtime
    pub use pinweave_runtime::blueprint::{Blueprint, NodeSpec};
    pub use pinweave_runtime::circuit::{Circuit, CircuitEvent, Emission, Endpoint, Relation};
    pub use pinweave_runtime::error::CircuitError;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
