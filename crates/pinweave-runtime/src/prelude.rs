//! Pinweave Runtime Prelude — convenient imports for hosting circuits.
//!
//! ```rust
//! use pinweave_runtime::prelude::*;
//! ```

pub use crate::blueprint::{Blueprint, NodeDecl, NodeSpec, ProxyDecl, SignalDecl, WireDecl};
pub use crate::circuit::{Circuit, CircuitEvent, CircuitSnapshot, Emission, Endpoint, Relation};
pub use crate::error::CircuitError;
