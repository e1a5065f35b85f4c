//! # Pinweave Agents
//!
//! Composite agents and the reference node kinds they are built from.
//!
//! - **Composite** — an agent that owns child nodes and mirrors its own pins
//!   on the inside so children can be wired to them
//! - **Relay**, **State**, **Switch**, **Value**, **Expr** — small leaf nodes
//! - **Call** — a facade over a node created from a [`NodeRegistry`](registry::NodeRegistry)
//!
//! ## Quick Start
//!
//! ```rust
//! use pinweave_agents::prelude::*;
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let counter = Composite::new(
//!     Signature::new().inputs(["set"]).outputs(["value"]),
//!     Rc::new(NodeRegistry::new()),
//!     |c| {
//!         let state = c.state("count", 0)?;
//!         c.input("set")?.connect(state.agent().input("value")?);
//!         state.agent().output("value")?.connect(c.output("value")?);
//!         Ok(())
//!     },
//! )
//! .unwrap();
//!
//! counter.agent().input("set").unwrap().receive(json!(3));
//! assert_eq!(counter.agent().output("value").unwrap().last(), Some(json!(3)));
//! ```

pub mod composite;
pub mod registry;
pub mod relay;
pub mod state;
pub mod switch;
pub mod value;
pub mod expr;
pub mod call;
pub mod prelude;
