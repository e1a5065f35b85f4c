//! # Pinweave Core
//!
//! Pins, pin maps, topics and agents: the typed, reactive port-and-signal
//! graph every pinweave component is built on.
//!
//! - **Topic** — named event channels with synchronous, ordered delivery
//! - **Pins** — [`InputPin`](pin::InputPin), [`OutputPin`](pin::OutputPin),
//!   [`SignalPin`](pin::SignalPin) and [`ControlPin`](pin::ControlPin)
//! - **PinMap** — ordered, tag-keyed, lockable pin collections
//! - **Agent** — three locked pin maps plus a control pin, built from a
//!   [`Signature`](signature::Signature)
//! - **Proxy** — a facade agent delegating to a core agent
//!
//! Everything is single-threaded and synchronous: a `send` returns only
//! after every downstream subscriber has run.
//!
//! ## Quick Start
//!
//! ```rust
//! use pinweave_core::prelude::*;
//! use serde_json::json;
//!
//! let doubler = Agent::builder(Signature::new().inputs(["x"]).outputs(["y"]))
//!     .bind(|agent| {
//!         let y = agent.output("y")?.clone();
//!         agent.input("x")?.subscribe(move |v| {
//!             y.send(json!(v.as_i64().unwrap_or(0) * 2));
//!         });
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! doubler.input("x").unwrap().receive(json!(21));
//! assert_eq!(doubler.output("y").unwrap().last(), Some(json!(42)));
//! ```

pub mod types;
pub mod error;
pub mod topic;
pub mod pin;
pub mod pinmap;
pub mod signature;
pub mod agent;
pub mod proxy;
pub mod node;
pub mod prelude;
