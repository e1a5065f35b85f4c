//! Pinweave Agents Prelude — convenient imports for building composites.
//!
//! ```rust
//! use pinweave_agents::prelude::*;
//! ```

pub use crate::composite::Composite;
pub use crate::registry::{Created, NodeFactory, NodeRegistry};

pub use crate::call::Call;
pub use crate::expr::{Expr, ExprFn};
pub use crate::relay::Relay;
pub use crate::state::State;
pub use crate::switch::{Switch, SwitchCase};
pub use crate::value::Value;

pub use pinweave_core::prelude::*;
