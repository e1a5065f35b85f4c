//! # Pinweave Runtime
//!
//! Hosting for pinweave graphs.
//!
//! The runtime owns top-level nodes in a [`Circuit`](circuit::Circuit),
//! tracks how they relate by id, and builds circuits from declarative
//! [`Blueprint`](blueprint::Blueprint)s.

pub mod error;
pub mod circuit;
pub mod blueprint;
pub mod prelude;
