//! Node registry — named factories for nodes created by path.
//!
//! Composites use the registry to resolve `call` children. Registrations and
//! creations are announced on the `registered` and `created` channels.

use crate::relay::Relay;
use crate::state::State;
use pinweave_core::error::{PinError, Result};
use pinweave_core::node::Node;
use pinweave_core::topic::Channel;
use pinweave_core::types::{AgentId, Payload};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

pub type NodeFactory = Rc<dyn Fn() -> Result<Rc<dyn Node>>>;

/// Announcement of a node created through the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Created {
    pub path: String,
    pub id: AgentId,
}

pub struct NodeRegistry {
    factories: RefCell<HashMap<String, NodeFactory>>,
    registered: Channel<String>,
    created: Channel<Created>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: RefCell::new(HashMap::new()),
            registered: Channel::new("registered"),
            created: Channel::new("created"),
        }
    }

    /// A registry preloaded with the parameterless node kinds:
    /// `std/relay` and `std/state` (initially `null`).
    pub fn standard() -> Self {
        let registry = Self::new();
        registry
            .register("std/relay", || Ok(Rc::new(Relay::new()?) as Rc<dyn Node>))
            .register("std/state", || {
                Ok(Rc::new(State::new(Payload::Null)?) as Rc<dyn Node>)
            });
        registry
    }

    /// Register a factory under `path`, replacing any previous one.
    pub fn register(
        &self,
        path: impl Into<String>,
        factory: impl Fn() -> Result<Rc<dyn Node>> + 'static,
    ) -> &Self {
        let path = path.into();
        let replaced = self
            .factories
            .borrow_mut()
            .insert(path.clone(), Rc::new(factory))
            .is_some();
        debug!(%path, replaced, "factory registered");
        self.registered.fire(&path);
        self
    }

    pub fn registered(&self, path: &str) -> bool {
        self.factories.borrow().contains_key(path)
    }

    pub fn resolve(&self, path: &str) -> Option<NodeFactory> {
        self.factories.borrow().get(path).cloned()
    }

    /// Create a fresh node from the factory at `path`.
    pub fn create(&self, path: &str) -> Result<Rc<dyn Node>> {
        // Clone the factory out so it may itself use the registry.
        let factory = self
            .resolve(path)
            .ok_or_else(|| PinError::unknown_path(path))?;
        let node = factory()?;
        let id = node.agent().id();
        debug!(%path, agent = %id, kind = node.kind(), "node created");
        self.created.fire(&Created {
            path: path.to_string(),
            id,
        });
        Ok(node)
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.factories.borrow().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn on_registered(&self) -> &Channel<String> {
        &self.registered
    }

    pub fn on_created(&self) -> &Channel<Created> {
        &self.created
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
