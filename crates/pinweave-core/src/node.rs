//! Node — the contract every addable unit satisfies.
//!
//! Hosts and composites treat every node uniformly through its [`Agent`]:
//! they never reach into a node's private state.

use crate::agent::Agent;
use std::any::Any;
use std::rc::Rc;

/// Upcasting helper so `dyn Node` can be downcast to its concrete type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

pub trait Node: AsAny {
    /// The agent exposing this node's pins.
    fn agent(&self) -> &Agent;

    /// Short kind name, used in logs and circuit descriptions.
    fn kind(&self) -> &'static str {
        "agent"
    }

    fn reset(&self) {
        self.agent().reset();
    }

    fn cleanup(&self) {
        self.agent().cleanup();
    }
}

impl Node for Agent {
    fn agent(&self) -> &Agent {
        self
    }
}

/// Downcast a shared node to its concrete type.
pub fn downcast_node<T: Node + Any>(node: Rc<dyn Node>) -> Option<Rc<T>> {
    node.into_any().downcast::<T>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;

    #[test]
    fn agents_are_nodes() {
        let agent = Agent::new(Signature::new().inputs(["a"])).unwrap();
        let id = agent.id();
        let node: Rc<dyn Node> = Rc::new(agent);

        assert_eq!(node.kind(), "agent");
        assert_eq!(node.agent().id(), id);
        assert!((*node).as_any().is::<Agent>());

        let back = downcast_node::<Agent>(node).unwrap();
        assert_eq!(back.id(), id);
    }
}
