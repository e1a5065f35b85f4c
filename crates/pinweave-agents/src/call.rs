//! Call — a facade delegating to a node created from the registry.
//!
//! The facade shares the core's signature and is proxied to it, so the call
//! behaves exactly like the core from the outside.

use crate::registry::NodeRegistry;
use pinweave_core::agent::Agent;
use pinweave_core::error::Result;
use pinweave_core::node::Node;
use std::rc::Rc;

pub struct Call {
    agent: Agent,
    path: String,
    core: Rc<dyn Node>,
}

impl Call {
    pub fn new(path: impl Into<String>, registry: &NodeRegistry) -> Result<Self> {
        let path = path.into();
        let core = registry.create(&path)?;
        let agent = Agent::new(core.agent().signature().clone())?;
        agent.proxy(core.agent())?;
        Ok(Self { agent, path, core })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn core(&self) -> &Rc<dyn Node> {
        &self.core
    }
}

impl Node for Call {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "call"
    }

    fn reset(&self) {
        self.agent.reset_with(|| self.core.reset());
    }

    fn cleanup(&self) {
        self.agent.cleanup();
        self.core.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::Relay;
    use pinweave_core::error::PinError;
    use serde_json::json;

    fn registry() -> NodeRegistry {
        let registry = NodeRegistry::new();
        registry.register("std/relay", || Ok(Rc::new(Relay::new()?) as Rc<dyn Node>));
        registry
    }

    #[test]
    fn behaves_like_the_core() {
        let registry = registry();
        let call = Call::new("std/relay", &registry).unwrap();

        assert!(call.agent().is_proxied());
        assert_eq!(call.agent().core(), Some(call.core().agent().id()));

        call.agent().input("in").unwrap().receive(json!(7));
        assert_eq!(call.agent().output("out").unwrap().last(), Some(json!(7)));
    }

    #[test]
    fn cleanup_reaches_the_core() {
        let registry = registry();
        let call = Call::new("std/relay", &registry).unwrap();
        call.cleanup();
        assert!(call.agent().is_cleaned());
        assert!(call.core().agent().is_cleaned());
    }

    #[test]
    fn unknown_path() {
        let registry = registry();
        assert!(matches!(
            Call::new("nope", &registry),
            Err(PinError::UnknownPath { .. })
        ));
    }
}
