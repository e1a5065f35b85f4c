//! Blueprint — a declarative circuit description.
//!
//! Blueprints are read from TOML or JSON:
//!
//! ```toml
//! name = "echo"
//!
//! [[nodes]]
//! name = "a"
//! kind = "relay"
//!
//! [[nodes]]
//! name = "b"
//! kind = "state"
//! initial = 0
//!
//! [[wires]]
//! from = "a.out"
//! to = "b.value"
//! ```

use crate::circuit::{Circuit, Endpoint};
use crate::error::{CircuitError, Result};
use pinweave_agents::call::Call;
use pinweave_agents::registry::NodeRegistry;
use pinweave_agents::relay::Relay;
use pinweave_agents::state::State;
use pinweave_agents::switch::{Switch, SwitchCase};
use pinweave_agents::value::Value;
use pinweave_core::agent::Agent;
use pinweave_core::node::Node;
use pinweave_core::signature::Signature;
use pinweave_core::types::Payload;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// What to build for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeSpec {
    Relay,
    State {
        #[serde(default)]
        initial: Payload,
    },
    Switch {
        cases: Vec<Payload>,
    },
    Value {
        value: Payload,
    },
    /// A node created from the registry entry at `path`.
    Call {
        path: String,
    },
    /// A bare agent, typically a facade proxied to another node.
    Agent {
        #[serde(default)]
        signature: Signature,
    },
}

impl NodeSpec {
    pub fn create(&self, registry: &NodeRegistry) -> Result<Rc<dyn Node>> {
        let node: Rc<dyn Node> = match self {
            NodeSpec::Relay => Rc::new(Relay::new()?),
            NodeSpec::State { initial } => Rc::new(State::new(initial.clone())?),
            NodeSpec::Switch { cases } => Rc::new(Switch::new(
                cases.iter().cloned().map(SwitchCase::Equals),
            )?),
            NodeSpec::Value { value } => Rc::new(Value::new(value.clone())?),
            NodeSpec::Call { path } => Rc::new(Call::new(path.as_str(), registry)?),
            NodeSpec::Agent { signature } => Rc::new(Agent::new(signature.clone())?),
        };
        Ok(node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDecl {
    pub name: String,
    #[serde(flatten)]
    pub spec: NodeSpec,
}

/// `from` output feeds `to` input, both written `node.tag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireDecl {
    pub from: String,
    pub to: String,
}

/// Signal `from` (`node.tag`) activates the control of node `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDecl {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyDecl {
    pub facade: String,
    pub core: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainDecl {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDecl>,
    #[serde(default)]
    pub wires: Vec<WireDecl>,
    #[serde(default)]
    pub signals: Vec<SignalDecl>,
    #[serde(default)]
    pub proxies: Vec<ProxyDecl>,
    #[serde(default)]
    pub contains: Vec<ContainDecl>,
}

impl Blueprint {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a blueprint, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(CircuitError::Format(other.unwrap_or("none").to_string())),
        }
    }

    /// Build the circuit: nodes first, then proxies, containment, wires
    /// and signals.
    pub fn instantiate(&self, registry: Rc<NodeRegistry>) -> Result<Circuit> {
        let mut circuit = Circuit::with_registry(registry);

        for decl in &self.nodes {
            let node = decl.spec.create(circuit.registry())?;
            circuit.insert(decl.name.as_str(), node)?;
        }
        for p in &self.proxies {
            let (facade, core) = (circuit.id_of(&p.facade)?, circuit.id_of(&p.core)?);
            circuit.proxy(facade, core)?;
        }
        for c in &self.contains {
            let (parent, child) = (circuit.id_of(&c.parent)?, circuit.id_of(&c.child)?);
            circuit.adopt(parent, child)?;
        }
        for w in &self.wires {
            circuit.wire(&w.from.parse::<Endpoint>()?, &w.to.parse::<Endpoint>()?)?;
        }
        for s in &self.signals {
            circuit.connect_signal(&s.from.parse::<Endpoint>()?, &s.to)?;
        }

        debug!(
            blueprint = %self.name,
            nodes = circuit.len(),
            wires = self.wires.len(),
            "blueprint instantiated"
        );
        Ok(circuit)
    }
}
