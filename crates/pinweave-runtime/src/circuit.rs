//! Circuit — an arena of named top-level nodes.
//!
//! Nodes are keyed by their stable [`AgentId`]. Everything the circuit
//! knows about how nodes relate (containment, delegation, wires) is kept as
//! identifier edges in a petgraph graph, so tearing a node down is a matter
//! of removing its id: the node is cleaned up, contained nodes follow, and
//! every edge touching it disappears with it.

use crate::error::{CircuitError, Result};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use pinweave_agents::registry::NodeRegistry;
use pinweave_core::node::Node;
use pinweave_core::types::{AgentId, Payload};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use tracing::{debug, trace};

/// How two nodes of a circuit relate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "relation", rename_all = "lowercase")]
pub enum Relation {
    /// The source owns the target; removing the source removes the target.
    Contains,
    /// The source is a facade delegating to the target.
    Proxies,
    /// Output `output` of the source feeds input `input` of the target.
    Wire { output: String, input: String },
    /// Signal `signal` of the source activates the target's control.
    Signal { signal: String },
}

/// A `node.tag` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: String,
    pub tag: String,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            tag: tag.into(),
        }
    }
}

impl FromStr for Endpoint {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((node, tag)) if !node.is_empty() && !tag.is_empty() => Ok(Self::new(node, tag)),
            _ => Err(CircuitError::Endpoint(s.to_string())),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.tag)
    }
}

/// Event recorded by the circuit as its topology changes.
#[derive(Debug, Clone, Serialize)]
pub enum CircuitEvent {
    Inserted {
        id: AgentId,
        name: String,
        kind: String,
    },
    Related {
        from: AgentId,
        to: AgentId,
        relation: Relation,
    },
    Removed {
        id: AgentId,
        name: String,
    },
}

/// A value seen leaving a node output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emission {
    pub node: String,
    pub tag: String,
    pub value: Payload,
}

/// A serializable view of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: AgentId,
    pub name: String,
    pub kind: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub signals: Vec<String>,
    pub proxied: bool,
}

/// A serializable view of one relation.
#[derive(Debug, Clone, Serialize)]
pub struct RelationSnapshot {
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub relation: Relation,
}

/// A complete serializable view of the circuit.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub relations: Vec<RelationSnapshot>,
}

struct Slot {
    name: String,
    node: Rc<dyn Node>,
    index: NodeIndex,
}

pub struct Circuit {
    slots: HashMap<AgentId, Slot>,
    names: HashMap<String, AgentId>,
    order: Vec<AgentId>,
    graph: StableDiGraph<AgentId, Relation>,
    registry: Rc<NodeRegistry>,
    events: Vec<CircuitEvent>,
}

impl Circuit {
    /// An empty circuit with its own, empty registry.
    pub fn new() -> Self {
        Self::with_registry(Rc::new(NodeRegistry::new()))
    }

    pub fn with_registry(registry: Rc<NodeRegistry>) -> Self {
        Self {
            slots: HashMap::new(),
            names: HashMap::new(),
            order: Vec::new(),
            graph: StableDiGraph::new(),
            registry,
            events: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Rc<NodeRegistry> {
        &self.registry
    }

    /// Insert `node` under a unique `name`.
    pub fn insert(&mut self, name: impl Into<String>, node: Rc<dyn Node>) -> Result<AgentId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(CircuitError::DuplicateName(name));
        }
        let id = node.agent().id();
        let kind = node.kind().to_string();
        let index = self.graph.add_node(id);

        debug!(%name, agent = %id, %kind, "node inserted");
        self.names.insert(name.clone(), id);
        self.order.push(id);
        self.slots.insert(
            id,
            Slot {
                name: name.clone(),
                node,
                index,
            },
        );
        self.events.push(CircuitEvent::Inserted { id, name, kind });
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Result<AgentId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| CircuitError::unknown_node(name))
    }

    pub fn get(&self, id: AgentId) -> Option<&Rc<dyn Node>> {
        self.slots.get(&id).map(|slot| &slot.node)
    }

    /// Look a node up by name.
    pub fn node(&self, name: &str) -> Result<&Rc<dyn Node>> {
        let id = self.id_of(name)?;
        self.get(id).ok_or_else(|| CircuitError::unknown_node(name))
    }

    pub fn name_of(&self, id: AgentId) -> Option<&str> {
        self.slots.get(&id).map(|slot| slot.name.as_str())
    }

    /// Node names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|id| self.name_of(*id))
            .collect()
    }

    pub fn ids(&self) -> &[AgentId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn events(&self) -> &[CircuitEvent] {
        &self.events
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    /// Record that `parent` owns `child`.
    pub fn adopt(&mut self, parent: AgentId, child: AgentId) -> Result<()> {
        self.relate(parent, child, Relation::Contains)
    }

    /// Make `facade` delegate to `core`.
    pub fn proxy(&mut self, facade: AgentId, core: AgentId) -> Result<()> {
        let f = self.require(facade)?;
        let c = self.require(core)?;
        f.agent().proxy(c.agent())?;
        self.relate(facade, core, Relation::Proxies)
    }

    /// Connect an output to an input.
    pub fn wire(&mut self, from: &Endpoint, to: &Endpoint) -> Result<()> {
        let (from_id, source) = self.lookup(&from.node)?;
        let (to_id, target) = self.lookup(&to.node)?;
        source
            .agent()
            .output(&from.tag)?
            .connect(target.agent().input(&to.tag)?);
        self.relate(
            from_id,
            to_id,
            Relation::Wire {
                output: from.tag.clone(),
                input: to.tag.clone(),
            },
        )
    }

    /// Let a signal activate another node's control.
    pub fn connect_signal(&mut self, from: &Endpoint, to: &str) -> Result<()> {
        let (from_id, source) = self.lookup(&from.node)?;
        let (to_id, target) = self.lookup(to)?;
        source
            .agent()
            .signal(&from.tag)?
            .connect(target.agent().control());
        self.relate(
            from_id,
            to_id,
            Relation::Signal {
                signal: from.tag.clone(),
            },
        )
    }

    /// Outgoing relations of `id`.
    pub fn relations(&self, id: AgentId) -> Vec<(AgentId, Relation)> {
        let Some(slot) = self.slots.get(&id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(slot.index, Direction::Outgoing)
            .map(|edge| (self.graph[edge.target()], edge.weight().clone()))
            .collect()
    }

    /// The core `facade` delegates to, if it is proxied inside this circuit.
    pub fn core_of(&self, facade: AgentId) -> Option<AgentId> {
        self.relations(facade)
            .into_iter()
            .find(|(_, relation)| *relation == Relation::Proxies)
            .map(|(core, _)| core)
    }

    fn relate(&mut self, from: AgentId, to: AgentId, relation: Relation) -> Result<()> {
        let a = self.index_of(from)?;
        let b = self.index_of(to)?;
        self.graph.add_edge(a, b, relation.clone());
        trace!(%from, %to, ?relation, "relation added");
        self.events.push(CircuitEvent::Related { from, to, relation });
        Ok(())
    }

    fn index_of(&self, id: AgentId) -> Result<NodeIndex> {
        self.slots
            .get(&id)
            .map(|slot| slot.index)
            .ok_or_else(|| CircuitError::unknown_node(id.to_string()))
    }

    fn require(&self, id: AgentId) -> Result<Rc<dyn Node>> {
        self.get(id)
            .cloned()
            .ok_or_else(|| CircuitError::unknown_node(id.to_string()))
    }

    fn lookup(&self, name: &str) -> Result<(AgentId, Rc<dyn Node>)> {
        let id = self.id_of(name)?;
        Ok((id, self.require(id)?))
    }

    // ------------------------------------------------------------------
    // Stimulus and observation
    // ------------------------------------------------------------------

    /// Deliver `value` to an input.
    pub fn send(&self, to: &Endpoint, value: Payload) -> Result<()> {
        self.node(&to.node)?.agent().input(&to.tag)?.receive(value);
        Ok(())
    }

    /// Activate a node's control pin.
    pub fn activate(&self, name: &str) -> Result<()> {
        self.node(name)?.agent().control().activate();
        Ok(())
    }

    /// Observe every output of every node currently in the circuit.
    ///
    /// Returns the number of outputs tapped.
    pub fn tap(&self, observer: impl Fn(&Emission) + 'static) -> usize {
        let observer: Rc<dyn Fn(&Emission)> = Rc::new(observer);
        let mut tapped = 0;
        for id in &self.order {
            let Some(slot) = self.slots.get(id) else {
                continue;
            };
            for entry in slot.node.agent().outputs().entries() {
                let (node, tag, observer) =
                    (slot.name.clone(), entry.tag.to_string(), observer.clone());
                entry.pin.subscribe(move |value| {
                    observer(&Emission {
                        node: node.clone(),
                        tag: tag.clone(),
                        value: value.clone(),
                    })
                });
                tapped += 1;
            }
        }
        tapped
    }

    /// Reset every node.
    pub fn reset(&self) {
        for id in &self.order {
            if let Some(slot) = self.slots.get(id) {
                slot.node.reset();
            }
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Clean up and forget `id`, every node it contains, and every
    /// relation touching them.
    pub fn remove(&mut self, id: AgentId) -> Result<()> {
        if self.detach(id) {
            Ok(())
        } else {
            Err(CircuitError::unknown_node(id.to_string()))
        }
    }

    fn detach(&mut self, id: AgentId) -> bool {
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };
        let contained: Vec<AgentId> = self
            .graph
            .edges_directed(slot.index, Direction::Outgoing)
            .filter(|edge| *edge.weight() == Relation::Contains)
            .map(|edge| self.graph[edge.target()])
            .collect();

        self.graph.remove_node(slot.index);
        self.names.remove(&slot.name);
        self.order.retain(|other| *other != id);

        slot.node.cleanup();
        debug!(name = %slot.name, agent = %id, contained = contained.len(), "node removed");
        self.events.push(CircuitEvent::Removed {
            id,
            name: slot.name,
        });

        for child in contained {
            self.detach(child);
        }
        true
    }

    /// Remove every node, most recent first.
    pub fn clear(&mut self) {
        while let Some(id) = self.order.last().copied() {
            self.detach(id);
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> CircuitSnapshot {
        let nodes = self
            .order
            .iter()
            .filter_map(|id| self.slots.get(id).map(|slot| (id, slot)))
            .map(|(id, slot)| {
                let agent = slot.node.agent();
                NodeSnapshot {
                    id: *id,
                    name: slot.name.clone(),
                    kind: slot.node.kind().to_string(),
                    inputs: agent.inputs().tags().map(String::from).collect(),
                    outputs: agent.outputs().tags().map(String::from).collect(),
                    signals: agent.signals().tags().map(String::from).collect(),
                    proxied: agent.is_proxied(),
                }
            })
            .collect();

        let relations = self
            .graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                Some(RelationSnapshot {
                    from: self.name_of(self.graph[a])?.to_string(),
                    to: self.name_of(self.graph[b])?.to_string(),
                    relation: self.graph[edge].clone(),
                })
            })
            .collect();

        CircuitSnapshot { nodes, relations }
    }
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Circuit {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Circuit")
            .field("nodes", &self.names())
            .field("relations", &self.graph.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinweave_agents::relay::Relay;
    use serde_json::json;
    use std::cell::RefCell;

    fn relay() -> Rc<dyn Node> {
        Rc::new(Relay::new().unwrap())
    }

    #[test]
    fn endpoints_parse() {
        let e: Endpoint = "a.out".parse().unwrap();
        assert_eq!(e, Endpoint::new("a", "out"));
        assert_eq!(e.to_string(), "a.out");
        assert!("nodot".parse::<Endpoint>().is_err());
        assert!(".x".parse::<Endpoint>().is_err());
    }

    #[test]
    fn names_are_unique() {
        let mut circuit = Circuit::new();
        circuit.insert("a", relay()).unwrap();
        assert!(matches!(
            circuit.insert("a", relay()),
            Err(CircuitError::DuplicateName(_))
        ));
        assert_eq!(circuit.len(), 1);
    }

    #[test]
    fn wires_and_taps() {
        let mut circuit = Circuit::new();
        circuit.insert("a", relay()).unwrap();
        circuit.insert("b", relay()).unwrap();
        circuit
            .wire(&"a.out".parse().unwrap(), &"b.in".parse().unwrap())
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        assert_eq!(circuit.tap(move |e| s.borrow_mut().push(e.clone())), 2);

        circuit
            .send(&Endpoint::new("a", "in"), json!("ping"))
            .unwrap();

        let names: Vec<String> = seen.borrow().iter().map(|e| e.node.clone()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn remove_tears_down_by_id() {
        let mut circuit = Circuit::new();
        let parent = circuit.insert("parent", relay()).unwrap();
        let child = circuit.insert("child", relay()).unwrap();
        let other = circuit.insert("other", relay()).unwrap();
        circuit.adopt(parent, child).unwrap();
        circuit
            .wire(&"other.out".parse().unwrap(), &"child.in".parse().unwrap())
            .unwrap();

        let child_node = circuit.get(child).unwrap().clone();
        circuit.remove(parent).unwrap();

        assert_eq!(circuit.names(), vec!["other"]);
        assert!(child_node.agent().is_cleaned());
        assert!(circuit.relations(other).is_empty());
        assert!(circuit.remove(parent).is_err());
    }

    #[test]
    fn proxies_are_recorded() {
        let mut circuit = Circuit::new();
        let facade = circuit.insert("facade", relay()).unwrap();
        let core = circuit.insert("core", relay()).unwrap();
        circuit.proxy(facade, core).unwrap();

        assert_eq!(circuit.core_of(facade), Some(core));
        assert!(circuit.proxy(facade, core).is_err());

        let snapshot = circuit.snapshot();
        assert!(snapshot.nodes[0].proxied);
        assert_eq!(snapshot.relations.len(), 1);
    }
}
