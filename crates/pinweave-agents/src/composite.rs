//! Composite — an agent built from child nodes.
//!
//! A composite mirrors its own external pins on the inside so its children
//! can be wired to them:
//!
//! - every external input `t` has a mirror [`OutputPin`] (`input(t)`) that
//!   re-sends what the composite receives,
//! - every external output `t` has a mirror [`InputPin`] (`output(t)`) whose
//!   received values leave through the external output,
//! - every external signal `t` has a mirror [`ControlPin`] (`signal(t)`)
//!   that fires the external signal,
//! - the external control fires the mirror [`SignalPin`] (`control()`).
//!
//! While the composite is proxied all mirror forwarding is silenced, so a
//! delegated value never travels both through the children and the core.
//!
//! Children are added only during the build closure. Afterwards the
//! composite is locked.

use crate::call::Call;
use crate::expr::Expr;
use crate::registry::NodeRegistry;
use crate::relay::Relay;
use crate::state::State;
use crate::switch::{Switch, SwitchCase};
use crate::value::Value;
use pinweave_core::agent::{Agent, AgentBuilder};
use pinweave_core::error::{PinError, Result};
use pinweave_core::node::{downcast_node, Node};
use pinweave_core::pin::{ControlPin, InputPin, OutputPin, Pin, SignalPin};
use pinweave_core::pinmap::PinMap;
use pinweave_core::signature::Signature;
use pinweave_core::types::{AgentError, Payload};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

pub struct Composite {
    agent: Agent,
    ins: PinMap<OutputPin<Payload>>,
    outs: PinMap<InputPin<Payload>>,
    sigs: PinMap<ControlPin>,
    ctrl: SignalPin,
    children: RefCell<Vec<(String, Rc<dyn Node>)>>,
    locked: Cell<bool>,
    registry: Rc<NodeRegistry>,
}

impl Composite {
    /// Build a composite: create the agent and its mirror, run `build` to
    /// add and wire children, then lock.
    ///
    /// If `build` fails the half-built composite is cleaned up and the error
    /// returned.
    pub fn new(
        signature: Signature,
        registry: Rc<NodeRegistry>,
        build: impl FnOnce(&Composite) -> Result<()>,
    ) -> Result<Self> {
        Self::from_builder(Agent::builder(signature), registry, build)
    }

    /// Like [`Composite::new`], but the external agent comes from `builder`,
    /// so its pin factories and `setup`/`pre_build`/`bind` hooks all run
    /// before the mirror exists and before `build`.
    pub fn from_builder(
        builder: AgentBuilder,
        registry: Rc<NodeRegistry>,
        build: impl FnOnce(&Composite) -> Result<()>,
    ) -> Result<Self> {
        let agent = builder.build()?;
        let flag = agent.proxy_flag();

        let mut ins = PinMap::new();
        for entry in agent.inputs().entries() {
            let mirror = OutputPin::<Payload>::new();
            let (m, flag) = (mirror.clone(), flag.clone());
            entry.pin.subscribe(move |v| {
                if !flag.is_set() {
                    m.send(v.clone());
                }
            });
            ins.attach(entry.tag, mirror)?;
        }

        let mut outs = PinMap::new();
        for entry in agent.outputs().entries() {
            let mirror = InputPin::<Payload>::new();
            let (external, flag) = (entry.pin.clone(), flag.clone());
            mirror.subscribe(move |v| {
                if !flag.is_set() {
                    external.send(v.clone());
                }
            });
            outs.attach(entry.tag, mirror)?;
        }

        let mut sigs = PinMap::new();
        for entry in agent.signals().entries() {
            let mirror = ControlPin::new();
            let (external, flag) = (entry.pin.clone(), flag.clone());
            mirror.subscribe(move || {
                if !flag.is_set() {
                    external.activate();
                }
            });
            sigs.attach(entry.tag, mirror)?;
        }

        let ctrl = SignalPin::new();
        {
            let (c, flag) = (ctrl.clone(), flag.clone());
            agent.control().subscribe(move || {
                if !flag.is_set() {
                    c.activate();
                }
            });
        }

        ins.lock();
        outs.lock();
        sigs.lock();

        let composite = Composite {
            agent,
            ins,
            outs,
            sigs,
            ctrl,
            children: RefCell::new(Vec::new()),
            locked: Cell::new(false),
            registry,
        };

        if let Err(e) = build(&composite) {
            warn!(agent = %composite.agent.id(), error = %e, "composite build failed");
            composite.cleanup();
            return Err(e);
        }
        composite.lock();

        debug!(
            agent = %composite.agent.id(),
            children = composite.child_count(),
            "composite built"
        );
        Ok(composite)
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn registry(&self) -> &Rc<NodeRegistry> {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Mirror pins
    // ------------------------------------------------------------------

    /// Inside view of external input `tag`: sends what the composite receives.
    pub fn input(&self, tag: &str) -> Result<&OutputPin<Payload>> {
        self.ins.get(tag)
    }

    /// Inside view of external output `tag`: what it receives leaves the
    /// composite.
    pub fn output(&self, tag: &str) -> Result<&InputPin<Payload>> {
        self.outs.get(tag)
    }

    /// Inside view of external signal `tag`.
    pub fn signal(&self, tag: &str) -> Result<&ControlPin> {
        self.sigs.get(tag)
    }

    /// Inside view of the external control pin.
    pub fn control(&self) -> &SignalPin {
        &self.ctrl
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// Add `child` under `tag` and hand back a shared handle to it.
    pub fn add<N: Node + 'static>(&self, tag: impl Into<String>, child: N) -> Result<Rc<N>> {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        let child = Rc::new(child);
        self.attach(tag, child.clone())?;
        Ok(child)
    }

    /// Add an already shared node under `tag`.
    pub fn add_node(&self, tag: impl Into<String>, child: Rc<dyn Node>) -> Result<()> {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.attach(tag, child)
    }

    fn attach(&self, tag: String, child: Rc<dyn Node>) -> Result<()> {
        debug!(
            parent = %self.agent.id(),
            child = %child.agent().id(),
            kind = child.kind(),
            %tag,
            "child added"
        );
        self.children.borrow_mut().push((tag, child));
        Ok(())
    }

    fn ensure_open(&self, tag: &str) -> Result<()> {
        if self.locked.get() {
            warn!(parent = %self.agent.id(), %tag, "add after lock rejected");
            return Err(PinError::locked(tag));
        }
        if self.has_child(tag) {
            return Err(PinError::duplicate_tag(tag));
        }
        Ok(())
    }

    pub fn has_child(&self, tag: &str) -> bool {
        self.children.borrow().iter().any(|(t, _)| t == tag)
    }

    pub fn child(&self, tag: &str) -> Result<Rc<dyn Node>> {
        self.children
            .borrow()
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, node)| node.clone())
            .ok_or_else(|| PinError::tag_not_found(tag))
    }

    /// Look up a child and downcast it to its concrete type.
    pub fn child_as<T: Node + 'static>(&self, tag: &str) -> Option<Rc<T>> {
        self.child(tag).ok().and_then(downcast_node::<T>)
    }

    /// Child tags in insertion order.
    pub fn children(&self) -> Vec<String> {
        self.children
            .borrow()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Freeze the child set. Idempotent.
    pub fn lock(&self) -> &Self {
        self.locked.set(true);
        self
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    // ------------------------------------------------------------------
    // Child helpers
    // ------------------------------------------------------------------

    pub fn relay(&self, tag: impl Into<String>) -> Result<Rc<Relay>> {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.add(tag, Relay::new()?)
    }

    pub fn state(&self, tag: impl Into<String>, initial: impl Into<Payload>) -> Result<Rc<State>> {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.add(tag, State::new(initial)?)
    }

    pub fn switch<I, C>(&self, tag: impl Into<String>, cases: I) -> Result<Rc<Switch>>
    where
        I: IntoIterator<Item = C>,
        C: Into<SwitchCase>,
    {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.add(tag, Switch::new(cases)?)
    }

    pub fn value(&self, tag: impl Into<String>, value: impl Into<Payload>) -> Result<Rc<Value>> {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.add(tag, Value::new(value)?)
    }

    pub fn expr<I, S>(
        &self,
        tag: impl Into<String>,
        inputs: I,
        f: impl Fn(&[Payload]) -> std::result::Result<Payload, AgentError> + 'static,
    ) -> Result<Rc<Expr>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.add(tag, Expr::new(inputs, f)?)
    }

    /// Add a child created from the registry entry at `path`.
    pub fn call(&self, tag: impl Into<String>, path: &str) -> Result<Rc<Call>> {
        self.call_with(tag, path, &self.registry)
    }

    /// [`Composite::call`] resolved against `registry` instead of the
    /// composite's own.
    pub fn call_with(
        &self,
        tag: impl Into<String>,
        path: &str,
        registry: &NodeRegistry,
    ) -> Result<Rc<Call>> {
        let tag = tag.into();
        self.ensure_open(&tag)?;
        self.add(tag, Call::new(path, registry)?)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Delegate to `core`. Mirror forwarding stops from here on.
    pub fn proxy(&self, core: &Agent) -> Result<&Self> {
        self.agent.proxy(core)?;
        Ok(self)
    }

    /// Reset the agent's pins, the mirror pins and every child, then emit
    /// the agent's `reset` event.
    pub fn reset(&self) -> &Self {
        self.agent.reset_with(|| {
            self.ins.reset();
            self.outs.reset();
            self.sigs.reset();
            self.ctrl.reset();
            for child in self.snapshot() {
                child.reset();
            }
        });
        self
    }

    /// Release the agent and the mirror, then every child. Idempotent.
    pub fn cleanup(&self) {
        if self.agent.is_cleaned() {
            debug!(agent = %self.agent.id(), "composite already cleaned");
            return;
        }
        self.agent.cleanup();
        self.ins.cleanup();
        self.outs.cleanup();
        self.sigs.cleanup();
        self.ctrl.cleanup();

        let children = self.snapshot();
        for child in &children {
            child.cleanup();
        }
        debug!(agent = %self.agent.id(), children = children.len(), "composite cleaned");
    }

    fn snapshot(&self) -> Vec<Rc<dyn Node>> {
        self.children
            .borrow()
            .iter()
            .map(|(_, node)| node.clone())
            .collect()
    }
}

impl Node for Composite {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "composite"
    }

    fn reset(&self) {
        Composite::reset(self);
    }

    fn cleanup(&self) {
        Composite::cleanup(self);
    }
}

impl std::fmt::Debug for Composite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composite")
            .field("id", &self.agent.id())
            .field("children", &self.children())
            .field("locked", &self.locked.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Rc<NodeRegistry> {
        Rc::new(NodeRegistry::new())
    }

    #[test]
    fn mirrors_route_through_children() {
        let comp = Composite::new(
            Signature::new().inputs(["x"]).outputs(["y"]),
            registry(),
            |c| {
                let relay = c.relay("r")?;
                c.input("x")?.connect(relay.agent().input("in")?);
                relay.agent().output("out")?.connect(c.output("y")?);
                Ok(())
            },
        )
        .unwrap();

        comp.agent().input("x").unwrap().receive(json!(1));
        assert_eq!(comp.agent().output("y").unwrap().last(), Some(json!(1)));
        assert_eq!(comp.children(), vec!["r"]);
        assert!(comp.is_locked());
    }

    #[test]
    fn control_and_signals_are_mirrored() {
        let comp = Composite::new(Signature::new().signals(["done"]), registry(), |c| {
            let v = c.value("v", 5)?;
            c.control().connect(v.agent().control());
            Ok(())
        })
        .unwrap();

        comp.agent().control().activate();
        let v = comp.child_as::<Value>("v").unwrap();
        assert_eq!(v.agent().output("out").unwrap().last(), Some(json!(5)));

        comp.signal("done").unwrap().activate();
        assert_eq!(comp.agent().signal("done").unwrap().activations(), 1);
    }

    #[test]
    fn duplicate_child_tags_fail_the_build() {
        let result = Composite::new(Signature::new(), registry(), |c| {
            c.relay("r")?;
            c.relay("r")?;
            Ok(())
        });
        assert!(matches!(result, Err(PinError::DuplicateTag { .. })));
    }

    #[test]
    fn child_lookup() {
        let comp = Composite::new(Signature::new(), registry(), |c| {
            c.state("s", 0)?;
            Ok(())
        })
        .unwrap();

        assert!(comp.child_as::<State>("s").is_some());
        assert!(comp.child_as::<Relay>("s").is_none());
        assert!(matches!(comp.child("nope"), Err(PinError::TagNotFound { .. })));
        assert_eq!(comp.child("s").unwrap().kind(), "state");
    }

    #[test]
    fn call_with_uses_the_given_registry() {
        let other = NodeRegistry::standard();
        let comp = Composite::new(Signature::new(), registry(), |c| {
            c.call_with("r", "std/relay", &other)?;
            Ok(())
        })
        .unwrap();

        let call = comp.child_as::<Call>("r").unwrap();
        assert_eq!(call.path(), "std/relay");
        assert!(!comp.registry().registered("std/relay"));
    }

    #[test]
    fn reset_event_sees_reset_children() {
        let comp = Composite::new(Signature::new(), registry(), |c| {
            c.state("s", 0)?;
            Ok(())
        })
        .unwrap();
        let state = comp.child_as::<State>("s").unwrap();
        state.set(5);

        let seen = Rc::new(RefCell::new(None));
        let (s, st) = (seen.clone(), state.clone());
        comp.agent()
            .on_reset()
            .subscribe(move |_| *s.borrow_mut() = Some(st.value()));

        comp.reset();
        assert_eq!(*seen.borrow(), Some(json!(0)));
    }

    #[test]
    fn unknown_call_path_fails_the_build() {
        let result = Composite::new(Signature::new(), registry(), |c| {
            c.call("child", "missing/path")?;
            Ok(())
        });
        assert!(matches!(result, Err(PinError::UnknownPath { .. })));
    }
}
