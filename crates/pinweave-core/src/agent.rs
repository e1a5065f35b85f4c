//! Agent — the base reactive unit.
//!
//! An agent owns three locked [`PinMap`]s (inputs, outputs, signals), one
//! [`ControlPin`] and a [`Topic`] with the lifecycle channels `reset`,
//! `error`, `proxied` and `cleaned`.
//!
//! Agents are built in two phases through [`AgentBuilder`]: data first, then
//! pins produced by plain factory values ([`PinFactories`]). Hooks run in a
//! fixed order:
//!
//! 1. `setup` (caller-supplied pre-construction callback)
//! 2. `pre_build`
//! 3. one factory call per declared input, output and signal tag
//! 4. the control factory
//! 5. all pin maps are locked
//! 6. `bind`, which may read and wire the now-frozen pins

use crate::error::{PinError, Result};
use crate::pin::{ControlPin, InputPin, OutputPin, Pin, SignalPin};
use crate::pinmap::PinMap;
use crate::signature::Signature;
use crate::topic::{Channel, Topic};
use crate::types::{AgentError, AgentId, Payload};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, warn};

pub type InputFactory = Box<dyn Fn(&str) -> InputPin<Payload>>;
pub type OutputFactory = Box<dyn Fn(&str) -> OutputPin<Payload>>;
pub type SignalFactory = Box<dyn Fn(&str) -> SignalPin>;
pub type ControlFactory = Box<dyn Fn() -> ControlPin>;

type BindHook = Box<dyn FnOnce(&Agent) -> Result<()>>;

/// Factories used to create an agent's pins.
///
/// The defaults produce bare pins with no extra behavior.
pub struct PinFactories {
    pub input: InputFactory,
    pub output: OutputFactory,
    pub signal: SignalFactory,
    pub control: ControlFactory,
}

impl Default for PinFactories {
    fn default() -> Self {
        Self {
            input: Box::new(|_| InputPin::new()),
            output: Box::new(|_| OutputPin::new()),
            signal: Box::new(|_| SignalPin::new()),
            control: Box::new(ControlPin::new),
        }
    }
}

impl PinFactories {
    pub fn with_input(mut self, f: impl Fn(&str) -> InputPin<Payload> + 'static) -> Self {
        self.input = Box::new(f);
        self
    }

    pub fn with_output(mut self, f: impl Fn(&str) -> OutputPin<Payload> + 'static) -> Self {
        self.output = Box::new(f);
        self
    }

    pub fn with_signal(mut self, f: impl Fn(&str) -> SignalPin + 'static) -> Self {
        self.signal = Box::new(f);
        self
    }

    pub fn with_control(mut self, f: impl Fn() -> ControlPin + 'static) -> Self {
        self.control = Box::new(f);
        self
    }
}

/// Shared, cloneable view of an agent's "proxied" state.
///
/// Closures that must stay quiet while the agent delegates to a core hold
/// one of these instead of a reference to the agent.
#[derive(Debug, Clone, Default)]
pub struct ProxyFlag(Rc<Cell<bool>>);

impl ProxyFlag {
    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self) {
        self.0.set(true);
    }
}

/// Two-phase constructor for [`Agent`].
pub struct AgentBuilder {
    signature: Signature,
    id: Option<AgentId>,
    factories: PinFactories,
    setup: Option<Box<dyn FnOnce()>>,
    pre_build: Option<Box<dyn FnOnce()>>,
    bind: Option<BindHook>,
}

impl AgentBuilder {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            id: None,
            factories: PinFactories::default(),
            setup: None,
            pre_build: None,
            bind: None,
        }
    }

    /// Use a fixed identifier instead of a random one.
    pub fn id(mut self, id: AgentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn factories(mut self, factories: PinFactories) -> Self {
        self.factories = factories;
        self
    }

    /// Callback run before anything else, e.g. to prepare state the
    /// factories will read.
    pub fn with_setup(mut self, f: impl FnOnce() + 'static) -> Self {
        self.setup = Some(Box::new(f));
        self
    }

    /// Hook run after setup and before any pin exists.
    pub fn pre_build(mut self, f: impl FnOnce() + 'static) -> Self {
        self.pre_build = Some(Box::new(f));
        self
    }

    /// Hook run once every pin exists and every pin map is locked.
    pub fn bind(mut self, f: impl FnOnce(&Agent) -> Result<()> + 'static) -> Self {
        self.bind = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<Agent> {
        let AgentBuilder {
            signature,
            id,
            factories,
            setup,
            pre_build,
            bind,
        } = self;

        signature.validate()?;

        if let Some(setup) = setup {
            setup();
        }
        if let Some(pre_build) = pre_build {
            pre_build();
        }

        let mut inputs = PinMap::new();
        for tag in &signature.inputs {
            inputs.attach(tag.clone(), (factories.input)(tag))?;
        }
        let mut outputs = PinMap::new();
        for tag in &signature.outputs {
            outputs.attach(tag.clone(), (factories.output)(tag))?;
        }
        let mut signals = PinMap::new();
        for tag in &signature.signals {
            signals.attach(tag.clone(), (factories.signal)(tag))?;
        }
        let control = (factories.control)();

        inputs.lock();
        outputs.lock();
        signals.lock();

        let topic = Topic::new();
        let reset_channel = topic.define::<()>("reset")?;
        let error_channel = topic.define::<AgentError>("error")?;
        let proxied_channel = topic.define::<AgentId>("proxied")?;
        let cleaned_channel = topic.define::<AgentId>("cleaned")?;

        let agent = Agent {
            id: id.unwrap_or_default(),
            signature,
            inputs,
            outputs,
            signals,
            control,
            topic,
            reset_channel,
            error_channel,
            proxied_channel,
            cleaned_channel,
            proxy_flag: ProxyFlag::default(),
            core: Cell::new(None),
            cleaned: Cell::new(false),
        };

        debug!(
            agent = %agent.id,
            inputs = agent.inputs.len(),
            outputs = agent.outputs.len(),
            signals = agent.signals.len(),
            "agent built"
        );

        if let Some(bind) = bind {
            bind(&agent)?;
        }

        Ok(agent)
    }
}

/// The base reactive unit.
pub struct Agent {
    id: AgentId,
    signature: Signature,
    inputs: PinMap<InputPin<Payload>>,
    outputs: PinMap<OutputPin<Payload>>,
    signals: PinMap<SignalPin>,
    control: ControlPin,
    topic: Topic,
    reset_channel: Rc<Channel<()>>,
    error_channel: Rc<Channel<AgentError>>,
    proxied_channel: Rc<Channel<AgentId>>,
    cleaned_channel: Rc<Channel<AgentId>>,
    pub(crate) proxy_flag: ProxyFlag,
    pub(crate) core: Cell<Option<AgentId>>,
    cleaned: Cell<bool>,
}

impl Agent {
    /// Build an agent with default factories and no hooks.
    pub fn new(signature: Signature) -> Result<Self> {
        AgentBuilder::new(signature).build()
    }

    pub fn builder(signature: Signature) -> AgentBuilder {
        AgentBuilder::new(signature)
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn inputs(&self) -> &PinMap<InputPin<Payload>> {
        &self.inputs
    }

    pub fn outputs(&self) -> &PinMap<OutputPin<Payload>> {
        &self.outputs
    }

    pub fn signals(&self) -> &PinMap<SignalPin> {
        &self.signals
    }

    pub fn control(&self) -> &ControlPin {
        &self.control
    }

    pub fn input(&self, tag: &str) -> Result<&InputPin<Payload>> {
        self.inputs.get(tag)
    }

    pub fn output(&self, tag: &str) -> Result<&OutputPin<Payload>> {
        self.outputs.get(tag)
    }

    pub fn signal(&self, tag: &str) -> Result<&SignalPin> {
        self.signals.get(tag)
    }

    /// The topic carrying this agent's lifecycle channels.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Reset every pin, then emit one `reset` event.
    pub fn reset(&self) -> &Self {
        self.reset_with(|| {})
    }

    /// Reset every pin, run `inner`, then emit one `reset` event.
    ///
    /// Owners of extra state (mirror pins, children, a delegated core) reset
    /// it in `inner`, so `reset` subscribers only ever see the settled state.
    pub fn reset_with(&self, inner: impl FnOnce()) -> &Self {
        self.inputs.reset();
        self.outputs.reset();
        self.signals.reset();
        self.control.reset();
        inner();

        debug!(agent = %self.id, "agent reset");
        self.reset_channel.fire(&());
        self
    }

    /// Report a runtime failure on the `error` channel.
    ///
    /// Nothing is returned or raised: a failure nobody subscribed to is
    /// only visible in the log.
    pub fn error(&self, error: impl Into<AgentError>) -> &Self {
        let mut error = error.into();
        if error.source.is_none() {
            error.source = Some(self.id);
        }
        warn!(agent = %self.id, message = %error.message, "agent error");
        self.error_channel.fire(&error);
        self
    }

    /// Release every pin and every lifecycle subscriber.
    ///
    /// Emits `cleaned` first. A second call is a no-op.
    pub fn cleanup(&self) {
        if self.cleaned.replace(true) {
            debug!(agent = %self.id, "cleanup on cleaned agent ignored");
            return;
        }
        self.cleaned_channel.fire(&self.id);
        self.topic.cleanup();

        self.inputs.cleanup();
        self.outputs.cleanup();
        self.signals.cleanup();
        self.control.cleanup();
        debug!(agent = %self.id, "agent cleaned up");
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned.get()
    }

    /// Whether this agent delegates to a core (see [`Agent::proxy`]).
    pub fn is_proxied(&self) -> bool {
        self.proxy_flag.is_set()
    }

    pub fn proxy_flag(&self) -> ProxyFlag {
        self.proxy_flag.clone()
    }

    /// The identifier of the core this agent delegates to, if any.
    pub fn core(&self) -> Option<AgentId> {
        self.core.get()
    }

    /// Same as [`Agent::core`].
    pub fn proxied_by(&self) -> Option<AgentId> {
        self.core()
    }

    pub fn on_reset(&self) -> &Channel<()> {
        &self.reset_channel
    }

    pub fn on_error(&self) -> &Channel<AgentError> {
        &self.error_channel
    }

    /// Fired with the core's id when delegation is established.
    pub fn on_proxied(&self) -> &Channel<AgentId> {
        &self.proxied_channel
    }

    /// Fired with this agent's id right before cleanup releases it.
    pub fn on_cleaned(&self) -> &Channel<AgentId> {
        &self.cleaned_channel
    }

    pub(crate) fn emit_proxied(&self, core: AgentId) {
        self.proxied_channel.fire(&core);
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("proxied", &self.is_proxied())
            .field("cleaned", &self.is_cleaned())
            .finish()
    }
}

impl TryFrom<Signature> for Agent {
    type Error = PinError;

    fn try_from(signature: Signature) -> Result<Self> {
        Agent::new(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn builds_one_pin_per_declared_tag_in_order() {
        let agent = Agent::new(
            Signature::new()
                .inputs(["c", "a", "b"])
                .outputs(["out"])
                .signals(["done"]),
        )
        .unwrap();

        let tags: Vec<&str> = agent.inputs().tags().collect();
        assert_eq!(tags, vec!["c", "a", "b"]);
        assert_eq!(agent.outputs().len(), 1);
        assert_eq!(agent.signals().len(), 1);
        assert!(agent.inputs().is_locked());
        assert!(agent.outputs().is_locked());
        assert!(agent.signals().is_locked());
    }

    #[test]
    fn duplicate_signature_tags_fail_fast() {
        let err = Agent::new(Signature::new().outputs(["x", "x"])).unwrap_err();
        assert_eq!(err, PinError::DuplicateTag { tag: "x".into() });
    }

    #[test]
    fn hooks_run_in_construction_order() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));

        let l_setup = log.clone();
        let l_pre = log.clone();
        let l_in = log.clone();
        let l_ctrl = log.clone();
        let l_bind = log.clone();

        let factories = PinFactories::default()
            .with_input(move |tag| {
                l_in.borrow_mut().push(format!("input:{tag}"));
                InputPin::new()
            })
            .with_control(move || {
                l_ctrl.borrow_mut().push("control".into());
                ControlPin::new()
            });

        Agent::builder(Signature::new().inputs(["a", "b"]))
            .factories(factories)
            .with_setup(move || l_setup.borrow_mut().push("setup".into()))
            .pre_build(move || l_pre.borrow_mut().push("pre_build".into()))
            .bind(move |agent| {
                assert!(agent.inputs().is_locked());
                l_bind.borrow_mut().push("bind".into());
                Ok(())
            })
            .build()
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["setup", "pre_build", "input:a", "input:b", "control", "bind"]
        );
    }

    #[test]
    fn bind_failure_aborts_construction() {
        let result = Agent::builder(Signature::new().inputs(["a"]))
            .bind(|agent| agent.input("missing").map(|_| ()))
            .build();
        assert!(matches!(result, Err(PinError::TagNotFound { .. })));
    }

    #[test]
    fn reset_clears_pins_and_emits_once() {
        let agent = Agent::new(Signature::new().inputs(["x"]).outputs(["y"])).unwrap();
        let resets = Rc::new(Cell::new(0));
        let r = resets.clone();
        agent.on_reset().subscribe(move |_| r.set(r.get() + 1));

        agent.input("x").unwrap().receive(json!(1));
        agent.output("y").unwrap().send(json!(2));
        agent.control().activate();

        agent.reset();
        assert_eq!(resets.get(), 1);
        assert_eq!(agent.input("x").unwrap().last(), None);
        assert_eq!(agent.output("y").unwrap().last(), None);
        assert_eq!(agent.control().activations(), 0);
    }

    #[test]
    fn error_is_emitted_not_returned() {
        let agent = Agent::builder(Signature::new())
            .id(AgentId::from_seed(3))
            .build()
            .unwrap();
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        agent
            .on_error()
            .subscribe(move |e| *s.borrow_mut() = Some(e.clone()));

        agent.error("division by zero");

        let err = seen.borrow().clone().unwrap();
        assert_eq!(err.message, "division by zero");
        assert_eq!(err.source, Some(AgentId::from_seed(3)));
    }

    #[test]
    fn cleanup_releases_pins_and_is_idempotent() {
        let agent = Agent::new(Signature::new().inputs(["x"])).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        agent.input("x").unwrap().subscribe(move |_| h.set(h.get() + 1));

        let cleaned = Rc::new(Cell::new(0));
        let c = cleaned.clone();
        agent.on_cleaned().subscribe(move |_| c.set(c.get() + 1));

        agent.cleanup();
        agent.cleanup();
        agent.input("x").unwrap().receive(json!("late"));

        assert_eq!(hits.get(), 0);
        assert_eq!(cleaned.get(), 1);
        assert!(agent.is_cleaned());
        assert!(agent.control().is_cleaned());
    }
}
