//! State — a value cell.
//!
//! Receiving on `value` stores the value and re-emits it on `value`.
//! Resetting the agent restores the declared initial value.

use pinweave_core::agent::Agent;
use pinweave_core::error::Result;
use pinweave_core::node::Node;
use pinweave_core::pin::InputPin;
use pinweave_core::signature::Signature;
use pinweave_core::types::Payload;
use std::cell::RefCell;
use std::rc::Rc;

pub struct State {
    agent: Agent,
    initial: Payload,
    value: Rc<RefCell<Payload>>,
    input: InputPin<Payload>,
}

impl State {
    pub fn new(initial: impl Into<Payload>) -> Result<Self> {
        let initial = initial.into();
        let value = Rc::new(RefCell::new(initial.clone()));

        let cell = value.clone();
        let init = initial.clone();
        let agent = Agent::builder(Signature::new().inputs(["value"]).outputs(["value"]))
            .bind(move |agent| {
                let out = agent.output("value")?.clone();
                let store = cell.clone();
                agent.input("value")?.subscribe(move |v| {
                    *store.borrow_mut() = v.clone();
                    out.send(v.clone());
                });
                agent
                    .on_reset()
                    .subscribe(move |_| *cell.borrow_mut() = init.clone());
                Ok(())
            })
            .build()?;

        let input = agent.input("value")?.clone();
        Ok(Self {
            agent,
            initial,
            value,
            input,
        })
    }

    /// The current value.
    pub fn value(&self) -> Payload {
        self.value.borrow().clone()
    }

    pub fn initial(&self) -> &Payload {
        &self.initial
    }

    /// Store a new value, exactly as if it arrived on the `value` input.
    pub fn set(&self, value: impl Into<Payload>) {
        self.input.receive(value.into());
    }
}

impl Node for State {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "state"
    }
}
