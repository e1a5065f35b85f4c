//! Value — a static value sent on `out` whenever control is activated.

use pinweave_core::agent::Agent;
use pinweave_core::error::Result;
use pinweave_core::node::Node;
use pinweave_core::signature::Signature;
use pinweave_core::types::Payload;

pub struct Value {
    agent: Agent,
    value: Payload,
}

impl Value {
    pub fn new(value: impl Into<Payload>) -> Result<Self> {
        let value = value.into();
        let emitted = value.clone();
        let agent = Agent::builder(Signature::new().outputs(["out"]))
            .bind(move |agent| {
                let out = agent.output("out")?.clone();
                agent.control().subscribe(move || out.send(emitted.clone()));
                Ok(())
            })
            .build()?;
        Ok(Self { agent, value })
    }

    pub fn value(&self) -> &Payload {
        &self.value
    }

    /// Send the value now.
    pub fn emit(&self) {
        self.agent.control().activate();
    }
}

impl Node for Value {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "value"
    }
}
