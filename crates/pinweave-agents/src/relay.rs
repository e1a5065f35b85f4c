//! Relay — passes every value from `in` to `out` unchanged.

use pinweave_core::agent::Agent;
use pinweave_core::error::Result;
use pinweave_core::node::Node;
use pinweave_core::signature::Signature;

pub struct Relay {
    agent: Agent,
}

impl Relay {
    pub fn new() -> Result<Self> {
        let agent = Agent::builder(Signature::new().inputs(["in"]).outputs(["out"]))
            .bind(|agent| {
                let out = agent.output("out")?.clone();
                agent.input("in")?.subscribe(move |v| out.send(v.clone()));
                Ok(())
            })
            .build()?;
        Ok(Self { agent })
    }
}

impl Node for Relay {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "relay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn passes_values_through() {
        let relay = Relay::new().unwrap();
        relay.agent().input("in").unwrap().receive(json!("hello"));
        assert_eq!(
            relay.agent().output("out").unwrap().last(),
            Some(json!("hello"))
        );
    }
}
