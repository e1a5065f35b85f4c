//! Expr — a computed value.
//!
//! The function is evaluated over the latest value of every input, in
//! declaration order, once each input has received at least one value. It is
//! re-evaluated on every later input and on control activation. The result
//! goes out on `result`; a failure is emitted on the agent's `error` channel.

use pinweave_core::agent::Agent;
use pinweave_core::error::Result;
use pinweave_core::node::Node;
use pinweave_core::signature::Signature;
use pinweave_core::types::{AgentError, Payload};
use std::rc::Rc;
use tracing::trace;

pub type ExprFn = Rc<dyn Fn(&[Payload]) -> std::result::Result<Payload, AgentError>>;

pub struct Expr {
    agent: Rc<Agent>,
}

impl Expr {
    pub fn new<I, S>(
        inputs: I,
        f: impl Fn(&[Payload]) -> std::result::Result<Payload, AgentError> + 'static,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let agent = Rc::new(Agent::new(
            Signature::new().inputs(inputs).outputs(["result"]),
        )?);
        let f: ExprFn = Rc::new(f);

        let weak = Rc::downgrade(&agent);
        let evaluate: Rc<dyn Fn()> = Rc::new(move || {
            let Some(agent) = weak.upgrade() else {
                return;
            };
            let args: Option<Vec<Payload>> =
                agent.inputs().entries().map(|e| e.pin.last()).collect();
            let Some(args) = args else {
                trace!(agent = %agent.id(), "expr: waiting for inputs");
                return;
            };
            match f(&args) {
                Ok(value) => {
                    if let Ok(out) = agent.output("result") {
                        out.send(value);
                    }
                }
                Err(e) => {
                    agent.error(e);
                }
            }
        });

        for entry in agent.inputs().entries() {
            let eval = evaluate.clone();
            entry.pin.subscribe(move |_| eval());
        }
        agent.control().subscribe(move || evaluate());

        Ok(Self { agent })
    }
}

impl Node for Expr {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "expr"
    }
}
