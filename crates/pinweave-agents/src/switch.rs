//! Switch — routes each value on `target` to the output of the first
//! matching case.

use pinweave_core::agent::Agent;
use pinweave_core::error::Result;
use pinweave_core::node::Node;
use pinweave_core::signature::Signature;
use pinweave_core::types::Payload;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// One routing case. Its tag names the output it sends to.
#[derive(Clone)]
pub enum SwitchCase {
    /// Matches values equal to the payload. Strings use their content as the
    /// output tag, other values their JSON text.
    Equals(Payload),
    /// Matches values accepted by the predicate.
    When {
        tag: String,
        test: Rc<dyn Fn(&Payload) -> bool>,
    },
}

impl SwitchCase {
    pub fn equals(value: impl Into<Payload>) -> Self {
        SwitchCase::Equals(value.into())
    }

    pub fn when(tag: impl Into<String>, test: impl Fn(&Payload) -> bool + 'static) -> Self {
        SwitchCase::When {
            tag: tag.into(),
            test: Rc::new(test),
        }
    }

    pub fn tag(&self) -> String {
        match self {
            SwitchCase::Equals(Payload::String(s)) => s.clone(),
            SwitchCase::Equals(v) => v.to_string(),
            SwitchCase::When { tag, .. } => tag.clone(),
        }
    }

    pub fn matches(&self, value: &Payload) -> bool {
        match self {
            SwitchCase::Equals(expected) => expected == value,
            SwitchCase::When { test, .. } => test(value),
        }
    }
}

impl fmt::Debug for SwitchCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchCase::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            SwitchCase::When { tag, .. } => f.debug_struct("When").field("tag", tag).finish(),
        }
    }
}

impl From<&str> for SwitchCase {
    fn from(s: &str) -> Self {
        SwitchCase::equals(s)
    }
}

pub struct Switch {
    agent: Agent,
    cases: Vec<SwitchCase>,
}

impl Switch {
    pub fn new<I, C>(cases: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<SwitchCase>,
    {
        let cases: Vec<SwitchCase> = cases.into_iter().map(Into::into).collect();
        let signature = Signature::new()
            .inputs(["target"])
            .outputs(cases.iter().map(SwitchCase::tag));

        let routes = cases.clone();
        let agent = Agent::builder(signature)
            .bind(move |agent| {
                let mut table = Vec::with_capacity(routes.len());
                for case in routes {
                    let out = agent.output(&case.tag())?.clone();
                    table.push((case, out));
                }
                agent.input("target")?.subscribe(move |v| {
                    match table.iter().find(|(case, _)| case.matches(v)) {
                        Some((_, out)) => out.send(v.clone()),
                        None => trace!(value = %v, "switch: no case matched"),
                    }
                });
                Ok(())
            })
            .build()?;

        Ok(Self { agent, cases })
    }

    pub fn cases(&self) -> &[SwitchCase] {
        &self.cases
    }
}

impl Node for Switch {
    fn agent(&self) -> &Agent {
        &self.agent
    }

    fn kind(&self) -> &'static str {
        "switch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinweave_core::error::PinError;
    use serde_json::json;

    #[test]
    fn routes_to_first_match() {
        let switch = Switch::new(vec![
            SwitchCase::equals("on"),
            SwitchCase::when("big", |v| v.as_i64().is_some_and(|n| n > 10)),
            SwitchCase::when("any", |_| true),
        ])
        .unwrap();
        let agent = switch.agent();

        agent.input("target").unwrap().receive(json!("on"));
        agent.input("target").unwrap().receive(json!(50));

        assert_eq!(agent.output("on").unwrap().last(), Some(json!("on")));
        assert_eq!(agent.output("big").unwrap().last(), Some(json!(50)));
        assert_eq!(agent.output("any").unwrap().last(), None);
    }

    #[test]
    fn unmatched_values_are_dropped() {
        let switch = Switch::new(["a", "b"]).unwrap();
        switch.agent().input("target").unwrap().receive(json!("c"));
        assert_eq!(switch.agent().output("a").unwrap().last(), None);
        assert_eq!(switch.agent().output("b").unwrap().last(), None);
    }

    #[test]
    fn duplicate_case_tags_are_rejected() {
        let result = Switch::new(["a", "a"]);
        assert!(matches!(result, Err(PinError::DuplicateTag { .. })));
    }

    #[test]
    fn non_string_case_tags_use_json_text() {
        let switch = Switch::new(vec![SwitchCase::equals(1), SwitchCase::equals(true)]).unwrap();
        let tags: Vec<String> = switch.cases().iter().map(SwitchCase::tag).collect();
        assert_eq!(tags, vec!["1", "true"]);
    }
}
