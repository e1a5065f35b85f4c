//! Agent-to-agent wiring tests.

use pinweave_core::prelude::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn doubler() -> Agent {
    Agent::builder(Signature::new().inputs(["x"]).outputs(["y"]))
        .bind(|agent| {
            let y = agent.output("y")?.clone();
            agent.input("x")?.subscribe(move |v| {
                y.send(json!(v.as_i64().unwrap_or(0) * 2));
            });
            Ok(())
        })
        .build()
        .unwrap()
}

#[test]
fn chained_agents_deliver_depth_first() {
    let a = doubler();
    let b = doubler();
    let log = Rc::new(RefCell::new(Vec::new()));

    a.output("y").unwrap().connect(b.input("x").unwrap());
    let l = log.clone();
    b.output("y")
        .unwrap()
        .subscribe(move |v| l.borrow_mut().push(format!("b:{v}")));
    let l = log.clone();
    a.output("y")
        .unwrap()
        .subscribe(move |v| l.borrow_mut().push(format!("a:{v}")));

    a.input("x").unwrap().receive(json!(1));

    assert_eq!(*log.borrow(), vec!["b:4", "a:2"]);
}

#[test]
fn signature_from_json() {
    let sig: Signature =
        serde_json::from_value(json!({ "inputs": ["a", "b"], "signals": ["done"] })).unwrap();
    let agent = Agent::new(sig).unwrap();

    let tags: Vec<&str> = agent.inputs().tags().collect();
    assert_eq!(tags, vec!["a", "b"]);
    assert!(agent.outputs().is_empty());
    assert!(agent.signals().has("done"));
}

#[test]
fn errors_are_reported_with_their_source() {
    let agent = Agent::new(Signature::new()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    agent.on_error().subscribe(move |e: &AgentError| s.borrow_mut().push(e.clone()));

    agent.error("boom");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].message, "boom");
    assert_eq!(seen[0].source, Some(agent.id()));
}

#[test]
fn cleaned_agents_go_quiet() {
    let a = doubler();
    let b = doubler();
    a.output("y").unwrap().connect(b.input("x").unwrap());

    b.cleanup();
    a.input("x").unwrap().receive(json!(3));

    assert_eq!(a.output("y").unwrap().last(), Some(json!(6)));
    assert_eq!(b.output("y").unwrap().last(), None);
}
