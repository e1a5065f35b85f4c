//! Composite wiring, locking and lifecycle tests.

use pinweave_agents::prelude::*;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn passthrough(registry: Rc<NodeRegistry>) -> Composite {
    Composite::new(
        Signature::new().inputs(["x"]).outputs(["y"]),
        registry,
        |c| {
            let a = c.relay("a")?;
            let b = c.relay("b")?;
            c.input("x")?.connect(a.agent().input("in")?);
            a.agent().output("out")?.connect(b.agent().input("in")?);
            b.agent().output("out")?.connect(c.output("y")?);
            Ok(())
        },
    )
    .unwrap()
}

#[test]
fn values_flow_through_children() {
    let comp = passthrough(Rc::new(NodeRegistry::new()));
    comp.agent().input("x").unwrap().receive(json!("hi"));
    assert_eq!(comp.agent().output("y").unwrap().last(), Some(json!("hi")));
    assert_eq!(comp.children(), vec!["a", "b"]);
}

#[test]
fn add_after_lock_is_rejected() {
    let comp = passthrough(Rc::new(NodeRegistry::new()));
    assert!(comp.is_locked());

    let err = comp.relay("late").err().unwrap();
    assert!(err.is_topology_violation());
    assert!(matches!(
        comp.add("late", Relay::new().unwrap()),
        Err(PinError::Locked { .. })
    ));
    assert_eq!(comp.children(), vec!["a", "b"]);
}

#[test]
fn reset_restores_state_children() {
    let comp = Composite::new(
        Signature::new().inputs(["set"]),
        Rc::new(NodeRegistry::new()),
        |c| {
            let s = c.state("s", "idle")?;
            c.input("set")?.connect(s.agent().input("value")?);
            Ok(())
        },
    )
    .unwrap();

    let resets = Rc::new(Cell::new(0));
    let r = resets.clone();
    comp.agent().on_reset().subscribe(move |_| r.set(r.get() + 1));

    comp.agent().input("set").unwrap().receive(json!("busy"));
    let state = comp.child_as::<State>("s").unwrap();
    assert_eq!(state.value(), json!("busy"));

    comp.reset();
    assert_eq!(state.value(), json!("idle"));
    assert_eq!(resets.get(), 1);
}

#[test]
fn cleanup_cascades_to_every_child_once() {
    let comp = passthrough(Rc::new(NodeRegistry::new()));

    let cleaned = Rc::new(RefCell::new(Vec::new()));
    for tag in comp.children() {
        let c = cleaned.clone();
        comp.child(&tag)
            .unwrap()
            .agent()
            .on_cleaned()
            .subscribe(move |_| c.borrow_mut().push(tag.clone()));
    }

    let received = Rc::new(Cell::new(0));
    let r = received.clone();
    comp.child("a")
        .unwrap()
        .agent()
        .input("in")
        .unwrap()
        .subscribe(move |_| r.set(r.get() + 1));

    comp.cleanup();
    comp.cleanup();

    assert_eq!(*cleaned.borrow(), vec!["a", "b"]);
    assert!(comp.agent().is_cleaned());

    comp.agent().input("x").unwrap().receive(json!(1));
    assert_eq!(received.get(), 0);
}

#[test]
fn failed_build_cleans_up_children() {
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    let result = Composite::new(Signature::new(), Rc::new(NodeRegistry::new()), move |c| {
        let r = c.relay("r")?;
        *s.borrow_mut() = Some(r);
        Err(PinError::tag_not_found("missing"))
    });

    assert!(matches!(result, Err(PinError::TagNotFound { .. })));
    let relay = seen.borrow_mut().take().unwrap();
    assert!(relay.agent().is_cleaned());
}

#[test]
fn composites_nest() {
    let registry = Rc::new(NodeRegistry::new());
    let inner_registry = registry.clone();
    let outer = Composite::new(
        Signature::new().inputs(["x"]).outputs(["y"]),
        registry,
        move |c| {
            let inner = c.add("inner", passthrough(inner_registry))?;
            c.input("x")?.connect(inner.agent().input("x")?);
            inner.agent().output("y")?.connect(c.output("y")?);
            Ok(())
        },
    )
    .unwrap();

    outer.agent().input("x").unwrap().receive(json!([1, 2]));
    assert_eq!(outer.agent().output("y").unwrap().last(), Some(json!([1, 2])));
    assert_eq!(outer.child("inner").unwrap().kind(), "composite");
}

#[test]
fn expressions_and_switches_compose() {
    let comp = Composite::new(
        Signature::new().inputs(["a", "b"]).outputs(["small", "large"]),
        Rc::new(NodeRegistry::new()),
        |c| {
            let sum = c.expr("sum", ["a", "b"], |args| {
                let a = args[0].as_i64().unwrap_or(0);
                let b = args[1].as_i64().unwrap_or(0);
                Ok(json!(a + b))
            })?;
            let route = c.switch(
                "route",
                vec![
                    SwitchCase::when("small", |v| v.as_i64().is_some_and(|n| n < 10)),
                    SwitchCase::when("large", |_| true),
                ],
            )?;
            c.input("a")?.connect(sum.agent().input("a")?);
            c.input("b")?.connect(sum.agent().input("b")?);
            sum.agent().output("result")?.connect(route.agent().input("target")?);
            route.agent().output("small")?.connect(c.output("small")?);
            route.agent().output("large")?.connect(c.output("large")?);
            Ok(())
        },
    )
    .unwrap();

    let agent = comp.agent();
    agent.input("a").unwrap().receive(json!(2));
    agent.input("b").unwrap().receive(json!(3));
    assert_eq!(agent.output("small").unwrap().last(), Some(json!(5)));

    agent.input("b").unwrap().receive(json!(30));
    assert_eq!(agent.output("large").unwrap().last(), Some(json!(32)));
}

#[test]
fn calls_resolve_through_the_registry() {
    let registry = Rc::new(NodeRegistry::new());
    let inner = registry.clone();
    registry.register("lib/passthrough", move || {
        Ok(Rc::new(passthrough(inner.clone())) as Rc<dyn Node>)
    });

    let comp = Composite::new(
        Signature::new().inputs(["x"]).outputs(["y"]),
        registry.clone(),
        |c| {
            let call = c.call("p", "lib/passthrough")?;
            c.input("x")?.connect(call.agent().input("x")?);
            call.agent().output("y")?.connect(c.output("y")?);
            Ok(())
        },
    )
    .unwrap();

    comp.agent().input("x").unwrap().receive(json!(9));
    assert_eq!(comp.agent().output("y").unwrap().last(), Some(json!(9)));

    let call = comp.child_as::<Call>("p").unwrap();
    assert_eq!(call.path(), "lib/passthrough");
    assert_eq!(call.core().kind(), "composite");
}

#[test]
fn builder_hooks_run_before_the_build_closure() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let (pre, fac, bind, build) = (log.clone(), log.clone(), log.clone(), log.clone());
    let builder = Agent::builder(Signature::new().inputs(["a", "b"]).outputs(["y"]))
        .pre_build(move || pre.borrow_mut().push("pre_build".to_string()))
        .factories(PinFactories::default().with_input(move |tag| {
            fac.borrow_mut().push(format!("input:{tag}"));
            InputPin::new()
        }))
        .bind(move |_| {
            bind.borrow_mut().push("bind".to_string());
            Ok(())
        });

    let comp = Composite::from_builder(builder, Rc::new(NodeRegistry::new()), move |c| {
        build.borrow_mut().push("build".to_string());
        let r = c.relay("r")?;
        c.input("b")?.connect(r.agent().input("in")?);
        r.agent().output("out")?.connect(c.output("y")?);
        Ok(())
    })
    .unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["pre_build", "input:a", "input:b", "bind", "build"]
    );

    comp.agent().input("b").unwrap().receive(json!(3));
    assert_eq!(comp.agent().output("y").unwrap().last(), Some(json!(3)));
}
