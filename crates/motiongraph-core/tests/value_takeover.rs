//! Value ownership: takeover between racing animations, boundary
//! exactness, resets, and status observation.

use std::cell::RefCell;
use std::rc::Rc;

use motiongraph_core::{
    AnimatedValue, AnimationNode, Config, Curve, Engine, Value, ValueAnimation, ValueStatus,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn float_value(key: &str) -> AnimatedValue {
    AnimatedValue::new(key, Value::Float(0.0))
}

fn float_of(engine: &Engine, value: &AnimatedValue) -> f32 {
    match engine.value(value) {
        Value::Float(x) => x,
        other => panic!("expected float, got {other:?}"),
    }
}

fn linear(value: &AnimatedValue, to: f32, over: f32) -> AnimationNode {
    ValueAnimation::new(value, Value::Float(to))
        .over(over)
        .curved(Curve::Linear)
        .into()
}

/// it should start a takeover from the value at the instant of takeover and
/// silence the evicted animation
#[test]
fn takeover_starts_from_live_value() {
    let x = float_value("x");
    let mut engine = Engine::new(Config::default());

    let first = engine.animate(linear(&x, 10.0, 1.0)).unwrap();
    engine.advance(0.5);
    assert_eq!(engine.value(&x), Value::Float(5.0));

    // Second animation takes over mid-flight; no explicit start, so it
    // continues from the committed 5.0.
    let writes: Rc<RefCell<Vec<f32>>> = Rc::default();
    let sink = writes.clone();
    engine.subscribe(&x, move |value, _| {
        if let Value::Float(v) = value {
            sink.borrow_mut().push(*v);
        }
    });
    let second = engine.animate(linear(&x, 20.0, 0.5)).unwrap();

    engine.advance(0.25);
    approx(float_of(&engine, &x), 12.5, 1e-5);
    // The evicted run exits on its next tick without writing again; had it
    // written, its 0.75-progress value 7.5 would appear here.
    assert!(writes.borrow().iter().all(|v| (5.0..=20.0).contains(v)));
    assert!(!writes.borrow().iter().any(|v| (*v - 7.5).abs() < 1e-3));
    assert!(first.is_done());

    engine.advance(0.25);
    assert!(second.is_done());
    assert_eq!(engine.value(&x), Value::Float(20.0));
}

/// it should respect an explicit start override even when taking over
#[test]
fn takeover_with_explicit_start() {
    let x = float_value("x");
    let mut engine = Engine::new(Config::default());
    engine.animate(linear(&x, 10.0, 1.0)).unwrap();
    engine.advance(0.5);

    let override_run = engine
        .animate(AnimationNode::from(
            ValueAnimation::new(&x, Value::Float(2.0))
                .starting_at(Value::Float(0.0))
                .over(0.5)
                .curved(Curve::Linear),
        ))
        .unwrap();
    engine.advance(0.25);
    approx(float_of(&engine, &x), 1.0, 1e-5);
    engine.advance(0.25);
    assert!(override_run.is_done());
    assert_eq!(engine.value(&x), Value::Float(2.0));
}

/// it should land exactly on the end value when elapsed equals duration,
/// with zero remainder
#[test]
fn interpolation_boundary_exact() {
    let x = float_value("x");
    let y = float_value("y");
    let tree = AnimationNode::sequence(vec![
        ValueAnimation::new(&x, Value::Float(10.0))
            .starting_at(Value::Float(0.0))
            .over(0.5)
            .curved(Curve::Linear)
            .into(),
        linear(&y, 1.0, 0.25),
    ]);
    let mut engine = Engine::new(Config::default());
    let handle = engine.animate(tree).unwrap();

    // Zero elapsed: value stays at its start.
    engine.advance(0.0);
    assert_eq!(engine.value(&x), Value::Float(0.0));
    assert!(!handle.is_done());

    // Exactly the total: x lands on 10 with zero leftover for itself, and
    // y consumes precisely its own duration.
    engine.advance(0.75);
    assert_eq!(engine.value(&x), Value::Float(10.0));
    assert_eq!(engine.value(&y), Value::Float(1.0));
    assert!(handle.is_done());
}

/// it should reset exactly the values reachable in the run's tree
#[test]
fn reset_scopes_to_run_tree() {
    let a = AnimatedValue::new("a", Value::Float(1.0));
    let b = AnimatedValue::new("b", Value::Float(2.0));
    let c = AnimatedValue::new("c", Value::Float(3.0));
    let mut engine = Engine::new(Config::default());
    engine.set_value(&a, Value::Float(5.0));
    engine.set_value(&b, Value::Float(6.0));
    engine.set_value(&c, Value::Float(7.0));

    let tree = AnimationNode::sequence(vec![
        linear(&a, 9.0, 0.0625),
        linear(&b, 9.0, 0.0625),
        AnimationNode::reset(),
    ]);
    let handle = engine.animate(tree).unwrap();
    engine.advance(0.25);
    assert!(handle.is_done());
    assert_eq!(engine.value(&a), Value::Float(1.0));
    assert_eq!(engine.value(&b), Value::Float(2.0));
    assert_eq!(engine.value(&c), Value::Float(7.0));
}

/// it should reset only the listed values when given an explicit set
#[test]
fn reset_explicit_targets_only() {
    let a = AnimatedValue::new("a", Value::Float(1.0));
    let b = AnimatedValue::new("b", Value::Float(2.0));
    let mut engine = Engine::new(Config::default());
    engine.set_value(&a, Value::Float(5.0));
    engine.set_value(&b, Value::Float(6.0));

    let tree = AnimationNode::sequence(vec![
        linear(&b, 9.0, 0.0), // referenced by the tree but not in the reset set
        AnimationNode::reset_values(vec![a.clone()]),
    ]);
    let handle = engine.animate(tree).unwrap();
    engine.advance(0.0625);
    assert!(handle.is_done());
    assert_eq!(engine.value(&a), Value::Float(1.0));
    assert_eq!(engine.value(&b), Value::Float(9.0));
}

/// it should report Running while animated and Idle before and after
#[test]
fn status_follows_animation_lifecycle() {
    let x = float_value("x");
    let mut engine = Engine::new(Config::default());
    assert_eq!(engine.status(&x), ValueStatus::Idle);

    let statuses: Rc<RefCell<Vec<ValueStatus>>> = Rc::default();
    let sink = statuses.clone();
    engine.subscribe(&x, move |_, status| sink.borrow_mut().push(status));

    let handle = engine.animate(linear(&x, 1.0, 0.125)).unwrap();
    assert_eq!(engine.status(&x), ValueStatus::Running);
    engine.advance(0.0625);
    assert_eq!(engine.status(&x), ValueStatus::Running);
    engine.advance(0.0625);
    assert!(handle.is_done());
    assert_eq!(engine.status(&x), ValueStatus::Idle);

    let seen = statuses.borrow();
    assert_eq!(seen.first(), Some(&ValueStatus::Running));
    assert_eq!(seen.last(), Some(&ValueStatus::Idle));
}

/// it should let direct resets bypass an installed writer, which keeps
/// writing on subsequent ticks
#[test]
fn direct_reset_bypasses_active_animation() {
    let x = float_value("x");
    let mut engine = Engine::new(Config::default());
    engine.animate(linear(&x, 10.0, 0.25)).unwrap();
    engine.advance(0.125);
    assert_eq!(engine.value(&x), Value::Float(5.0));

    engine.reset(&x);
    assert_eq!(engine.value(&x), Value::Float(0.0));

    // The animation still owns the slot and keeps interpolating from its
    // original start point.
    engine.advance(0.0625);
    approx(float_of(&engine, &x), 7.5, 1e-5);
}

/// it should round-trip config and representative values through serde
#[test]
fn config_and_value_serde_roundtrip() {
    let cfg = Config {
        default_duration: 0.4,
        default_curve: Curve::CubicBezier(0.25, 0.1, 0.25, 1.0),
    };
    let s = serde_json::to_string(&cfg).unwrap();
    let cfg2: Config = serde_json::from_str(&s).unwrap();
    assert_eq!(cfg2.default_duration, 0.4);
    assert_eq!(cfg2.default_curve, cfg.default_curve);

    for value in [
        Value::Float(1.5),
        Value::Vec3([1.0, 2.0, 3.0]),
        Value::Quat([0.0, 0.0, 0.0, 1.0]),
        Value::ColorRgba([0.1, 0.2, 0.3, 1.0]),
        Value::Bool(true),
        Value::Text("hello".to_string()),
    ] {
        let s = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(back, value);
    }
}
