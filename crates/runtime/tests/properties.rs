//! Scheduling properties checked end to end through a [`Session`].

mod common;

use behavior_tree::builder::{
    fail, invert, leaf, parallel_selector, parallel_sequence, repeat, selector, sequence, succeed,
};
use behavior_tree::{BehaviorError, BehaviorSpec, NodeId, Outcome};
use sim_runtime::{ActorId, Entity, RuntimeError, Session};

use common::session;

// ============================================================================
// Composites
// ============================================================================

#[test]
fn test_sequence_fails_fast() {
    let mut session = session();
    let id = session.spawn(Entity::new("seq"));
    let spec = sequence(vec![
        leaf("AlwaysSucceed"),
        leaf("AlwaysFail"),
        leaf("Count").with("key", "third"),
    ]);

    session.start_behavior(id, &spec).expect("start");

    let entity = session.entity(id).expect("actor");
    assert_eq!(entity.counter("third"), 0);
    assert_eq!(entity.counter("started:succeed"), 1);
    assert_eq!(entity.counter("started:fail"), 1);

    let binding = session.binding(id).expect("binding");
    assert_eq!(binding.last_outcome(), Some(Outcome::Failure));
    assert!(binding.is_empty());
    assert!(!session.transcript().entries().iter().any(|e| e.name == "Count"));
}

#[test]
fn test_selector_succeeds_fast() {
    let mut session = session();
    let id = session.spawn(Entity::new("sel"));
    let spec = selector(vec![
        leaf("AlwaysFail"),
        leaf("AlwaysSucceed"),
        leaf("AlwaysFail"),
    ]);

    session.start_behavior(id, &spec).expect("start");

    let entity = session.entity(id).expect("actor");
    assert_eq!(entity.counter("started:fail"), 1, "third child never started");
    assert_eq!(entity.counter("started:succeed"), 1);
    assert_eq!(
        session.binding(id).and_then(|b| b.last_outcome()),
        Some(Outcome::Success)
    );
}

#[test]
fn test_parallel_selector_cancels_slower_child() {
    let mut session = session();
    let id = session.spawn(Entity::new("race"));
    let spec = parallel_selector(vec![
        leaf("SlowSucceed").with("label", "slow").with("after", 100),
        leaf("SlowSucceed").with("label", "fast").with("after", 10),
    ]);

    session.start_behavior(id, &spec).expect("start");
    session.run_until(10).expect("run to 10ms");

    let root = session
        .transcript()
        .roots()
        .next()
        .cloned()
        .expect("root completed");
    assert_eq!(root.outcome, Outcome::Success);
    assert_eq!(root.at, 10);

    let entity = session.entity(id).expect("actor");
    let slow_ticks = entity.counter("ticks:slow");
    assert!(slow_ticks > 0);
    assert_eq!(entity.counter("destroyed:slow"), 1);

    session.run_until(200).expect("run to 200ms");
    let entity = session.entity(id).expect("actor");
    assert_eq!(entity.counter("ticks:slow"), slow_ticks, "no ticks after cancellation");
    assert_eq!(session.pending_events(), 0);
}

#[test]
fn test_empty_composites_complete_vacuously() {
    let mut session = session();
    let all = session.spawn(Entity::new("empty-seq"));
    let any = session.spawn(Entity::new("empty-sel"));

    session.start_behavior(all, &sequence(vec![])).expect("start sequence");
    session.start_behavior(any, &selector(vec![])).expect("start selector");

    assert_eq!(root_outcome(&session, all), Some(Outcome::Success));
    assert_eq!(root_outcome(&session, any), Some(Outcome::Failure));
    assert!(session.transcript().entries().iter().all(|e| e.data.is_null()));
    assert_eq!(session.pending_events(), 0);
}

#[test]
fn test_parallel_sequence_waits_for_all() {
    let mut session = session();
    let id = session.spawn(Entity::new("all"));
    let spec = parallel_sequence(vec![
        leaf("SlowSucceed").with("label", "a").with("after", 30),
        leaf("SlowSucceed").with("label", "b").with("after", 5),
    ]);

    session.start_behavior(id, &spec).expect("start");
    session.run_until(29).expect("run");
    assert!(session.binding(id).expect("binding").is_running());

    session.run_until(30).expect("run");
    let root = session.transcript().roots().next().cloned().expect("root");
    assert_eq!((root.outcome, root.at), (Outcome::Success, 30));
}

// ============================================================================
// Decorators
// ============================================================================

fn root_outcome(session: &Session, id: ActorId) -> Option<Outcome> {
    session
        .transcript()
        .for_actor(id)
        .filter(|entry| entry.root)
        .map(|entry| entry.outcome)
        .last()
}

fn run_root(spec: &BehaviorSpec) -> Outcome {
    let mut session = session();
    let id = session.spawn(Entity::new("decorated"));
    session.start_behavior(id, spec).expect("start");
    session.run_until(100).expect("run");

    let binding = session.binding(id).expect("binding");
    assert!(binding.is_empty(), "tree finished");
    assert_eq!(root_outcome(&session, id), binding.last_outcome());
    binding.last_outcome().expect("root outcome")
}

#[test]
fn test_invert_flips_child_outcome() {
    assert_eq!(run_root(&invert(leaf("AlwaysSucceed"))), Outcome::Failure);
    assert_eq!(run_root(&invert(leaf("AlwaysFail"))), Outcome::Success);
    assert_eq!(
        run_root(&invert(leaf("SlowSucceed").with("label", "s").with("after", 20))),
        Outcome::Failure
    );
}

#[test]
fn test_succeed_masks_failure() {
    assert_eq!(run_root(&succeed(leaf("AlwaysFail"))), Outcome::Success);
    assert_eq!(run_root(&succeed(leaf("AlwaysSucceed"))), Outcome::Success);
}

#[test]
fn test_fail_masks_success() {
    assert_eq!(run_root(&fail(leaf("AlwaysSucceed"))), Outcome::Failure);
    assert_eq!(run_root(&fail(leaf("AlwaysFail"))), Outcome::Failure);
}

#[test]
fn test_succeed_lets_sequence_continue_past_failure() {
    let mut session = session();
    let id = session.spawn(Entity::new("masked"));
    let spec = sequence(vec![
        succeed(leaf("AlwaysFail")),
        leaf("Count").with("key", "after"),
    ]);

    session.start_behavior(id, &spec).expect("start");

    assert_eq!(session.entity(id).expect("actor").counter("after"), 1);
    assert_eq!(root_outcome(&session, id), Some(Outcome::Success));
}

// ============================================================================
// Loop
// ============================================================================

#[test]
fn test_loop_runs_child_exactly_count_times() {
    let mut session = session();
    let id = session.spawn(Entity::new("loop"));
    let spec = repeat(3, leaf("Count").with("key", "runs"));

    session.start_behavior(id, &spec).expect("start");
    session.run_until(0).expect("drain restarts");

    assert_eq!(session.entity(id).expect("actor").counter("runs"), 3);
    let roots: Vec<_> = session.transcript().roots().collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "Loop");
    assert_eq!(roots[0].outcome, Outcome::Success);
}

#[test]
fn test_unbounded_loop_runs_until_destroyed() {
    let mut session = session();
    let id = session.spawn(Entity::new("forever"));
    let spec = repeat(0, leaf("SlowSucceed").with("label", "pulse").with("after", 1));

    session.start_behavior(id, &spec).expect("start");
    session.run_until(500).expect("run");

    let starts = session.entity(id).expect("actor").counter("started:pulse");
    assert!(starts > 100, "loop kept restarting: {starts}");
    assert!(session.binding(id).expect("binding").is_running());
    assert!(session.transcript().roots().next().is_none());

    let entity = session.destroy_actor(id).expect("destroy");
    assert_eq!(entity.counter("started:pulse"), starts);
    assert_eq!(session.pending_events(), 0);
    session.run_until(1_000).expect("run after destroy");
}

#[test]
fn test_zero_time_loop_trips_livelock_guard() {
    let mut session = session();
    let id = session.spawn(Entity::new("spinner"));
    let spec = repeat(0, leaf("AlwaysSucceed"));

    session.start_behavior(id, &spec).expect("start");
    let err = session.run_until(0).expect_err("livelock");
    assert!(matches!(err, RuntimeError::Livelock { at: 0, limit: 1_000 }));
    assert!(err.is_fatal());
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_actor_destroy_cascades_through_tree() {
    let mut session = session();
    let id = session.spawn(Entity::new("cascade"));
    let spec = sequence(vec![
        parallel_sequence(vec![
            leaf("Forever").with("label", "a"),
            leaf("Forever").with("label", "b"),
        ]),
        leaf("Forever").with("label", "c"),
    ]);

    session.start_behavior(id, &spec).expect("start");
    session.run_until(50).expect("run");
    assert_eq!(session.binding(id).expect("binding").len(), 4);

    let entity = session.destroy_actor(id).expect("destroy");
    assert_eq!(entity.counter("destroyed:a"), 1);
    assert_eq!(entity.counter("destroyed:b"), 1);
    assert_eq!(entity.counter("started:c"), 0);
    assert_eq!(session.pending_events(), 0);

    session.run_until(500).expect("nothing left to fire");
    assert!(session.transcript().is_empty());
}

#[test]
fn test_destroy_is_idempotent() {
    let mut session = session();
    let id = session.spawn(Entity::new("twice"));
    let root = session
        .start_behavior(id, &leaf("Forever").with("label", "x"))
        .expect("start");

    assert!(session.destroy_node(id, root).expect("first destroy"));
    assert!(!session.destroy_node(id, root).expect("second destroy"));
    assert_eq!(session.entity(id).expect("actor").counter("destroyed:x"), 1);

    session.run_until(100).expect("stale wakeups are dropped");
    assert_eq!(session.entity(id).expect("actor").counter("ticks:x"), 0);

    session.destroy_actor(id).expect("destroy actor");
    assert!(matches!(
        session.destroy_actor(id),
        Err(RuntimeError::UnknownActor(_))
    ));
}

#[test]
fn test_destroying_inner_node_fails_sequence() {
    let mut session = session();
    let id = session.spawn(Entity::new("cut"));
    let spec = sequence(vec![
        repeat(0, leaf("Forever").with("label", "a")),
        leaf("Count").with("key", "next"),
    ]);

    let root = session.start_behavior(id, &spec).expect("start");
    session.run_until(50).expect("run");
    let looping = inner_node(&session, id, "Loop");
    assert_eq!(session.binding(id).and_then(|b| b.parent(looping)), Some(root));

    assert!(session.destroy_node(id, looping).expect("destroy inner"));
    session.run_until(100_000).expect("run");

    let binding = session.binding(id).expect("binding");
    assert!(!binding.is_running());
    assert!(binding.is_empty());
    assert_eq!(binding.last_outcome(), Some(Outcome::Failure));
    assert_eq!(session.pending_events(), 0);

    let entity = session.entity(id).expect("actor");
    assert_eq!(entity.counter("destroyed:a"), 1);
    assert_eq!(entity.counter("next"), 0);
}

#[test]
fn test_destroying_inner_node_lets_selector_try_next() {
    let mut session = session();
    let id = session.spawn(Entity::new("fallback"));
    let spec = selector(vec![
        leaf("Forever").with("label", "a"),
        leaf("Count").with("key", "next"),
    ]);

    session.start_behavior(id, &spec).expect("start");
    let forever = inner_node(&session, id, "Forever");

    assert!(session.destroy_node(id, forever).expect("destroy inner"));
    assert!(!session.destroy_node(id, forever).expect("already gone"));

    let entity = session.entity(id).expect("actor");
    assert_eq!(entity.counter("destroyed:a"), 1);
    assert_eq!(entity.counter("next"), 1);
    assert_eq!(root_outcome(&session, id), Some(Outcome::Success));

    session.run_until(1_000).expect("run");
    assert_eq!(session.entity(id).expect("actor").counter("ticks:a"), 0);
}

fn inner_node(session: &Session, id: ActorId, name: &str) -> NodeId {
    session
        .binding(id)
        .and_then(|binding| binding.nodes().find(|(_, node)| *node == name))
        .map(|(node, _)| node)
        .expect("node is running")
}

#[test]
fn test_external_completion_of_dead_node_is_rejected() {
    let mut session = session();
    let id = session.spawn(Entity::new("late"));
    let root = session
        .start_behavior(id, &leaf("Forever"))
        .expect("start");

    session
        .complete(id, root, Outcome::Success, serde_json::Value::Null)
        .expect("first completion");
    let err = session
        .complete(id, root, Outcome::Failure, serde_json::Value::Null)
        .expect_err("second completion");

    assert!(matches!(
        err,
        RuntimeError::Behavior {
            source: BehaviorError::DoubleCompletion { .. },
            ..
        }
    ));
    assert!(err.is_fatal());
}

#[test]
fn test_invalid_replacement_keeps_running_tree() {
    let mut session = session();
    let id = session.spawn(Entity::new("keep"));
    session
        .start_behavior(id, &leaf("Forever").with("label", "kept"))
        .expect("start");

    let err = session
        .start_behavior(id, &sequence(vec![leaf("Forever"), leaf("Missing")]))
        .expect_err("unknown leaf");
    assert!(matches!(
        err,
        RuntimeError::Behavior {
            source: BehaviorError::UnknownBehavior { .. },
            ..
        }
    ));
    assert!(err.is_fatal());

    session.run_until(20).expect("run");
    assert!(session.entity(id).expect("actor").counter("ticks:kept") > 0);
}

// ============================================================================
// Built-in leaves
// ============================================================================

#[test]
fn test_move_to_reaches_target() {
    let mut session = session();
    let id = session.spawn(Entity::new("walker"));
    let spec = leaf("MoveTo")
        .with("x", 3.0)
        .with("y", 4.0)
        .with("speed", 10.0)
        .with("tick_rate", 50);

    session.start_behavior(id, &spec).expect("start");
    session.run_until(1_000).expect("run");

    let entity = session.entity(id).expect("actor");
    assert_eq!((entity.position.x, entity.position.y), (3.0, 4.0));
    let root = session.transcript().roots().next().cloned().expect("arrived");
    assert!(root.at >= 500 && root.at < 600, "arrived at {}", root.at);
}

#[test]
fn test_inflate_then_destroy_removes_actor() {
    let mut session = session();
    let id = session.spawn(Entity::new("balloon"));
    let spec = sequence(vec![
        leaf("Inflate").with("size", 4.0).with("rate", 3.0),
        leaf("Destroy"),
    ]);

    session.start_behavior(id, &spec).expect("start");
    session.run_until(2_000).expect("run");

    assert!(!session.contains(id));
    let names: Vec<&str> = session
        .transcript()
        .for_actor(id)
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, vec!["Inflate", "Destroy", "Sequence"]);
}

#[test]
fn test_spin_with_duration_stops() {
    let mut session = session();
    let id = session.spawn(Entity::new("top"));
    let spec = leaf("Spin").with("speed", 90.0).with("duration", 1_000);

    session.start_behavior(id, &spec).expect("start");
    session.run_until(3_000).expect("run");

    let entity = session.entity(id).expect("actor");
    assert!((entity.rotation - 90.0).abs() < 1e-9, "rotation {}", entity.rotation);
    assert!(!session.binding(id).expect("binding").is_running());
}
