//! Custom-behavior tests through the full engine: validation gating, the
//! sandboxed tick path, and the failure modes that must leave the
//! population untouched.

use swarm_engine::SwarmEngine;

// ---------------------------------------------------------------------------
// Validation gating
// ---------------------------------------------------------------------------

#[test]
fn saved_program_unlocks_the_custom_pattern() {
    let mut engine = SwarmEngine::seeded(1);
    assert!(!engine.set_pattern("custom"));

    let (ok, message) = engine.save_behavior("behavior update\n  advance speed\nend");
    assert!(ok, "{message}");
    assert!(engine.set_pattern("custom"));
}

#[test]
fn test_action_validates_without_committing() {
    let mut engine = SwarmEngine::seeded(2);
    let (ok, _) = engine.test_behavior("behavior update\n  advance speed\nend");
    assert!(ok);
    assert!(!engine.set_pattern("custom"), "test must not store");
}

#[test]
fn unsafe_sources_are_rejected_with_a_message() {
    let mut engine = SwarmEngine::seeded(3);
    for source in [
        "import os\nbehavior update\nend",
        "behavior update\n  let e = eval\nend",
        "behavior update\n  x = __secret__\nend",
    ] {
        let (ok, message) = engine.save_behavior(source);
        assert!(!ok);
        assert!(message.contains("forbidden"), "got: {message}");
    }
    assert!(!engine.set_pattern("custom"));
}

#[test]
fn syntax_errors_report_the_line() {
    let mut engine = SwarmEngine::seeded(4);
    let (ok, message) = engine.save_behavior("behavior update\n  x = 1 + + 2\nend");
    assert!(!ok);
    assert!(message.contains("line 2"), "got: {message}");
}

// ---------------------------------------------------------------------------
// Sandboxed execution
// ---------------------------------------------------------------------------

#[test]
fn custom_tick_moves_every_agent() {
    let mut engine = SwarmEngine::seeded(5);
    let (ok, _) = engine.save_behavior("behavior update\n  angle = 0\n  advance 10\nend");
    assert!(ok);
    assert!(engine.set_pattern("custom"));
    engine.start();

    let before = engine.agents().to_vec();
    engine.tick(0.1);
    let after = engine.agents();

    for (old, new) in before.iter().zip(after) {
        assert_eq!(new.angle, 0.0);
        assert_eq!(new.x, old.x + 10.0);
        assert_eq!(new.y, old.y);
    }
}

#[test]
fn programs_see_the_frame_speed() {
    let mut engine = SwarmEngine::seeded(6);
    let (ok, _) = engine.save_behavior("behavior update\n  advance speed\nend");
    assert!(ok);
    assert!(engine.set_pattern("custom"));
    engine.start();

    // Default agentSpeed 5 gives a frame distance of 5 * 4 * dt.
    let before = engine.agents().to_vec();
    engine.tick(0.1);
    for (old, new) in before.iter().zip(engine.agents()) {
        let moved = ((new.x - old.x).powi(2) + (new.y - old.y).powi(2)).sqrt();
        assert!((moved - 2.0).abs() < 1e-9);
    }
}

#[test]
fn runtime_name_errors_leave_the_population_untouched() {
    let mut engine = SwarmEngine::seeded(7);
    // `velocity` parses fine but resolves to nothing at run time.
    let (ok, _) = engine.save_behavior("behavior update\n  x = velocity + 1\nend");
    assert!(ok);
    assert!(engine.set_pattern("custom"));
    engine.start();

    let before = engine.agents().to_vec();
    engine.tick(0.1);
    assert_eq!(engine.agents(), &before[..]);
    assert!(engine.is_running(), "a failed tick must not stop the engine");
}

#[test]
fn per_tick_budget_bounds_runaway_programs() {
    // Each agent costs 2k ops for a k-term sum plus one for the advance.
    let heavy = format!(
        "behavior update\n  let a = {}\n  advance 1\nend",
        vec!["1"; 251].join("+")
    );
    let light = format!(
        "behavior update\n  let a = {}\n  advance 1\nend",
        vec!["1"; 240].join("+")
    );

    let mut engine = SwarmEngine::seeded(8);
    let (ok, _) = engine.save_behavior(&heavy);
    assert!(ok, "expensive is not invalid");
    assert!(engine.set_pattern("custom"));
    engine.start();

    // 20 agents blow the shared budget: the whole tick is discarded.
    let before = engine.agents().to_vec();
    engine.tick(0.1);
    assert_eq!(engine.agents(), &before[..]);

    // The same tick under the cheaper program goes through.
    let (ok, _) = engine.save_behavior(&light);
    assert!(ok);
    engine.tick(0.1);
    for (old, new) in before.iter().zip(engine.agents()) {
        assert!(old.x != new.x || old.y != new.y);
    }
}

#[test]
fn saved_behavior_survives_a_population_reset() {
    let mut engine = SwarmEngine::seeded(9);
    let (ok, _) = engine.save_behavior("behavior update\n  advance speed\nend");
    assert!(ok);
    assert!(engine.set_pattern("custom"));

    engine.reset();
    assert_eq!(engine.pattern().name(), "custom");
    engine.start();
    let before = engine.agents().to_vec();
    engine.tick(0.1);
    assert_ne!(engine.agents(), &before[..]);
}
