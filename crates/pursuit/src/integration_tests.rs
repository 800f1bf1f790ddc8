//! Integration tests for the pursuit engine using the `TestPursuit` harness.
//!
//! These tests spin up a headless Bevy App with `PursuitPlugin` and play the
//! collaborators (gameplay reports, world sensors) to verify behavior across
//! the ledger, heat, roster, coordinator, behavior, bust and cooldown systems.

mod escalation_tests;

use bevy::prelude::*;

use crate::events::HeatLevelChanged;
use crate::test_harness::TestPursuit;
use crate::types::{ActorId, HeatLevel, ViolationKind};

// ===========================================================================
// Harness bootstrap tests
// ===========================================================================

#[test]
fn empty_world_has_no_pursuits() {
    let mut sim = TestPursuit::new();
    sim.tick(10);
    assert!(sim.resolved_sessions().is_empty());
    assert!(sim.roster().is_empty());
    assert_eq!(sim.event_count::<HeatLevelChanged>(), 0);
}

#[test]
fn clock_advances_one_fixed_step_per_tick() {
    let mut sim = TestPursuit::new();
    sim.tick(25);
    let dt = sim.params().tick_seconds as f64;
    assert_eq!(sim.clock().tick, 25);
    assert!((sim.clock().elapsed_secs - 25.0 * dt).abs() < 1e-6);
}

#[test]
fn default_params_are_valid() {
    let sim = TestPursuit::new();
    assert!(sim.params().validate().is_ok());
}

#[test]
fn pooled_units_stay_on_patrol_without_violations() {
    let mut sim = TestPursuit::new().with_patrol_units(3, Vec2::new(10.0, 0.0));
    sim.tick(50);
    assert_eq!(sim.patrolling_count(), 3);
    sim.assert_pool_clean();
}

#[test]
fn unwitnessed_violation_raises_no_heat() {
    let actor = ActorId(9);
    let mut sim = TestPursuit::new().with_actor(actor, Vec2::ZERO, Vec2::ZERO);
    sim.report_violation(actor, ViolationKind::HitPolice, Vec2::ZERO, 0.0);
    sim.tick(1);

    sim.assert_level(actor, HeatLevel::None);
    sim.assert_no_session(actor);
    assert!(sim.roster().is_empty(), "no unit should be dispatched");
}
