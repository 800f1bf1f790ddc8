//! Escalation through witnessed violations, and the roster sizing that
//! follows each level change.

use bevy::prelude::*;

use crate::events::{HeatLevelChanged, TacticAssigned, UnitDispatched, ViolationCommitted};
use crate::test_harness::TestPursuit;
use crate::types::{ActorId, HeatLevel, PursuitOutcome, Tactic, ViolationKind};
use crate::violation_ledger::ViolationLedger;

const ACTOR: ActorId = ActorId(1);

/// Four patrols parked near the origin, well inside sensor range.
fn city_block() -> TestPursuit {
    TestPursuit::new()
        .with_patrol_units(4, Vec2::new(20.0, 0.0))
        .with_actor(ACTOR, Vec2::ZERO, Vec2::new(15.0, 0.0))
}

fn level_changes(sim: &TestPursuit) -> Vec<(HeatLevel, HeatLevel)> {
    sim.events::<HeatLevelChanged>()
        .iter()
        .filter(|e| e.actor == ACTOR)
        .map(|e| (e.old, e.new))
        .collect()
}

#[test]
fn test_hit_police_escalates_to_level2_and_dispatches_minimum() {
    let mut sim = city_block();
    sim.report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0);
    sim.tick(1);

    sim.assert_level(ACTOR, HeatLevel::Level2);
    assert_eq!(
        level_changes(&sim),
        vec![
            (HeatLevel::None, HeatLevel::Level1),
            (HeatLevel::Level1, HeatLevel::Level2),
        ]
    );
    sim.assert_active_units(ACTOR, 2);
    assert_eq!(sim.event_count::<UnitDispatched>(), 2);
    sim.assert_session_outcome(ACTOR, PursuitOutcome::InProgress);
}

#[test]
fn test_unseen_speeding_leaves_no_log_behind() {
    let mut sim = TestPursuit::new().with_actor(ACTOR, Vec2::ZERO, Vec2::new(40.0, 0.0));
    for _ in 0..50 {
        for _ in 0..20 {
            sim.report_violation(ACTOR, ViolationKind::Speeding, Vec2::ZERO, 40.0);
        }
        sim.tick(1);
    }

    assert_eq!(sim.event_count::<ViolationCommitted>(), 1_000);
    sim.assert_no_session(ACTOR);
    assert!(sim.resource::<ViolationLedger>().log(ACTOR).is_empty());
}

#[test]
fn test_first_dispatched_unit_is_the_witness() {
    let mut sim = city_block();
    sim.report_violation(ACTOR, ViolationKind::HitCivilian, Vec2::ZERO, 15.0);
    sim.tick(1);

    sim.assert_level(ACTOR, HeatLevel::Level1);
    let committed = sim.events::<ViolationCommitted>();
    let witness = committed[0].record.witness.expect("a pooled unit saw it");
    assert_eq!(sim.active_units(ACTOR), vec![witness]);
    assert_eq!(sim.unit(witness).target, Some(ACTOR));
}

#[test]
fn test_multi_threshold_delta_steps_through_every_level() {
    let mut sim = city_block();
    for _ in 0..4 {
        sim.report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0);
    }
    sim.tick(1);

    sim.assert_level(ACTOR, HeatLevel::Level5);
    let changes = level_changes(&sim);
    assert_eq!(changes.len(), 5, "None -> Level5 is five single steps");
    for (old, new) in changes {
        assert_eq!(old.next(), Some(new), "{old:?} -> {new:?} skipped a level");
    }
    let min = sim.params().roster.policy(HeatLevel::Level5).min_units as usize;
    assert!(sim.active_units(ACTOR).len() >= min);
    sim.assert_within_unit_cap(ACTOR);
}

#[test]
fn test_stacked_repeats_gain_more_heat() {
    let mut sim = city_block();
    sim.report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0)
        .report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0);
    sim.tick(1);

    let deltas: Vec<f32> = sim
        .events::<ViolationCommitted>()
        .iter()
        .map(|e| e.record.heat_delta)
        .collect();
    assert_eq!(deltas.len(), 2);
    assert!(deltas[1] > deltas[0], "second hit should stack: {deltas:?}");
    sim.assert_level(ACTOR, HeatLevel::Level3);
}

#[test]
fn test_escalation_tops_up_roster_to_new_minimum() {
    let mut sim = city_block();
    sim.report_violation(ACTOR, ViolationKind::HitCivilian, Vec2::ZERO, 15.0);
    sim.tick(1);
    sim.assert_active_units(ACTOR, 1);

    sim.report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0);
    sim.tick(1);
    sim.assert_level(ACTOR, HeatLevel::Level3);
    sim.assert_active_units(ACTOR, 4);
}

#[test]
fn test_level1_units_get_no_tactic() {
    let mut sim = city_block();
    sim.report_violation(ACTOR, ViolationKind::HitCivilian, Vec2::ZERO, 15.0);
    sim.tick(5);

    for id in sim.active_units(ACTOR) {
        assert_eq!(sim.unit(id).tactic, None);
    }
    assert_eq!(sim.event_count::<TacticAssigned>(), 0);
}

#[test]
fn test_level2_units_pursue() {
    let mut sim = city_block();
    sim.report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0);
    sim.tick(2);

    for id in sim.active_units(ACTOR) {
        assert_eq!(sim.unit(id).tactic, Some(Tactic::StandardPursuit));
    }
}

#[test]
fn test_unit_cap_holds_through_a_long_chase() {
    let mut sim = city_block()
        .with_seed(7)
        .with_tuning(|p| p.behavior.maneuver_base_chance = 0.0);

    for tick in 0..400u32 {
        if tick % 40 == 0 {
            sim.report_violation(ACTOR, ViolationKind::Reckless, Vec2::ZERO, 30.0);
        }
        if tick % 25 == 0 {
            sim.sense_all(ACTOR, tick % 50 == 0);
        }
        sim.tick(1);
        sim.assert_within_unit_cap(ACTOR);
    }
}

#[test]
fn test_violations_for_two_actors_are_independent() {
    let other = ActorId(2);
    let mut sim = city_block()
        .with_patrol_units(4, Vec2::new(500.0, 0.0))
        .with_actor(other, Vec2::new(500.0, 10.0), Vec2::ZERO);
    sim.report_violation(ACTOR, ViolationKind::HitPolice, Vec2::ZERO, 15.0)
        .report_violation(other, ViolationKind::HitCivilian, Vec2::new(500.0, 10.0), 0.0);
    sim.tick(1);

    sim.assert_level(ACTOR, HeatLevel::Level2);
    sim.assert_level(other, HeatLevel::Level1);
    sim.assert_active_units(ACTOR, 2);
    sim.assert_active_units(other, 1);
    let mine = sim.active_units(ACTOR);
    assert!(sim.active_units(other).iter().all(|id| !mine.contains(id)));
}
