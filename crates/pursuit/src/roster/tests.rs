use std::collections::BTreeSet;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::params::{LevelPolicy, RosterParams};
use crate::types::{ActorId, BehaviorState, HeatLevel, Tactic, UnitId, UnitType};

const ACTOR: ActorId = ActorId(1);

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(1)
}

fn ctx() -> DispatchContext {
    DispatchContext {
        actor: ACTOR,
        target_position: Vec2::ZERO,
        notoriety: 0.0,
    }
}

/// Every pursuit level wants plain patrol cars, so dispatch order is decided
/// by distance alone.
fn patrol_only() -> RosterParams {
    let mut params = RosterParams::default();
    for level in HeatLevel::PURSUIT_LEVELS {
        params.policies[level.tier()].composition = vec![(UnitType::Patrol, 1.0)];
    }
    params
}

/// Five pooled patrols on the x axis at 10, 20, 30, 40 and 50.
fn lined_up_roster() -> UnitRoster {
    let mut roster = UnitRoster::default();
    for i in 1..=5 {
        roster.spawn_patrol(UnitType::Patrol, Vec2::new(i as f32 * 10.0, 0.0));
    }
    roster
}

#[test]
fn test_resize_dispatches_level_minimum() {
    let params = RosterParams::default();
    let mut roster = UnitRoster::default();
    let change = roster.resize(
        &ctx(),
        HeatLevel::Level2,
        &BTreeSet::new(),
        &params,
        &mut rng(),
    );
    assert_eq!(change.dispatched.len(), 2);
    assert!(!change.understaffed);
    assert_eq!(roster.active_count(ACTOR), 2);

    let types: Vec<UnitType> = change
        .dispatched
        .iter()
        .map(|id| roster.get(*id).unwrap().unit_type)
        .collect();
    assert_eq!(types, vec![UnitType::Patrol, UnitType::Interceptor]);
    for id in &change.dispatched {
        let unit = roster.get(*id).unwrap();
        assert_eq!(unit.target, Some(ACTOR));
        assert_eq!(unit.state, BehaviorState::Alerted);
    }
}

#[test]
fn test_resize_prefers_nearest_pooled_units() {
    let params = patrol_only();
    let mut roster = lined_up_roster();
    roster.resize(&ctx(), HeatLevel::Level3, &BTreeSet::new(), &params, &mut rng());
    let mut active = roster.active_units(ACTOR).to_vec();
    active.sort();
    assert_eq!(active, vec![UnitId(0), UnitId(1), UnitId(2), UnitId(3)]);
    assert_eq!(roster.len(), 5, "no new units allocated while the pool has some");
}

#[test]
fn test_shrink_releases_farthest_uncommitted_first() {
    let params = patrol_only();
    let mut roster = lined_up_roster();
    roster.resize(&ctx(), HeatLevel::Level3, &BTreeSet::new(), &params, &mut rng());

    // Unit 3 is farthest but mid-tactic, so unit 2 goes instead.
    let committed: BTreeSet<UnitId> = [UnitId(3)].into_iter().collect();
    let change = roster.resize(&ctx(), HeatLevel::Level2, &committed, &params, &mut rng());
    assert_eq!(change.released, vec![UnitId(2)]);
    assert_eq!(roster.active_count(ACTOR), 3);
    assert!(roster.active_units(ACTOR).contains(&UnitId(3)));
}

#[test]
fn test_released_unit_is_fresh_patrol() {
    let params = patrol_only();
    let mut roster = lined_up_roster();
    roster.resize(&ctx(), HeatLevel::Level1, &BTreeSet::new(), &params, &mut rng());
    {
        let unit = roster.get_mut(UnitId(0)).unwrap();
        unit.tactic = Some(Tactic::StandardPursuit);
        unit.state = BehaviorState::Pursuing;
        unit.health = 40.0;
        unit.time_in_pursuit = 12.0;
        unit.has_visual = true;
    }

    let change = roster.resize(&ctx(), HeatLevel::None, &BTreeSet::new(), &params, &mut rng());
    assert_eq!(change.released, vec![UnitId(0)]);

    let unit = roster.get(UnitId(0)).unwrap();
    assert!(unit.is_available());
    assert_eq!(unit.health, PoliceUnit::MAX_HEALTH);
    assert_eq!(unit.tactic, None);
    assert_eq!(unit.time_in_pursuit, 0.0);
    assert_eq!(unit.last_known_target, None);
    assert!(!unit.has_visual);

    // And it can be dispatched again.
    roster.resize(&ctx(), HeatLevel::Level1, &BTreeSet::new(), &params, &mut rng());
    assert_eq!(roster.active_units(ACTOR), &[UnitId(0)]);
}

#[test]
fn test_disable_removes_from_active_and_respawns() {
    let params = patrol_only();
    let mut roster = lined_up_roster();
    roster.resize(&ctx(), HeatLevel::Level2, &BTreeSet::new(), &params, &mut rng());
    assert_eq!(roster.disable(UnitId(0), 5.0), Some(Some(ACTOR)));
    assert!(!roster.active_units(ACTOR).contains(&UnitId(0)));
    assert_eq!(roster.get(UnitId(0)).unwrap().state, BehaviorState::Disabled);

    // Second disable is a no-op.
    assert_eq!(roster.disable(UnitId(0), 5.0), None);
    // Stale id.
    assert_eq!(roster.disable(UnitId(99), 5.0), None);

    assert!(roster.tick_respawns(4.0).is_empty());
    assert_eq!(roster.tick_respawns(1.0), vec![UnitId(0)]);
    let unit = roster.get(UnitId(0)).unwrap();
    assert!(unit.is_available());
    assert_eq!(unit.position, unit.home);
}

#[test]
fn test_pool_exhaustion_flags_understaffed_once() {
    let mut params = patrol_only();
    params.pool_capacity = 2;
    let mut roster = UnitRoster::default();

    let change = roster.resize(&ctx(), HeatLevel::Level3, &BTreeSet::new(), &params, &mut rng());
    assert_eq!(change.dispatched.len(), 2);
    assert!(change.understaffed);
    assert!(roster.is_understaffed(ACTOR));

    let policy = params.policy(HeatLevel::Level3).clone();
    let retry = roster.fill_to(&ctx(), 4, &policy, &params, &mut rng());
    assert!(retry.dispatched.is_empty());
    assert!(!retry.understaffed, "already flagged, not reported again");
}

#[test]
fn test_understaffed_flag_clears_once_minimum_reached() {
    let mut params = patrol_only();
    params.pool_capacity = 1;
    let mut roster = UnitRoster::default();
    roster.resize(&ctx(), HeatLevel::Level2, &BTreeSet::new(), &params, &mut rng());
    assert!(roster.is_understaffed(ACTOR));

    params.pool_capacity = 4;
    let policy = params.policy(HeatLevel::Level2).clone();
    roster.fill_to(&ctx(), policy.min_units as usize, &policy, &params, &mut rng());
    assert!(!roster.is_understaffed(ACTOR));
    assert_eq!(roster.active_count(ACTOR), 2);
}

#[test]
fn test_witness_is_dispatched_first() {
    let params = patrol_only();
    let mut roster = UnitRoster::default();
    let far = roster.spawn_patrol(UnitType::Patrol, Vec2::new(100.0, 0.0));
    roster.spawn_patrol(UnitType::Patrol, Vec2::new(5.0, 0.0));
    roster.set_witness_hint(ACTOR, far);

    let policy = params.policy(HeatLevel::Level1).clone();
    let id = roster.dispatch_one(&ctx(), &policy, &params, &mut rng());
    assert_eq!(id, Some(far));
}

#[test]
fn test_dispatch_aggression_scales_with_notoriety() {
    let params = patrol_only();
    let mut roster = lined_up_roster();
    let notorious = DispatchContext {
        notoriety: 1.0,
        ..ctx()
    };
    let policy = params.policy(HeatLevel::Level2).clone();
    let id = roster
        .dispatch_one(&notorious, &policy, &params, &mut rng())
        .unwrap();
    let expected = policy.aggression * (1.0 + params.notoriety_aggression_bonus);
    assert!((roster.get(id).unwrap().aggression - expected).abs() < 1e-5);
}

#[test]
fn test_helicopter_capped_per_actor() {
    let policy = LevelPolicy {
        min_units: 1,
        max_units: 4,
        composition: vec![(UnitType::Helicopter, 10.0), (UnitType::Patrol, 1.0)],
        reinforce_interval_secs: 5.0,
        aggression: 1.0,
    };
    let first = dispatch_preference(&policy, &[], 1);
    assert_eq!(first[0], UnitType::Helicopter);
    let next = dispatch_preference(&policy, &[UnitType::Helicopter], 1);
    assert_eq!(next, vec![UnitType::Patrol]);
}

#[test]
fn test_release_order_policy() {
    let candidate = |id, committed, allowed, distance| ReleaseCandidate {
        id: UnitId(id),
        committed,
        allowed,
        distance,
        time_in_pursuit: 0.0,
    };
    let order = release_order(vec![
        candidate(0, true, false, 500.0),
        candidate(1, false, true, 80.0),
        candidate(2, false, false, 10.0),
        candidate(3, false, true, 90.0),
    ]);
    assert_eq!(order, vec![UnitId(2), UnitId(3), UnitId(1), UnitId(0)]);
}

#[test]
fn test_reinforcement_timer_fires_per_interval() {
    let mut roster = UnitRoster::default();
    assert!(!roster.tick_reinforcement(ACTOR, 4.0, 10.0));
    assert!(!roster.tick_reinforcement(ACTOR, 4.0, 10.0));
    assert!(roster.tick_reinforcement(ACTOR, 4.0, 10.0));
    assert!(!roster.tick_reinforcement(ACTOR, 4.0, 10.0));
}

/// A full Level5 roster drawn from a pool with no room to allocate: one
/// helicopter, one heavy, two interceptors and two SUVs.
fn level5_roster(params: &mut RosterParams) -> (UnitRoster, UnitId, UnitId) {
    let mut roster = UnitRoster::default();
    let helicopter = roster.spawn_patrol(UnitType::Helicopter, Vec2::new(10.0, 0.0));
    let heavy = roster.spawn_patrol(UnitType::Heavy, Vec2::new(20.0, 0.0));
    for i in 0..2 {
        roster.spawn_patrol(UnitType::Interceptor, Vec2::new(30.0 + i as f32, 0.0));
        roster.spawn_patrol(UnitType::Suv, Vec2::new(40.0 + i as f32, 0.0));
    }
    params.pool_capacity = roster.len() as u32;
    roster.resize(&ctx(), HeatLevel::Level5, &BTreeSet::new(), params, &mut rng());
    assert_eq!(roster.active_count(ACTOR), 6);
    (roster, helicopter, heavy)
}

#[test]
fn test_drop_releases_types_the_level_does_not_allow() {
    let mut params = RosterParams::default();
    let (mut roster, helicopter, heavy) = level5_roster(&mut params);

    // Level4 allows up to seven units, so only the type rule applies.
    let change = roster.resize(&ctx(), HeatLevel::Level4, &BTreeSet::new(), &params, &mut rng());
    let mut released = change.released.clone();
    released.sort();
    assert_eq!(released, vec![helicopter, heavy]);

    let policy = params.policy(HeatLevel::Level4);
    for id in roster.active_units(ACTOR) {
        assert!(policy.allows(roster.get(*id).unwrap().unit_type));
    }
    assert!(roster.get(helicopter).unwrap().is_available());
    // Only the released helicopter and heavy are pooled, and Level4 wants neither.
    assert_eq!(roster.active_count(ACTOR), 4);
    assert!(change.understaffed);
}

#[test]
fn test_committed_disallowed_unit_kept_until_tactic_ends() {
    let mut params = RosterParams::default();
    let (mut roster, helicopter, heavy) = level5_roster(&mut params);

    let committed: BTreeSet<UnitId> = [heavy].into_iter().collect();
    let change = roster.resize(&ctx(), HeatLevel::Level4, &committed, &params, &mut rng());
    assert_eq!(change.released, vec![helicopter]);
    assert!(roster.active_units(ACTOR).contains(&heavy));

    // Once the tactic resolves the heavy goes too.
    let policy = params.policy(HeatLevel::Level4).clone();
    let released = roster.release_disallowed(ACTOR, &policy, &BTreeSet::new());
    assert_eq!(released, vec![heavy]);
    assert!(!roster.active_units(ACTOR).contains(&heavy));
}

#[test]
fn test_level3_suvs_released_on_drop_to_level2() {
    let mut params = RosterParams::default();
    params.pool_capacity = 4;
    let mut roster = UnitRoster::default();
    for i in 0..4 {
        roster.spawn_patrol(UnitType::Suv, Vec2::new(10.0 * (i + 1) as f32, 0.0));
    }
    roster.resize(&ctx(), HeatLevel::Level3, &BTreeSet::new(), &params, &mut rng());
    assert_eq!(roster.active_count(ACTOR), 4);

    let change = roster.resize(&ctx(), HeatLevel::Level2, &BTreeSet::new(), &params, &mut rng());
    assert_eq!(change.released.len(), 4);
    assert_eq!(roster.active_count(ACTOR), 0);
    assert!(roster.is_understaffed(ACTOR));
}
