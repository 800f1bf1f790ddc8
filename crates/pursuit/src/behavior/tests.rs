use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::bust::capture_allowed;
use crate::coordinator::{ActorPlans, BoxPlan, PointPlan, TargetView, TimedPlan};
use crate::params::{BehaviorParams, TacticParams};
use crate::roster::{PoliceUnit, UnitRoster};
use crate::types::{
    ActorId, BehaviorState, CaptureTrigger, HeatLevel, PerturbationCause, Tactic, UnitId, UnitType,
};

const A: ActorId = ActorId(1);

fn attached(state: BehaviorState, tactic: Option<Tactic>) -> PoliceUnit {
    let mut unit = PoliceUnit::new(UnitId(0), UnitType::Interceptor, Vec2::new(-10.0, 0.0));
    unit.target = Some(A);
    unit.state = state;
    unit.tactic = tactic;
    unit
}

fn ctx(level: HeatLevel) -> StepContext {
    StepContext {
        level,
        target_position: Vec2::ZERO,
        target_velocity: Vec2::new(10.0, 0.0),
        aerial_track: false,
        dt: 0.1,
    }
}

fn run(unit: &mut PoliceUnit, ctx: &StepContext, params: &BehaviorParams, ticks: usize) -> Vec<StepSignal> {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    (0..ticks)
        .filter_map(|_| step_unit(unit, ctx, params, &mut rng))
        .collect()
}

#[test]
fn test_alerted_unit_pursues_once_it_sees_the_target() {
    let params = BehaviorParams::default();
    let mut unit = attached(BehaviorState::Alerted, Some(Tactic::StandardPursuit));
    run(&mut unit, &ctx(HeatLevel::Level2), &params, 1);
    assert_eq!(unit.state, BehaviorState::Alerted, "no visual yet");

    unit.has_visual = true;
    run(&mut unit, &ctx(HeatLevel::Level2), &params, 1);
    assert_eq!(unit.state, BehaviorState::Pursuing);
    assert_eq!(unit.last_known_target, Some(Vec2::ZERO));
}

#[test]
fn test_level1_unit_stays_alerted() {
    let params = BehaviorParams::default();
    let mut unit = attached(BehaviorState::Alerted, None);
    unit.has_visual = true;
    run(&mut unit, &ctx(HeatLevel::Level1), &params, 10);
    assert_eq!(unit.state, BehaviorState::Alerted);
}

#[test]
fn test_multi_step_tactic_engages_through_pursuing() {
    let params = BehaviorParams::default();
    let mut unit = attached(BehaviorState::Alerted, Some(Tactic::RoadblockAhead));
    run(&mut unit, &ctx(HeatLevel::Level4), &params, 3);
    assert_eq!(unit.state, BehaviorState::Alerted, "no visual yet");

    unit.has_visual = true;
    run(&mut unit, &ctx(HeatLevel::Level4), &params, 1);
    assert_eq!(unit.state, BehaviorState::Pursuing);
    run(&mut unit, &ctx(HeatLevel::Level4), &params, 1);
    assert_eq!(unit.state, BehaviorState::SettingRoadblock);

    // Once the plan resolves the unit goes back to the chase.
    unit.tactic = None;
    run(&mut unit, &ctx(HeatLevel::Level4), &params, 1);
    assert_eq!(unit.state, BehaviorState::Pursuing);
}

#[test]
fn test_lost_visual_switches_to_intercepting_after_grace() {
    let params = BehaviorParams::default();
    let mut unit = attached(BehaviorState::Pursuing, Some(Tactic::StandardPursuit));
    unit.has_visual = true;
    run(&mut unit, &ctx(HeatLevel::Level2), &params, 1);

    unit.has_visual = false;
    let ticks = (params.lost_visual_grace_secs / 0.1) as usize - 1;
    run(&mut unit, &ctx(HeatLevel::Level2), &params, ticks);
    assert_eq!(unit.state, BehaviorState::Pursuing, "still inside the grace period");

    run(&mut unit, &ctx(HeatLevel::Level2), &params, 3);
    assert_eq!(unit.state, BehaviorState::Intercepting);
    let expected = Vec2::new(10.0, 0.0) * params.intercept_lead_secs;
    assert_eq!(unit.destination, Some(expected));

    unit.has_visual = true;
    run(&mut unit, &ctx(HeatLevel::Level2), &params, 1);
    assert_eq!(unit.state, BehaviorState::Pursuing);
}

#[test]
fn test_aerial_track_prevents_intercepting() {
    let params = BehaviorParams::default();
    let mut unit = attached(BehaviorState::Pursuing, Some(Tactic::StandardPursuit));
    let tracked = StepContext {
        aerial_track: true,
        target_position: Vec2::new(50.0, 5.0),
        ..ctx(HeatLevel::Level5)
    };
    run(&mut unit, &tracked, &params, 100);
    assert_eq!(unit.state, BehaviorState::Pursuing);
    assert_eq!(unit.last_known_target, Some(Vec2::new(50.0, 5.0)));
}

#[test]
fn test_failed_maneuvers_revert_to_pursuing() {
    let params = BehaviorParams {
        maneuver_base_chance: 0.0,
        ..Default::default()
    };
    let mut unit = attached(BehaviorState::PITManeuver, Some(Tactic::StandardPursuit));
    unit.has_visual = true;
    let interval_ticks = (params.maneuver_attempt_interval_secs / 0.1).ceil() as usize + 1;
    let signals = run(
        &mut unit,
        &ctx(HeatLevel::Level4),
        &params,
        interval_ticks * params.max_maneuver_failures as usize,
    );
    assert!(signals.is_empty());
    assert_eq!(unit.state, BehaviorState::Pursuing);
    assert!(unit.maneuver.cooldown > 0.0);
}

#[test]
fn test_matched_pit_lands() {
    let params = BehaviorParams {
        maneuver_base_chance: 1.0,
        ..Default::default()
    };
    let mut unit = attached(BehaviorState::PITManeuver, Some(Tactic::StandardPursuit));
    unit.has_visual = true;
    unit.aggression = 1.0;
    unit.velocity = Vec2::new(10.0, 0.0);
    let signals = run(&mut unit, &ctx(HeatLevel::Level4), &params, 15);
    assert_eq!(signals.first(), Some(&StepSignal::PitLanded));
    assert_eq!(unit.state, BehaviorState::Pursuing);
}

#[test]
fn test_landed_ram_claims_a_capture_that_never_sticks() {
    let params = BehaviorParams {
        maneuver_base_chance: 1.0,
        ..Default::default()
    };
    let mut unit = attached(BehaviorState::Ramming, Some(Tactic::StandardPursuit));
    unit.has_visual = true;
    unit.aggression = 1.0;
    unit.velocity = Vec2::new(10.0, 0.0);
    let signals = run(&mut unit, &ctx(HeatLevel::Level5), &params, 15);
    assert_eq!(signals.first(), Some(&StepSignal::RamLanded));

    let (cause, trigger) = StepSignal::RamLanded.contact();
    assert_eq!(cause, PerturbationCause::Ram);
    assert_eq!(trigger, CaptureTrigger::Ramming);
    assert!(capture_allowed(HeatLevel::Level5, trigger).is_err());
    assert_eq!(
        StepSignal::PitLanded.contact(),
        (PerturbationCause::Pit, CaptureTrigger::PitManeuver)
    );
}

#[test]
fn test_maneuver_dropped_when_tactic_changes() {
    let params = BehaviorParams::default();
    let mut unit = attached(BehaviorState::Ramming, Some(Tactic::Boxing));
    unit.has_visual = true;
    run(&mut unit, &ctx(HeatLevel::Level4), &params, 1);
    assert_eq!(unit.state, BehaviorState::Pursuing);
    run(&mut unit, &ctx(HeatLevel::Level4), &params, 1);
    assert_eq!(unit.state, BehaviorState::Boxing);
}

#[test]
fn test_choose_maneuver() {
    assert_eq!(choose_maneuver(HeatLevel::Level2, 2.0, 0.3, 0.0), None);
    assert_eq!(
        choose_maneuver(HeatLevel::Level3, 1.0, 0.3, 0.1),
        Some(BehaviorState::Ramming)
    );
    assert_eq!(choose_maneuver(HeatLevel::Level3, 1.0, 0.3, 0.9), None);
    assert_eq!(
        choose_maneuver(HeatLevel::Level4, 1.0, 0.3, 0.9),
        Some(BehaviorState::PITManeuver)
    );
}

#[test]
fn test_success_chance_needs_speed_and_heading_match() {
    let v = Vec2::new(20.0, 0.0);
    let matched = maneuver_success_chance(0.5, 1.0, v, v, 15.0);
    assert!((matched - 0.5).abs() < 1e-6);
    assert_eq!(maneuver_success_chance(0.5, 1.0, -v, v, 15.0), 0.0);
    assert_eq!(maneuver_success_chance(0.5, 1.0, Vec2::ZERO, v, 15.0), 0.0);
    assert!(maneuver_success_chance(0.5, 1.0, v * 0.8, v, 15.0) < matched);
}

// ---------------------------------------------------------------------------
// Formations
// ---------------------------------------------------------------------------

fn roster_with(positions: &[Vec2]) -> UnitRoster {
    let mut roster = UnitRoster::default();
    for p in positions {
        let id = roster.spawn_patrol(UnitType::Patrol, *p);
        let unit = roster.get_mut(id).unwrap();
        unit.target = Some(A);
        unit.state = BehaviorState::Pursuing;
    }
    roster
}

fn stopped() -> TargetView {
    TargetView {
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
    }
}

#[test]
fn test_boxing_hold_captures_after_required_time() {
    let behavior = BehaviorParams::default();
    let tactics = TacticParams::default();
    let mut roster = roster_with(&[Vec2::new(4.0, 0.0), Vec2::new(-4.0, 0.0)]);
    for id in [UnitId(0), UnitId(1)] {
        roster.get_mut(id).unwrap().tactic = Some(Tactic::Boxing);
    }
    let mut plans = ActorPlans {
        boxing: Some(BoxPlan {
            units: vec![UnitId(0), UnitId(1)],
            elapsed: 0.0,
            hold: 0.0,
        }),
        ..Default::default()
    };

    let required = required_hold_secs(HeatLevel::Level4, &behavior);
    let ticks = (required / 0.1).ceil() as usize + 1;
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(evaluate_formations(
            &mut plans,
            &mut roster,
            &stopped(),
            HeatLevel::Level4,
            &behavior,
            &tactics,
            0.1,
        ));
    }

    assert!(events.contains(&FormationEvent::Capture {
        unit: Some(UnitId(0)),
        trigger: CaptureTrigger::BoxingHold,
    }));
    assert!(events.contains(&FormationEvent::Resolved {
        tactic: Tactic::Boxing,
        success: true,
    }));
    assert!(events.contains(&FormationEvent::BustProgress(1.0)));
    assert!(plans.boxing.is_none());
    assert_eq!(roster.get(UnitId(0)).unwrap().tactic, None);
}

#[test]
fn test_boxing_window_expires_on_moving_target() {
    let behavior = BehaviorParams::default();
    let tactics = TacticParams::default();
    let mut roster = roster_with(&[Vec2::new(4.0, 0.0), Vec2::new(-4.0, 0.0)]);
    let mut plans = ActorPlans {
        boxing: Some(BoxPlan {
            units: vec![UnitId(0), UnitId(1)],
            elapsed: behavior.boxing_window_secs - 0.05,
            hold: 0.0,
        }),
        ..Default::default()
    };
    let moving = TargetView {
        position: Vec2::ZERO,
        velocity: Vec2::new(15.0, 0.0),
    };
    let events = evaluate_formations(
        &mut plans,
        &mut roster,
        &moving,
        HeatLevel::Level4,
        &behavior,
        &tactics,
        0.1,
    );
    assert_eq!(
        events,
        vec![FormationEvent::Resolved {
            tactic: Tactic::Boxing,
            success: false,
        }]
    );
}

fn roadblock_plan() -> ActorPlans {
    ActorPlans {
        roadblock: Some(PointPlan {
            unit: UnitId(0),
            point: Vec2::new(100.0, 0.0),
            direction: Vec2::X,
            elapsed: 0.0,
        }),
        ..Default::default()
    }
}

#[test]
fn test_slow_target_at_roadblock_is_held() {
    let mut roster = roster_with(&[Vec2::new(100.0, 0.0)]);
    let mut plans = roadblock_plan();
    let target = TargetView {
        position: Vec2::new(95.0, 0.0),
        velocity: Vec2::new(3.0, 0.0),
    };
    let events = evaluate_formations(
        &mut plans,
        &mut roster,
        &target,
        HeatLevel::Level4,
        &BehaviorParams::default(),
        &TacticParams::default(),
        0.1,
    );
    assert!(events.contains(&FormationEvent::Capture {
        unit: Some(UnitId(0)),
        trigger: CaptureTrigger::RoadblockHeld,
    }));
    assert!(plans.roadblock.is_none());
}

#[test]
fn test_fast_target_breaches_roadblock() {
    let mut roster = roster_with(&[Vec2::new(100.0, 0.0)]);
    let mut plans = roadblock_plan();
    let target = TargetView {
        position: Vec2::new(97.0, 0.0),
        velocity: Vec2::new(30.0, 0.0),
    };
    let events = evaluate_formations(
        &mut plans,
        &mut roster,
        &target,
        HeatLevel::Level4,
        &BehaviorParams::default(),
        &TacticParams::default(),
        0.1,
    );
    assert_eq!(
        events,
        vec![
            FormationEvent::Evaded(Tactic::RoadblockAhead),
            FormationEvent::Resolved {
                tactic: Tactic::RoadblockAhead,
                success: false,
            },
        ]
    );
}

#[test]
fn test_spike_strip_perturbs_target() {
    let mut roster = roster_with(&[Vec2::new(60.0, 0.0)]);
    let mut plans = ActorPlans {
        spike: Some(PointPlan {
            unit: UnitId(0),
            point: Vec2::new(60.0, 0.0),
            direction: Vec2::X,
            elapsed: 0.0,
        }),
        ..Default::default()
    };
    let target = TargetView {
        position: Vec2::new(58.0, 1.0),
        velocity: Vec2::new(30.0, 0.0),
    };
    let events = evaluate_formations(
        &mut plans,
        &mut roster,
        &target,
        HeatLevel::Level4,
        &BehaviorParams::default(),
        &TacticParams::default(),
        0.1,
    );
    assert!(events.contains(&FormationEvent::Perturbed {
        unit: Some(UnitId(0)),
        cause: PerturbationCause::SpikeStrip,
    }));
    // A spike hit claims a capture that the bust check turns down.
    assert!(events.contains(&FormationEvent::Capture {
        unit: Some(UnitId(0)),
        trigger: CaptureTrigger::SpikeStrip,
    }));
    assert!(capture_allowed(HeatLevel::Level4, CaptureTrigger::SpikeStrip).is_err());
}

#[test]
fn test_funnel_steers_flankers_and_resolves_on_window() {
    let behavior = BehaviorParams::default();
    let tactics = TacticParams::default();
    let mut roster = roster_with(&[Vec2::new(0.0, 20.0), Vec2::new(0.0, -20.0)]);
    let mut plans = ActorPlans {
        funnel: Some(TimedPlan {
            units: vec![UnitId(0), UnitId(1)],
            elapsed: 0.0,
        }),
        ..Default::default()
    };
    let target = TargetView {
        position: Vec2::ZERO,
        velocity: Vec2::new(20.0, 0.0),
    };
    let events = evaluate_formations(
        &mut plans,
        &mut roster,
        &target,
        HeatLevel::Level3,
        &behavior,
        &tactics,
        0.1,
    );
    assert!(events.is_empty());
    let left = roster.get(UnitId(0)).unwrap().destination.unwrap();
    let right = roster.get(UnitId(1)).unwrap().destination.unwrap();
    assert_eq!(left.x, tactics.funnel_ahead);
    assert_eq!(left.y, -right.y);

    plans.funnel.as_mut().unwrap().elapsed = behavior.funnel_window_secs;
    let events = evaluate_formations(
        &mut plans,
        &mut roster,
        &target,
        HeatLevel::Level3,
        &behavior,
        &tactics,
        0.1,
    );
    assert_eq!(
        events,
        vec![FormationEvent::Resolved {
            tactic: Tactic::Funneling,
            success: true,
        }]
    );
}
