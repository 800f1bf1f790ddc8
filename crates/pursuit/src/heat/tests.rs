use super::*;
use crate::params::HeatParams;
use crate::types::{ActorId, HeatLevel};

const A: ActorId = ActorId(1);

fn levels(transitions: &[HeatTransition]) -> Vec<(HeatLevel, HeatLevel)> {
    transitions.iter().map(|t| (t.old, t.new)).collect()
}

#[test]
fn test_delta_escalates_one_level_at_a_time() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    let transitions = heat.apply_delta(A, 320.0, &params);
    assert_eq!(
        levels(&transitions),
        vec![
            (HeatLevel::None, HeatLevel::Level1),
            (HeatLevel::Level1, HeatLevel::Level2),
            (HeatLevel::Level2, HeatLevel::Level3),
        ]
    );
    assert_eq!(heat.level(A), HeatLevel::Level3);
}

#[test]
fn test_delta_below_threshold_keeps_level() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    assert!(heat.apply_delta(A, 49.0, &params).is_empty());
    assert_eq!(heat.level(A), HeatLevel::None);
    let transitions = heat.apply_delta(A, 1.0, &params);
    assert_eq!(levels(&transitions), vec![(HeatLevel::None, HeatLevel::Level1)]);
}

#[test]
fn test_accumulator_clamped_to_max() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    let transitions = heat.apply_delta(A, 50_000.0, &params);
    assert_eq!(transitions.len(), 5);
    assert_eq!(heat.heat(A), params.max_heat);
    assert!(heat.apply_delta(A, 100.0, &params).is_empty());
    assert_eq!(heat.level(A), HeatLevel::Level5);
}

#[test]
fn test_negative_and_nan_deltas_do_nothing() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    heat.apply_delta(A, 200.0, &params);
    heat.apply_delta(A, -500.0, &params);
    heat.apply_delta(A, f32::NAN, &params);
    assert_eq!(heat.heat(A), 200.0);
}

#[test]
fn test_busted_ignores_deltas_and_decay() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    heat.apply_delta(A, 600.0, &params);
    let forced = heat.force_busted(A).unwrap();
    assert_eq!((forced.old, forced.new), (HeatLevel::Level4, HeatLevel::Busted));
    assert!(heat.force_busted(A).is_none());
    assert!(heat.apply_delta(A, 500.0, &params).is_empty());
    assert!(heat.apply_decay(A, 100.0, 1.0, &params).is_none());
    assert_eq!(heat.level(A), HeatLevel::Busted);
}

#[test]
fn test_decay_steps_down_one_level_per_call() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    heat.apply_delta(A, 320.0, &params);

    // A huge decay only reaches the next-lower threshold.
    let t = heat.apply_decay(A, 1_000.0, 1.0, &params).unwrap();
    assert_eq!((t.old, t.new), (HeatLevel::Level3, HeatLevel::Level2));
    assert_eq!(heat.heat(A), params.threshold(HeatLevel::Level2));

    let t = heat.apply_decay(A, 1_000.0, 1.0, &params).unwrap();
    assert_eq!((t.old, t.new), (HeatLevel::Level2, HeatLevel::Level1));
    let t = heat.apply_decay(A, 1_000.0, 1.0, &params).unwrap();
    assert_eq!((t.old, t.new), (HeatLevel::Level1, HeatLevel::None));
    assert_eq!(heat.heat(A), 0.0);
    assert!(heat.apply_decay(A, 1_000.0, 1.0, &params).is_none());
}

#[test]
fn test_partial_decay_keeps_level() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    heat.apply_delta(A, 200.0, &params);
    // Level2 decays at 5/s; 2 s with a 2x zone removes 20.
    assert!(heat.apply_decay(A, 2.0, 2.0, &params).is_none());
    assert!((heat.heat(A) - 180.0).abs() < 1e-4);
    assert_eq!(heat.level(A), HeatLevel::Level2);
}

#[test]
fn test_grace_period_gates_decay() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    heat.apply_delta(A, 60.0, &params);
    assert!(!heat.decay_allowed(A, &params));
    heat.tick_since_violation(params.decay_grace_secs);
    assert!(heat.decay_allowed(A, &params));
    heat.apply_delta(A, 1.0, &params);
    assert!(!heat.decay_allowed(A, &params));
}

#[test]
fn test_reset_reports_transition_to_none() {
    let params = HeatParams::default();
    let mut heat = HeatController::default();
    heat.apply_delta(A, 600.0, &params);
    heat.force_busted(A);
    let t = heat.reset(A).unwrap();
    assert_eq!((t.old, t.new), (HeatLevel::Busted, HeatLevel::None));
    assert_eq!(heat.heat(A), 0.0);
    assert!(heat.reset(A).is_none());
}
