//! Ram and PIT maneuver selection and success odds.

use bevy::prelude::*;

use crate::types::{BehaviorState, HeatLevel};

/// Pick a contact maneuver for a unit close behind its target. `roll` is a
/// uniform sample in `0..1`. Ramming is chosen with probability
/// `aggression * ram_bias`; otherwise a PIT from Level4 up.
pub fn choose_maneuver(
    level: HeatLevel,
    aggression: f32,
    ram_bias: f32,
    roll: f32,
) -> Option<BehaviorState> {
    if level < HeatLevel::Level3 {
        return None;
    }
    if roll < (aggression * ram_bias).clamp(0.0, 1.0) {
        Some(BehaviorState::Ramming)
    } else if level >= HeatLevel::Level4 {
        Some(BehaviorState::PITManeuver)
    } else {
        None
    }
}

/// Chance that one maneuver attempt lands.
///
/// Scales the base chance by aggression, by how closely the unit matches the
/// target's speed, and by how well their headings line up. A stationary
/// party counts as aligned.
pub fn maneuver_success_chance(
    base_chance: f32,
    aggression: f32,
    unit_velocity: Vec2,
    target_velocity: Vec2,
    max_relative_speed: f32,
) -> f32 {
    let relative = (target_velocity.length() - unit_velocity.length()).abs();
    let speed_match = (1.0 - relative / max_relative_speed.max(f32::EPSILON)).clamp(0.0, 1.0);
    let alignment = match (unit_velocity.try_normalize(), target_velocity.try_normalize()) {
        (Some(unit), Some(target)) => unit.dot(target).clamp(0.0, 1.0),
        _ => 1.0,
    };
    (base_chance * aggression * speed_match * alignment).clamp(0.0, 1.0)
}
