//! Per-unit behavior state machine.
//!
//! ```text
//! Patrolling -> Alerted -> Pursuing -> {Ramming, PITManeuver, Boxing,
//!                                       SettingRoadblock, Intercepting}
//! {any} -> Disabled (roster only)
//! ```

use bevy::prelude::*;
use rand::Rng;

use crate::params::BehaviorParams;
use crate::roster::PoliceUnit;
use crate::types::{BehaviorState, CaptureTrigger, HeatLevel, PerturbationCause, Tactic};

use super::maneuvers::{choose_maneuver, maneuver_success_chance};

/// What a unit's step needs to know about its target.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub level: HeatLevel,
    pub target_position: Vec2,
    pub target_velocity: Vec2,
    /// A helicopter of the same pursuit currently sees the target.
    pub aerial_track: bool,
    pub dt: f32,
}

/// Outcomes of a step that other systems must hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSignal {
    RamLanded,
    PitLanded,
}

impl StepSignal {
    /// How the contact shakes the target, and the capture it claims. Only a
    /// PIT is capture-class; a ram's claim is turned down by the bust check.
    pub fn contact(self) -> (PerturbationCause, CaptureTrigger) {
        match self {
            StepSignal::RamLanded => (PerturbationCause::Ram, CaptureTrigger::Ramming),
            StepSignal::PitLanded => (PerturbationCause::Pit, CaptureTrigger::PitManeuver),
        }
    }
}

fn end_maneuver(unit: &mut PoliceUnit, params: &BehaviorParams) {
    unit.state = BehaviorState::Pursuing;
    unit.maneuver.attempt_timer = 0.0;
    unit.maneuver.failures = 0;
    unit.maneuver.cooldown = params.maneuver_cooldown_secs;
}

fn intercept_point(unit: &PoliceUnit, params: &BehaviorParams) -> Option<Vec2> {
    unit.last_known_target
        .map(|p| p + unit.last_known_velocity * params.intercept_lead_secs)
}

/// Advance one attached unit by `ctx.dt`. Pooled and disabled units are left
/// alone.
pub fn step_unit(
    unit: &mut PoliceUnit,
    ctx: &StepContext,
    params: &BehaviorParams,
    rng: &mut impl Rng,
) -> Option<StepSignal> {
    if unit.target.is_none() || unit.is_disabled() {
        return None;
    }
    unit.time_in_pursuit += ctx.dt;
    unit.maneuver.cooldown = (unit.maneuver.cooldown - ctx.dt).max(0.0);

    let tracked = unit.has_visual || ctx.aerial_track;
    if tracked {
        unit.no_visual_secs = 0.0;
        unit.last_known_target = Some(ctx.target_position);
        unit.last_known_velocity = ctx.target_velocity;
    } else {
        unit.no_visual_secs += ctx.dt;
    }
    let distance = unit.position.distance(ctx.target_position);

    match unit.state {
        BehaviorState::Patrolling | BehaviorState::Disabled => None,

        BehaviorState::Alerted => {
            unit.destination = unit.last_known_target;
            // Every tactic, multi-step ones included, starts from a chase in sight.
            if unit.tactic.is_some() && unit.has_visual {
                unit.state = BehaviorState::Pursuing;
            }
            None
        }

        BehaviorState::Pursuing => {
            if let Some(tactic) = unit.tactic.filter(|t| t.is_multi_step()) {
                unit.state = tactic.engaged_state();
                return None;
            }
            if !tracked && unit.no_visual_secs > params.lost_visual_grace_secs {
                unit.state = BehaviorState::Intercepting;
                unit.destination = intercept_point(unit, params);
                return None;
            }
            unit.destination = unit.last_known_target;

            let can_maneuver = unit.tactic == Some(Tactic::StandardPursuit)
                && unit.has_visual
                && unit.maneuver.cooldown <= 0.0
                && distance <= params.maneuver_range;
            if can_maneuver {
                let roll: f32 = rng.gen();
                if let Some(state) = choose_maneuver(ctx.level, unit.aggression, params.ram_bias, roll)
                {
                    unit.state = state;
                    unit.maneuver.attempt_timer = 0.0;
                    unit.maneuver.failures = 0;
                }
            }
            None
        }

        BehaviorState::Ramming | BehaviorState::PITManeuver => {
            if unit.tactic != Some(Tactic::StandardPursuit)
                || !unit.has_visual
                || distance > params.disengage_range
            {
                end_maneuver(unit, params);
                return None;
            }
            unit.destination = Some(ctx.target_position);
            unit.maneuver.attempt_timer += ctx.dt;
            if unit.maneuver.attempt_timer < params.maneuver_attempt_interval_secs {
                return None;
            }
            unit.maneuver.attempt_timer = 0.0;

            let chance = maneuver_success_chance(
                params.maneuver_base_chance,
                unit.aggression,
                unit.velocity,
                ctx.target_velocity,
                params.max_relative_speed,
            );
            let roll: f32 = rng.gen();
            if roll < chance {
                let signal = if unit.state == BehaviorState::Ramming {
                    StepSignal::RamLanded
                } else {
                    StepSignal::PitLanded
                };
                end_maneuver(unit, params);
                return Some(signal);
            }
            unit.maneuver.failures += 1;
            if unit.maneuver.failures >= params.max_maneuver_failures {
                end_maneuver(unit, params);
            }
            None
        }

        BehaviorState::Boxing | BehaviorState::SettingRoadblock => {
            // Formation destinations are set by the formation pass.
            if !unit.tactic.is_some_and(Tactic::is_multi_step) {
                unit.state = BehaviorState::Pursuing;
            }
            None
        }

        BehaviorState::Intercepting => {
            if unit.tactic == Some(Tactic::Funneling) {
                return None;
            }
            if let Some(tactic) = unit.tactic.filter(|t| t.is_multi_step()) {
                unit.state = tactic.engaged_state();
                return None;
            }
            if tracked {
                unit.state = BehaviorState::Pursuing;
                unit.destination = unit.last_known_target;
            } else {
                unit.destination = intercept_point(unit, params);
            }
            None
        }
    }
}
