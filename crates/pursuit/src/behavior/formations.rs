//! Formation checks for the multi-step plans of one actor: boxing holds,
//! roadblocks, spike strips, rolling roadblocks and funneling.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::coordinator::{ActorPlans, PointPlan, TargetView, TimedPlan};
use crate::params::{BehaviorParams, TacticParams};
use crate::roster::UnitRoster;
use crate::types::{BehaviorState, CaptureTrigger, HeatLevel, PerturbationCause, Tactic, UnitId};

#[derive(Debug, Clone, PartialEq)]
pub enum FormationEvent {
    /// Boxing hold progress, 0..1.
    BustProgress(f32),
    Resolved {
        tactic: Tactic,
        success: bool,
    },
    Capture {
        unit: Option<UnitId>,
        trigger: CaptureTrigger,
    },
    Perturbed {
        unit: Option<UnitId>,
        cause: PerturbationCause,
    },
    /// The target got past a trap.
    Evaded(Tactic),
}

/// Return resolved units to a plain chase with no tactic.
fn stand_down(roster: &mut UnitRoster, units: &[UnitId]) {
    for id in units {
        if let Some(unit) = roster.get_mut(*id) {
            if !unit.is_disabled() {
                unit.tactic = None;
                unit.state = BehaviorState::Pursuing;
                unit.destination = unit.last_known_target;
            }
        }
    }
}

/// Seconds a boxed target must be held at `level`.
pub fn required_hold_secs(level: HeatLevel, params: &BehaviorParams) -> f32 {
    params.box_hold_secs / (1.0 + level.tier() as f32 * params.box_level_bonus)
}

fn point_outcome(
    plan: &PointPlan,
    target: &TargetView,
    radius: f32,
    window: f32,
) -> PointOutcome {
    let offset = target.position - plan.point;
    if offset.length() <= radius {
        PointOutcome::Reached
    } else if offset.dot(plan.direction) > radius {
        PointOutcome::Passed
    } else if plan.elapsed >= window {
        PointOutcome::Expired
    } else {
        PointOutcome::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointOutcome {
    Pending,
    Reached,
    Passed,
    Expired,
}

fn steer_timed(roster: &mut UnitRoster, plan: &TimedPlan, slot: impl Fn(usize) -> Option<Vec2>) {
    for (i, id) in plan.units.iter().enumerate() {
        if let (Some(unit), Some(point)) = (roster.get_mut(*id), slot(i)) {
            unit.destination = Some(point);
        }
    }
}

/// Advance every plan of one actor by `dt`, steer the units taking part, and
/// resolve plans that succeeded, failed or ran out of time.
pub fn evaluate_formations(
    plans: &mut ActorPlans,
    roster: &mut UnitRoster,
    target: &TargetView,
    level: HeatLevel,
    behavior: &BehaviorParams,
    tactics: &TacticParams,
    dt: f32,
) -> Vec<FormationEvent> {
    let mut events = Vec::new();

    // Boxing
    if let Some(plan) = plans.boxing.as_mut() {
        plan.elapsed += dt;
        let slots = plan.units.len().max(1) as f32;
        let mut in_place = 0u32;
        for (i, id) in plan.units.iter().enumerate() {
            let Some(unit) = roster.get_mut(*id) else {
                continue;
            };
            let slot = Vec2::from_angle(TAU * i as f32 / slots) * tactics.box_slot_radius;
            unit.destination = Some(target.position + slot);
            if unit.position.distance(target.position) <= behavior.box_radius {
                in_place += 1;
            }
        }

        let boxed = in_place >= tactics.boxing_min_units && target.speed() <= behavior.stop_speed;
        let before = plan.hold;
        plan.hold = if boxed {
            plan.hold + dt
        } else {
            (plan.hold - dt).max(0.0)
        };
        let required = required_hold_secs(level, behavior);
        if plan.hold != before {
            events.push(FormationEvent::BustProgress((plan.hold / required).min(1.0)));
        }

        let finished = if plan.hold >= required {
            events.push(FormationEvent::Capture {
                unit: plan.units.first().copied(),
                trigger: CaptureTrigger::BoxingHold,
            });
            Some(true)
        } else if plan.elapsed >= behavior.boxing_window_secs {
            Some(false)
        } else {
            None
        };
        if let Some(success) = finished {
            let units = plan.units.clone();
            stand_down(roster, &units);
            plans.boxing = None;
            events.push(FormationEvent::Resolved {
                tactic: Tactic::Boxing,
                success,
            });
        }
    }

    // Roadblock ahead
    if let Some(plan) = plans.roadblock.as_mut() {
        plan.elapsed += dt;
        if let Some(unit) = roster.get_mut(plan.unit) {
            unit.destination = Some(plan.point);
        }
        let finished = match point_outcome(
            plan,
            target,
            behavior.roadblock_radius,
            behavior.roadblock_window_secs,
        ) {
            PointOutcome::Pending => None,
            PointOutcome::Reached if target.speed() <= behavior.breach_speed => {
                events.push(FormationEvent::Capture {
                    unit: Some(plan.unit),
                    trigger: CaptureTrigger::RoadblockHeld,
                });
                Some(true)
            }
            PointOutcome::Reached | PointOutcome::Passed => {
                events.push(FormationEvent::Evaded(Tactic::RoadblockAhead));
                Some(false)
            }
            PointOutcome::Expired => Some(false),
        };
        if let Some(success) = finished {
            let unit = plan.unit;
            stand_down(roster, &[unit]);
            plans.roadblock = None;
            events.push(FormationEvent::Resolved {
                tactic: Tactic::RoadblockAhead,
                success,
            });
        }
    }

    // Spike strip
    if let Some(plan) = plans.spike.as_mut() {
        plan.elapsed += dt;
        if let Some(unit) = roster.get_mut(plan.unit) {
            unit.destination = Some(plan.point);
        }
        let finished = match point_outcome(
            plan,
            target,
            behavior.spike_radius,
            behavior.roadblock_window_secs,
        ) {
            PointOutcome::Pending => None,
            PointOutcome::Reached => {
                events.push(FormationEvent::Perturbed {
                    unit: Some(plan.unit),
                    cause: PerturbationCause::SpikeStrip,
                });
                events.push(FormationEvent::Capture {
                    unit: Some(plan.unit),
                    trigger: CaptureTrigger::SpikeStrip,
                });
                Some(true)
            }
            PointOutcome::Passed => {
                events.push(FormationEvent::Evaded(Tactic::SpikeStripTrap));
                Some(false)
            }
            PointOutcome::Expired => Some(false),
        };
        if let Some(success) = finished {
            let unit = plan.unit;
            stand_down(roster, &[unit]);
            plans.spike = None;
            events.push(FormationEvent::Resolved {
                tactic: Tactic::SpikeStripTrap,
                success,
            });
        }
    }

    let heading = target.heading();

    // Rolling roadblock
    if let Some(plan) = plans.rolling.as_mut() {
        plan.elapsed += dt;
        steer_timed(roster, plan, |_| {
            heading.map(|h| target.position + h * tactics.rolling_distance)
        });
        if plan.elapsed >= behavior.rolling_window_secs {
            let units = plan.units.clone();
            stand_down(roster, &units);
            plans.rolling = None;
            events.push(FormationEvent::Resolved {
                tactic: Tactic::RollingRoadblock,
                success: target.speed() < behavior.rolling_slow_speed,
            });
        }
    }

    // Funneling
    if let Some(plan) = plans.funnel.as_mut() {
        plan.elapsed += dt;
        steer_timed(roster, plan, |i| {
            heading.map(|h| {
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                target.position + h * tactics.funnel_ahead + h.perp() * tactics.funnel_offset * side
            })
        });
        if plan.elapsed >= behavior.funnel_window_secs {
            let units = plan.units.clone();
            stand_down(roster, &units);
            plans.funnel = None;
            events.push(FormationEvent::Resolved {
                tactic: Tactic::Funneling,
                success: true,
            });
        }
    }

    events
}
