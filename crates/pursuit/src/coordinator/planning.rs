//! Tactic selection and arbitration for one actor's roster.
//!
//! Pure functions over a snapshot of the actor's units so the priority rules
//! can be tested without an `App`.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::params::TacticParams;
use crate::types::{HeatLevel, Tactic, UnitId, UnitType};

use super::board::{ActorPlans, BoxPlan, PointPlan, TimedPlan};

/// Read-only snapshot of an active unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitView {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy)]
pub struct TargetView {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl TargetView {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Unit heading, or `None` when the target is practically stationary.
    pub fn heading(&self) -> Option<Vec2> {
        self.velocity.try_normalize()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlanResult {
    /// Desired tactic of every active unit, in unit order.
    pub assignments: Vec<(UnitId, Option<Tactic>)>,
    /// No active unit is left to pursue with.
    pub understaffed: bool,
}

/// Drop dead units from the plans. Plans that can no longer run are removed
/// and returned as failed tactics.
pub fn prune_plans(
    plans: &mut ActorPlans,
    live: &BTreeSet<UnitId>,
    params: &TacticParams,
) -> Vec<Tactic> {
    let mut failed = Vec::new();

    if let Some(plan) = plans.boxing.as_mut() {
        plan.units.retain(|u| live.contains(u));
        if (plan.units.len() as u32) < params.boxing_min_units {
            plans.boxing = None;
            failed.push(Tactic::Boxing);
        }
    }
    if plans.roadblock.as_ref().is_some_and(|p| !live.contains(&p.unit)) {
        plans.roadblock = None;
        failed.push(Tactic::RoadblockAhead);
    }
    if plans.spike.as_ref().is_some_and(|p| !live.contains(&p.unit)) {
        plans.spike = None;
        failed.push(Tactic::SpikeStripTrap);
    }
    for (slot, tactic) in [
        (&mut plans.rolling, Tactic::RollingRoadblock),
        (&mut plans.funnel, Tactic::Funneling),
    ] {
        if let Some(plan) = slot.as_mut() {
            plan.units.retain(|u| live.contains(u));
            if plan.units.is_empty() {
                *slot = None;
                failed.push(tactic);
            }
        }
    }
    if plans.aerial.is_some_and(|u| !live.contains(&u)) {
        plans.aerial = None;
    }
    failed
}

/// Free units sorted by distance to `point`, nearest first.
fn by_distance<'a>(free: impl Iterator<Item = &'a UnitView>, point: Vec2) -> Vec<&'a UnitView> {
    let mut units: Vec<&UnitView> = free.collect();
    units.sort_by(|a, b| {
        a.position
            .distance_squared(point)
            .total_cmp(&b.position.distance_squared(point))
            .then(a.id.cmp(&b.id))
    });
    units
}

/// Closest free ground unit that can reach `point` within `lead_secs`,
/// preferring `preferred` units.
fn pick_for_point(
    units: &[UnitView],
    taken: &BTreeSet<UnitId>,
    point: Vec2,
    lead_secs: f32,
    preferred: UnitType,
    params: &TacticParams,
) -> Option<UnitId> {
    let reachable = units.iter().filter(|u| {
        u.unit_type.is_ground()
            && !taken.contains(&u.id)
            && u.position.distance(point) / params.unit_travel_speed <= lead_secs
    });
    let ranked = by_distance(reachable, point);
    ranked
        .iter()
        .find(|u| u.unit_type == preferred)
        .or_else(|| ranked.first())
        .map(|u| u.id)
}

/// Assign a tactic to every active unit of one actor.
///
/// Priority, first match per unit:
/// 1. Boxing (Level4+, enough ground units near the target, one formation)
/// 2. Roadblock ahead, paired with a spike strip (Level4+, fast target,
///    reachable intercept point)
/// 3. Aerial support (Level5, helicopters)
/// 4. Rolling roadblock (Level4+, a ground unit ahead of the target)
/// 5. Funneling (Level3+, up to `funnel_max_units` flankers)
/// 6. Standard pursuit for the rest (Level2+)
///
/// Units already committed to a multi-step plan keep it. New plans are
/// written into `plans`.
pub fn plan_tactics(
    level: HeatLevel,
    target: &TargetView,
    units: &[UnitView],
    plans: &mut ActorPlans,
    params: &TacticParams,
) -> PlanResult {
    if units.is_empty() {
        return PlanResult {
            assignments: Vec::new(),
            understaffed: true,
        };
    }

    let mut taken: BTreeSet<UnitId> = plans.committed();
    let count = units.len() as u32;
    let ground_free = |taken: &BTreeSet<UnitId>| -> Vec<UnitView> {
        units
            .iter()
            .filter(|u| u.unit_type.is_ground() && !taken.contains(&u.id))
            .copied()
            .collect()
    };

    // 1. Boxing
    if level >= HeatLevel::Level4 && plans.boxing.is_none() {
        let free = ground_free(&taken);
        let near: Vec<&UnitView> = by_distance(free.iter(), target.position)
            .into_iter()
            .filter(|u| u.position.distance(target.position) <= params.coordination_range)
            .take(params.boxing_max_units as usize)
            .collect();
        if near.len() as u32 >= params.boxing_min_units {
            let ids: Vec<UnitId> = near.iter().map(|u| u.id).collect();
            taken.extend(ids.iter().copied());
            debug!("Coordinator: boxing with {:?}", ids);
            plans.boxing = Some(BoxPlan {
                units: ids,
                elapsed: 0.0,
                hold: 0.0,
            });
        }
    }

    // 2. Roadblock ahead + spike strip
    if level >= HeatLevel::Level4 && target.speed() >= params.roadblock_min_target_speed {
        if let Some(heading) = target.heading() {
            let lead_secs = params.roadblock_lead_distance / target.speed();
            if plans.roadblock.is_none() && lead_secs >= params.roadblock_min_lead_secs {
                let point = target.position + heading * params.roadblock_lead_distance;
                if let Some(unit) =
                    pick_for_point(units, &taken, point, lead_secs, UnitType::Roadblock, params)
                {
                    taken.insert(unit);
                    debug!("Coordinator: roadblock by {:?} at {:?}", unit, point);
                    plans.roadblock = Some(PointPlan {
                        unit,
                        point,
                        direction: heading,
                        elapsed: 0.0,
                    });
                }
            }
            if plans.spike.is_none() {
                if let Some(roadblock) = plans.roadblock.clone() {
                    let point = roadblock.point - roadblock.direction * params.spike_setback;
                    let spike_lead =
                        (point - target.position).dot(roadblock.direction) / target.speed();
                    let picked = (spike_lead > 0.0)
                        .then(|| {
                            pick_for_point(
                                units,
                                &taken,
                                point,
                                spike_lead,
                                UnitType::SpikeStrip,
                                params,
                            )
                        })
                        .flatten();
                    if let Some(unit) = picked {
                        taken.insert(unit);
                        plans.spike = Some(PointPlan {
                            unit,
                            point,
                            direction: roadblock.direction,
                            elapsed: 0.0,
                        });
                    }
                }
            }
        }
    }

    // 3. Aerial support
    let mut aerial: BTreeSet<UnitId> = BTreeSet::new();
    if level == HeatLevel::Level5 {
        aerial = units
            .iter()
            .filter(|u| u.unit_type == UnitType::Helicopter && !taken.contains(&u.id))
            .map(|u| u.id)
            .collect();
        if plans.aerial.is_none() {
            plans.aerial = aerial.first().copied();
        }
    } else {
        plans.aerial = None;
    }
    taken.extend(aerial.iter().copied());

    // 4. Rolling roadblock
    if level >= HeatLevel::Level4 && plans.rolling.is_none() && count >= params.rolling_min_units {
        if let Some(heading) = target.heading() {
            let free = ground_free(&taken);
            let ahead = by_distance(
                free.iter()
                    .filter(|u| (u.position - target.position).dot(heading) > 0.0),
                target.position,
            );
            if let Some(unit) = ahead.first() {
                taken.insert(unit.id);
                plans.rolling = Some(TimedPlan {
                    units: vec![unit.id],
                    elapsed: 0.0,
                });
            }
        }
    }

    // 5. Funneling
    if level >= HeatLevel::Level3 && plans.funnel.is_none() && count >= params.funnel_min_units {
        let free = ground_free(&taken);
        let flankers: Vec<UnitId> = by_distance(free.iter(), target.position)
            .into_iter()
            .take(params.funnel_max_units as usize)
            .map(|u| u.id)
            .collect();
        if !flankers.is_empty() {
            taken.extend(flankers.iter().copied());
            plans.funnel = Some(TimedPlan {
                units: flankers,
                elapsed: 0.0,
            });
        }
    }

    // 6. Standard pursuit, and the committed units' own tactics.
    let committed: Vec<(UnitId, Tactic)> = plans.commitments();
    let assignments = units
        .iter()
        .map(|u| {
            let tactic = if let Some((_, t)) = committed.iter().find(|(id, _)| *id == u.id) {
                Some(*t)
            } else if aerial.contains(&u.id) {
                Some(Tactic::AerialSupport)
            } else if level >= HeatLevel::Level2 {
                Some(Tactic::StandardPursuit)
            } else {
                None
            };
            (u.id, tactic)
        })
        .collect();

    PlanResult {
        assignments,
        understaffed: false,
    }
}
