//! `TacticBoard` resource: the live multi-step plans of every pursued actor.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

use crate::types::{ActorId, Tactic, UnitId};

/// A boxing formation closing in on a slowing target.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlan {
    pub units: Vec<UnitId>,
    pub elapsed: f32,
    /// Seconds the target has been held boxed and stopped.
    pub hold: f32,
}

/// A single unit holding a point on the target's predicted path
/// (roadblock or spike strip).
#[derive(Debug, Clone, PartialEq)]
pub struct PointPlan {
    pub unit: UnitId,
    pub point: Vec2,
    /// Target heading when the plan was made; "passed" is measured along it.
    pub direction: Vec2,
    pub elapsed: f32,
}

/// Units running a tactic that resolves when its window closes.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedPlan {
    pub units: Vec<UnitId>,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorPlans {
    pub boxing: Option<BoxPlan>,
    pub roadblock: Option<PointPlan>,
    pub spike: Option<PointPlan>,
    pub rolling: Option<TimedPlan>,
    pub funnel: Option<TimedPlan>,
    /// Helicopter feeding the target position to the rest of the roster.
    pub aerial: Option<UnitId>,
}

impl ActorPlans {
    /// Units locked into a multi-step tactic, with that tactic.
    pub fn commitments(&self) -> Vec<(UnitId, Tactic)> {
        let mut out = Vec::new();
        if let Some(plan) = &self.boxing {
            out.extend(plan.units.iter().map(|u| (*u, Tactic::Boxing)));
        }
        if let Some(plan) = &self.roadblock {
            out.push((plan.unit, Tactic::RoadblockAhead));
        }
        if let Some(plan) = &self.spike {
            out.push((plan.unit, Tactic::SpikeStripTrap));
        }
        if let Some(plan) = &self.rolling {
            out.extend(plan.units.iter().map(|u| (*u, Tactic::RollingRoadblock)));
        }
        if let Some(plan) = &self.funnel {
            out.extend(plan.units.iter().map(|u| (*u, Tactic::Funneling)));
        }
        out
    }

    pub fn committed(&self) -> BTreeSet<UnitId> {
        self.commitments().into_iter().map(|(u, _)| u).collect()
    }

    pub fn is_empty(&self) -> bool {
        *self == ActorPlans::default()
    }
}

#[derive(Resource, Default, Debug)]
pub struct TacticBoard {
    plans: BTreeMap<ActorId, ActorPlans>,
}

impl TacticBoard {
    pub fn plans(&self, actor: ActorId) -> Option<&ActorPlans> {
        self.plans.get(&actor)
    }

    pub fn plans_mut(&mut self, actor: ActorId) -> &mut ActorPlans {
        self.plans.entry(actor).or_default()
    }

    pub fn clear(&mut self, actor: ActorId) {
        self.plans.remove(&actor);
    }

    pub fn committed_units(&self, actor: ActorId) -> BTreeSet<UnitId> {
        self.plans(actor).map(ActorPlans::committed).unwrap_or_default()
    }
}
