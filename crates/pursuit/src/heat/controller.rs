use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::params::HeatParams;
use crate::types::{ActorId, HeatLevel};

/// One single-level step of an actor's heat level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatTransition {
    pub actor: ActorId,
    pub old: HeatLevel,
    pub new: HeatLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeatState {
    pub heat: f32,
    pub level: HeatLevel,
    pub since_violation_secs: f32,
}

/// Per-actor heat accumulator and level state machine.
///
/// Levels only move one step at a time. Escalation comes from
/// [`apply_delta`](Self::apply_delta), de-escalation from
/// [`apply_decay`](Self::apply_decay), and the terminal paths from
/// [`force_busted`](Self::force_busted) and [`reset`](Self::reset).
#[derive(Resource, Default, Debug)]
pub struct HeatController {
    states: BTreeMap<ActorId, HeatState>,
}

impl HeatController {
    pub fn state(&self, actor: ActorId) -> Option<&HeatState> {
        self.states.get(&actor)
    }

    pub fn level(&self, actor: ActorId) -> HeatLevel {
        self.state(actor).map(|s| s.level).unwrap_or_default()
    }

    pub fn heat(&self, actor: ActorId) -> f32 {
        self.state(actor).map(|s| s.heat).unwrap_or(0.0)
    }

    pub fn actors(&self) -> Vec<ActorId> {
        self.states.keys().copied().collect()
    }

    /// Add heat and escalate through every threshold crossed, in order.
    /// No effect while the actor is `Busted`.
    pub fn apply_delta(
        &mut self,
        actor: ActorId,
        delta: f32,
        params: &HeatParams,
    ) -> Vec<HeatTransition> {
        let state = self.states.entry(actor).or_default();
        if state.level == HeatLevel::Busted || !delta.is_finite() {
            return Vec::new();
        }
        state.heat = (state.heat + delta.max(0.0)).clamp(0.0, params.max_heat);
        state.since_violation_secs = 0.0;

        let reached = params.level_for(state.heat);
        let mut transitions = Vec::new();
        while state.level < reached {
            let Some(next) = state.level.next() else {
                break;
            };
            transitions.push(HeatTransition {
                actor,
                old: state.level,
                new: next,
            });
            state.level = next;
        }
        transitions
    }

    /// Remove `rate × multiplier × elapsed` heat, never below the threshold
    /// of the next-lower level, and step down once that threshold is reached.
    pub fn apply_decay(
        &mut self,
        actor: ActorId,
        elapsed: f32,
        multiplier: f32,
        params: &HeatParams,
    ) -> Option<HeatTransition> {
        let state = self.states.get_mut(&actor)?;
        if state.level == HeatLevel::Busted {
            return None;
        }
        let rate = crate::params::at(&params.decay_per_second, state.level);
        let amount = (rate * multiplier.max(0.0) * elapsed).max(0.0);
        let floor = state
            .level
            .prev()
            .map(|prev| params.threshold(prev))
            .unwrap_or(0.0);
        state.heat = (state.heat - amount).max(floor);

        let prev = state.level.prev()?;
        if state.heat < params.threshold(state.level) {
            let transition = HeatTransition {
                actor,
                old: state.level,
                new: prev,
            };
            state.level = prev;
            return Some(transition);
        }
        None
    }

    /// Advance every actor's time since its last witnessed violation.
    pub fn tick_since_violation(&mut self, dt: f32) {
        for state in self.states.values_mut() {
            state.since_violation_secs += dt;
        }
    }

    pub fn decay_allowed(&self, actor: ActorId, params: &HeatParams) -> bool {
        self.state(actor)
            .is_some_and(|s| s.since_violation_secs >= params.decay_grace_secs)
    }

    /// Unconditional jump to `Busted`.
    pub fn force_busted(&mut self, actor: ActorId) -> Option<HeatTransition> {
        let state = self.states.entry(actor).or_default();
        if state.level == HeatLevel::Busted {
            return None;
        }
        let old = state.level;
        state.level = HeatLevel::Busted;
        Some(HeatTransition {
            actor,
            old,
            new: HeatLevel::Busted,
        })
    }

    /// Terminal reset: accumulator to zero and level to `None`.
    pub fn reset(&mut self, actor: ActorId) -> Option<HeatTransition> {
        let state = self.states.remove(&actor)?;
        (state.level != HeatLevel::None).then_some(HeatTransition {
            actor,
            old: state.level,
            new: HeatLevel::None,
        })
    }
}
