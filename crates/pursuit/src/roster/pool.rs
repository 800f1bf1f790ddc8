//! `UnitRoster` resource: the arena of police units, the per-actor active
//! sets, and the resize/dispatch/release operations that keep each actor's
//! roster inside its heat level's policy.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use rand::Rng;

use crate::params::{LevelPolicy, RosterParams};
use crate::types::{ActorId, BehaviorState, HeatLevel, UnitId, UnitType};

use super::dispatch::{dispatch_preference, release_order, spawn_position, ReleaseCandidate};
use super::unit::PoliceUnit;

/// Where and for whom a dispatch happens.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext {
    pub actor: ActorId,
    pub target_position: Vec2,
    pub notoriety: f32,
}

/// Units moved in or out of an actor's roster by one operation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RosterChange {
    pub dispatched: Vec<UnitId>,
    pub released: Vec<UnitId>,
    /// The pool could not supply the units the level asks for, and the
    /// actor was not already flagged as understaffed.
    pub understaffed: bool,
}

#[derive(Resource, Default, Debug)]
pub struct UnitRoster {
    units: Vec<PoliceUnit>,
    active: BTreeMap<ActorId, Vec<UnitId>>,
    understaffed: BTreeSet<ActorId>,
    reinforce_timers: BTreeMap<ActorId, f32>,
    /// Unit that witnessed an actor's latest violation, dispatched first.
    witness_hints: BTreeMap<ActorId, UnitId>,
}

impl UnitRoster {
    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn get(&self, id: UnitId) -> Option<&PoliceUnit> {
        self.units.get(id.index())
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut PoliceUnit> {
        self.units.get_mut(id.index())
    }

    pub fn units(&self) -> impl Iterator<Item = &PoliceUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Active, non-disabled units attached to `actor`.
    pub fn active_units(&self, actor: ActorId) -> &[UnitId] {
        self.active.get(&actor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_count(&self, actor: ActorId) -> usize {
        self.active_units(actor).len()
    }

    /// Actors that currently have at least one active unit.
    pub fn pursued_actors(&self) -> Vec<ActorId> {
        self.active
            .iter()
            .filter(|(_, units)| !units.is_empty())
            .map(|(actor, _)| *actor)
            .collect()
    }

    pub fn any_visual(&self, actor: ActorId) -> bool {
        self.active_units(actor)
            .iter()
            .filter_map(|id| self.get(*id))
            .any(|u| u.has_visual)
    }

    fn active_types(&self, actor: ActorId) -> Vec<UnitType> {
        self.active_units(actor)
            .iter()
            .filter_map(|id| self.get(*id))
            .map(|u| u.unit_type)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Flags and timers
    // -----------------------------------------------------------------------

    pub fn is_understaffed(&self, actor: ActorId) -> bool {
        self.understaffed.contains(&actor)
    }

    /// Flag the actor for a dispatch retry; true if the flag was newly set.
    pub fn mark_understaffed(&mut self, actor: ActorId) -> bool {
        self.understaffed.insert(actor)
    }

    pub fn set_witness_hint(&mut self, actor: ActorId, unit: UnitId) {
        self.witness_hints.insert(actor, unit);
    }

    /// Advance the actor's reinforcement timer; true when it fires.
    pub fn tick_reinforcement(&mut self, actor: ActorId, dt: f32, interval: f32) -> bool {
        let timer = self.reinforce_timers.entry(actor).or_insert(0.0);
        *timer += dt;
        if *timer >= interval {
            *timer = 0.0;
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Pool
    // -----------------------------------------------------------------------

    /// Add a patrolling unit to the pool, regardless of capacity.
    pub fn spawn_patrol(&mut self, unit_type: UnitType, position: Vec2) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(PoliceUnit::new(id, unit_type, position));
        id
    }

    fn allocate(&mut self, unit_type: UnitType, position: Vec2, capacity: u32) -> Option<UnitId> {
        if self.units.len() >= capacity as usize {
            return None;
        }
        Some(self.spawn_patrol(unit_type, position))
    }

    /// Nearest pooled unit of `unit_type` to `near`.
    fn nearest_pooled(&self, unit_type: UnitType, near: Vec2) -> Option<UnitId> {
        self.units
            .iter()
            .filter(|u| u.is_available() && u.unit_type == unit_type)
            .min_by(|a, b| {
                a.position
                    .distance_squared(near)
                    .total_cmp(&b.position.distance_squared(near))
                    .then(a.id.cmp(&b.id))
            })
            .map(|u| u.id)
    }

    fn attach(&mut self, id: UnitId, ctx: &DispatchContext, policy: &LevelPolicy, params: &RosterParams) {
        let aggression =
            policy.aggression * (1.0 + ctx.notoriety.clamp(0.0, 1.0) * params.notoriety_aggression_bonus);
        if let Some(unit) = self.units.get_mut(id.index()) {
            unit.target = Some(ctx.actor);
            unit.state = BehaviorState::Alerted;
            unit.tactic = None;
            unit.aggression = aggression;
            unit.time_in_pursuit = 0.0;
            unit.last_known_target = Some(ctx.target_position);
            unit.destination = Some(ctx.target_position);
            self.active.entry(ctx.actor).or_default().push(id);
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch / release
    // -----------------------------------------------------------------------

    /// Dispatch one unit to the actor: the violation's witness if it is still
    /// pooled and allowed, otherwise the most wanted type, taken from the pool
    /// (nearest first) or freshly allocated while capacity remains.
    pub fn dispatch_one(
        &mut self,
        ctx: &DispatchContext,
        policy: &LevelPolicy,
        params: &RosterParams,
        rng: &mut impl Rng,
    ) -> Option<UnitId> {
        let current = self.active_types(ctx.actor);
        let preference = dispatch_preference(policy, &current, params.max_helicopters_per_actor);

        if let Some(witness) = self.witness_hints.remove(&ctx.actor) {
            let usable = self
                .get(witness)
                .is_some_and(|u| u.is_available() && preference.contains(&u.unit_type));
            if usable {
                self.attach(witness, ctx, policy, params);
                return Some(witness);
            }
        }

        for unit_type in preference {
            let id = match self.nearest_pooled(unit_type, ctx.target_position) {
                Some(id) => Some(id),
                None => {
                    let position = spawn_position(ctx.target_position, params.spawn_distance, rng);
                    self.allocate(unit_type, position, params.pool_capacity)
                }
            };
            if let Some(id) = id {
                self.attach(id, ctx, policy, params);
                return Some(id);
            }
        }
        None
    }

    /// Dispatch until the actor has `target` active units or the pool runs dry.
    pub fn fill_to(
        &mut self,
        ctx: &DispatchContext,
        target: usize,
        policy: &LevelPolicy,
        params: &RosterParams,
        rng: &mut impl Rng,
    ) -> RosterChange {
        let mut change = RosterChange::default();
        let mut short = false;
        while self.active_count(ctx.actor) < target {
            match self.dispatch_one(ctx, policy, params, rng) {
                Some(id) => change.dispatched.push(id),
                None => {
                    short = true;
                    break;
                }
            }
        }
        if short {
            change.understaffed = self.understaffed.insert(ctx.actor);
        } else if self.active_count(ctx.actor) >= policy.min_units as usize {
            self.understaffed.remove(&ctx.actor);
        }
        change
    }

    /// Return a unit to the pool as a fresh patrol. False for stale ids and
    /// units that are not attached to anyone.
    pub fn release(&mut self, id: UnitId) -> bool {
        let Some(actor) = self.get(id).and_then(|u| u.target) else {
            return false;
        };
        if let Some(list) = self.active.get_mut(&actor) {
            list.retain(|u| *u != id);
        }
        if let Some(unit) = self.units.get_mut(id.index()) {
            let position = unit.position;
            unit.reset_to_patrol(position);
        }
        true
    }

    /// Release every active unit of the actor and forget its roster state.
    pub fn release_all(&mut self, actor: ActorId) -> Vec<UnitId> {
        let ids = self.active.remove(&actor).unwrap_or_default();
        for id in &ids {
            if let Some(unit) = self.units.get_mut(id.index()) {
                let position = unit.position;
                unit.reset_to_patrol(position);
            }
        }
        self.understaffed.remove(&actor);
        self.reinforce_timers.remove(&actor);
        self.witness_hints.remove(&actor);
        ids
    }

    /// Take a unit out of action. Returns the actor it was attached to, or
    /// `None` if the id is stale or the unit was already disabled.
    pub fn disable(&mut self, id: UnitId, respawn_delay: f32) -> Option<Option<ActorId>> {
        let unit = self.units.get_mut(id.index())?;
        if unit.is_disabled() {
            return None;
        }
        let actor = unit.target.take();
        unit.state = BehaviorState::Disabled;
        unit.tactic = None;
        unit.health = 0.0;
        unit.has_visual = false;
        unit.destination = None;
        unit.respawn_in = Some(respawn_delay);
        if let Some(actor) = actor {
            if let Some(list) = self.active.get_mut(&actor) {
                list.retain(|u| *u != id);
            }
        }
        Some(actor)
    }

    /// Count down disabled units; those that are due come back as fresh
    /// patrols at their home position.
    pub fn tick_respawns(&mut self, dt: f32) -> Vec<UnitId> {
        let mut respawned = Vec::new();
        for unit in self.units.iter_mut() {
            let Some(remaining) = unit.respawn_in else {
                continue;
            };
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                let home = unit.home;
                unit.reset_to_patrol(home);
                respawned.push(unit.id);
            } else {
                unit.respawn_in = Some(remaining);
            }
        }
        respawned
    }

    // -----------------------------------------------------------------------
    // Resize
    // -----------------------------------------------------------------------

    /// Release the actor's units whose type `policy` no longer allows.
    /// Units in `committed` are kept until their tactic ends.
    pub fn release_disallowed(
        &mut self,
        actor: ActorId,
        policy: &LevelPolicy,
        committed: &BTreeSet<UnitId>,
    ) -> Vec<UnitId> {
        let released: Vec<UnitId> = self
            .active_units(actor)
            .iter()
            .filter_map(|id| self.get(*id))
            .filter(|u| !policy.allows(u.unit_type) && !committed.contains(&u.id))
            .map(|u| u.id)
            .collect();
        for id in &released {
            self.release(*id);
        }
        released
    }

    /// Bring the actor's roster in line with `level`.
    ///
    /// Leaving pursuit releases everything. Otherwise units of types the
    /// level does not allow are released first, then the lowest-priority
    /// units above the cap (see [`release_order`]); units in `committed` go
    /// last. Below `min_units`, units are dispatched at once.
    pub fn resize(
        &mut self,
        ctx: &DispatchContext,
        level: HeatLevel,
        committed: &BTreeSet<UnitId>,
        params: &RosterParams,
        rng: &mut impl Rng,
    ) -> RosterChange {
        if !level.is_pursuit() {
            return RosterChange {
                released: self.release_all(ctx.actor),
                ..Default::default()
            };
        }

        let policy = params.policy(level);
        let max = policy.max_units as usize;
        let mut released = self.release_disallowed(ctx.actor, policy, committed);
        let count = self.active_count(ctx.actor);

        if count > max {
            let candidates = self
                .active_units(ctx.actor)
                .iter()
                .filter_map(|id| self.get(*id))
                .map(|u| ReleaseCandidate {
                    id: u.id,
                    committed: committed.contains(&u.id),
                    allowed: policy.allows(u.unit_type),
                    distance: u.position.distance(ctx.target_position),
                    time_in_pursuit: u.time_in_pursuit,
                })
                .collect();
            let over: Vec<UnitId> = release_order(candidates)
                .into_iter()
                .take(count - max)
                .collect();
            for id in &over {
                self.release(*id);
            }
            released.extend(over);
        }

        let mut change = self.fill_to(ctx, policy.min_units as usize, policy, params, rng);
        change.released = released;
        change
    }
}
