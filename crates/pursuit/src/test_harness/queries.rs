//! Query and simulation-tick methods for `TestPursuit`.

use bevy::prelude::*;

use crate::bust::ImpoundLot;
use crate::clock::SimClock;
use crate::cooldown::CooldownZones;
use crate::coordinator::{ActorPlans, TacticBoard};
use crate::criminal_record::{CriminalRecord, CriminalRecords};
use crate::heat::HeatController;
use crate::params::PursuitParams;
use crate::roster::{PoliceUnit, UnitRoster};
use crate::sessions::{PursuitSession, PursuitSessions, ResolvedSession};
use crate::types::{ActorId, BehaviorState, HeatLevel, UnitId};

use super::TestPursuit;

impl TestPursuit {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed ticks by executing the `FixedUpdate` schedule directly.
    pub fn tick(&mut self, n: u32) -> &mut Self {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
        self
    }

    /// Run ticks until `done` holds or `max` ticks have passed. Returns the
    /// number of ticks run.
    pub fn tick_until(&mut self, max: u32, mut done: impl FnMut(&TestPursuit) -> bool) -> u32 {
        for n in 0..max {
            if done(self) {
                return n;
            }
            self.tick(1);
        }
        max
    }

    /// Ticks covering `secs` of simulated time.
    pub fn ticks_for(&self, secs: f32) -> u32 {
        (secs / self.params().tick_seconds).ceil() as u32
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn params(&self) -> &PursuitParams {
        self.resource::<PursuitParams>()
    }

    pub fn clock(&self) -> &SimClock {
        self.resource::<SimClock>()
    }

    pub fn roster(&self) -> &UnitRoster {
        self.resource::<UnitRoster>()
    }

    pub fn zones(&self) -> &CooldownZones {
        self.resource::<CooldownZones>()
    }

    pub fn lot(&self) -> &ImpoundLot {
        self.resource::<ImpoundLot>()
    }

    // -----------------------------------------------------------------------
    // Per-actor state
    // -----------------------------------------------------------------------

    pub fn level(&self, actor: ActorId) -> HeatLevel {
        self.resource::<HeatController>().level(actor)
    }

    pub fn heat(&self, actor: ActorId) -> f32 {
        self.resource::<HeatController>().heat(actor)
    }

    pub fn session(&self, actor: ActorId) -> Option<&PursuitSession> {
        self.resource::<PursuitSessions>().get(actor)
    }

    pub fn resolved_sessions(&self) -> &[ResolvedSession] {
        self.resource::<PursuitSessions>().archive()
    }

    pub fn record(&self, actor: ActorId) -> Option<&CriminalRecord> {
        self.resource::<CriminalRecords>().get(actor)
    }

    pub fn plans(&self, actor: ActorId) -> Option<&ActorPlans> {
        self.resource::<TacticBoard>().plans(actor)
    }

    pub fn active_units(&self, actor: ActorId) -> Vec<UnitId> {
        self.roster().active_units(actor).to_vec()
    }

    pub fn unit(&self, id: UnitId) -> &PoliceUnit {
        self.roster()
            .get(id)
            .unwrap_or_else(|| panic!("no unit {id:?} in the roster"))
    }

    /// Units in the pool that are patrolling and attached to no one.
    pub fn patrolling_count(&self) -> usize {
        self.roster()
            .units()
            .filter(|u| u.state == BehaviorState::Patrolling && u.target.is_none())
            .count()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Every `E` sent since the harness was built.
    pub fn events<E: Event + Clone>(&self) -> Vec<E> {
        self.app
            .world()
            .resource::<Events<E>>()
            .iter_current_update_events()
            .cloned()
            .collect()
    }

    pub fn event_count<E: Event>(&self) -> usize {
        self.app
            .world()
            .resource::<Events<E>>()
            .iter_current_update_events()
            .count()
    }
}
