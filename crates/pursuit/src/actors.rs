//! Pursued actors as seen by the pursuit engine: the latest transform from
//! the world collaborator and the vehicle used for fines and impounds.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::clock::advance_clock;
use crate::events::{ActorTransformUpdated, ActorVehicleAssigned, NearMissRecorded};
use crate::params::PursuitParams;
use crate::sessions::PursuitSessions;
use crate::simulation_sets::PursuitSet;
use crate::types::{ActorId, VehicleId};

#[derive(Debug, Clone, PartialEq)]
pub struct ActorState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub vehicle: VehicleId,
    pub vehicle_value: f64,
}

impl ActorState {
    fn new(actor: ActorId, vehicle_value: f64) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            vehicle: VehicleId(actor.0),
            vehicle_value,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

#[derive(Resource, Default, Debug)]
pub struct PursuedActors {
    actors: BTreeMap<ActorId, ActorState>,
}

impl PursuedActors {
    pub fn get(&self, actor: ActorId) -> Option<&ActorState> {
        self.actors.get(&actor)
    }

    /// Last known position; the origin for actors never reported.
    pub fn position(&self, actor: ActorId) -> Vec2 {
        self.get(actor).map(|a| a.position).unwrap_or(Vec2::ZERO)
    }

    pub fn velocity(&self, actor: ActorId) -> Vec2 {
        self.get(actor).map(|a| a.velocity).unwrap_or(Vec2::ZERO)
    }

    /// Vehicle and its value. Actors without an assignment drive a vehicle
    /// keyed by their own id, valued at `default_value`.
    pub fn vehicle_of(&self, actor: ActorId, default_value: f64) -> (VehicleId, f64) {
        match self.get(actor) {
            Some(state) => (state.vehicle, state.vehicle_value),
            None => (VehicleId(actor.0), default_value),
        }
    }

    /// Store a transform and return the distance moved since the last one.
    pub fn update_transform(
        &mut self,
        actor: ActorId,
        position: Vec2,
        velocity: Vec2,
        default_value: f64,
    ) -> f32 {
        match self.actors.get_mut(&actor) {
            Some(state) => {
                let moved = state.position.distance(position);
                state.position = position;
                state.velocity = velocity;
                moved
            }
            None => {
                let mut state = ActorState::new(actor, default_value);
                state.position = position;
                state.velocity = velocity;
                self.actors.insert(actor, state);
                0.0
            }
        }
    }

    pub fn assign_vehicle(&mut self, actor: ActorId, vehicle: VehicleId, value: f64) {
        let state = self
            .actors
            .entry(actor)
            .or_insert_with(|| ActorState::new(actor, value));
        state.vehicle = vehicle;
        state.vehicle_value = value;
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub fn ingest_actor_transforms(
    params: Res<PursuitParams>,
    mut updates: EventReader<ActorTransformUpdated>,
    mut actors: ResMut<PursuedActors>,
    mut sessions: ResMut<PursuitSessions>,
) {
    for update in updates.read() {
        if !update.position.is_finite() || !update.velocity.is_finite() {
            warn!("Actors: non-finite transform for {:?} ignored", update.actor);
            continue;
        }
        let moved = actors.update_transform(
            update.actor,
            update.position,
            update.velocity,
            params.bust.default_vehicle_value,
        );
        if let Some(session) = sessions.get_mut(update.actor) {
            session.stats.distance += moved;
            session.stats.top_speed = session.stats.top_speed.max(update.velocity.length());
        }
    }
}

pub fn ingest_vehicle_assignments(
    mut assignments: EventReader<ActorVehicleAssigned>,
    mut actors: ResMut<PursuedActors>,
) {
    for assignment in assignments.read() {
        if !assignment.value.is_finite() || assignment.value < 0.0 {
            warn!(
                "Actors: invalid vehicle value {} for {:?} ignored",
                assignment.value, assignment.actor
            );
            continue;
        }
        actors.assign_vehicle(assignment.actor, assignment.vehicle, assignment.value);
    }
}

pub fn ingest_near_misses(
    mut near_misses: EventReader<NearMissRecorded>,
    mut sessions: ResMut<PursuitSessions>,
) {
    for near_miss in near_misses.read() {
        if let Some(session) = sessions.get_mut(near_miss.actor) {
            session.stats.near_misses += 1;
        }
    }
}

pub struct ActorsPlugin;

impl Plugin for ActorsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PursuedActors>().add_systems(
            FixedUpdate,
            (
                ingest_actor_transforms,
                ingest_vehicle_assignments,
                ingest_near_misses,
            )
                .chain()
                .after(advance_clock)
                .in_set(PursuitSet::Input),
        );
    }
}
