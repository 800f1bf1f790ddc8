//! Builder and collaborator-input methods for `TestPursuit`.

use bevy::prelude::*;

use crate::actors::PursuedActors;
use crate::cooldown::{CooldownZone, CooldownZones};
use crate::criminal_record::CriminalRecords;
use crate::events::{
    ActorTransformUpdated, ActorVehicleAssigned, CaptureAttempted, NearMissRecorded,
    PursuitCancelRequested, UnitDamaged, UnitDisableRequested, UnitSensorUpdated,
    VehicleRetrievalRequested, ViolationReported,
};
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::sim_rng::SimRng;
use crate::types::{ActorId, CaptureTrigger, UnitId, UnitType, VehicleId, ViolationKind};

use super::TestPursuit;

impl TestPursuit {
    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn with_params(mut self, params: PursuitParams) -> Self {
        self.app.insert_resource(params);
        self
    }

    /// Tweak the default parameters in place.
    pub fn with_tuning(mut self, tune: impl FnOnce(&mut PursuitParams)) -> Self {
        {
            let mut params = self.app.world_mut().resource_mut::<PursuitParams>();
            tune(&mut params);
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.app.insert_resource(SimRng::from_seed_u64(seed));
        self
    }

    /// Put a patrolling unit in the pool at `position`.
    pub fn with_patrol_unit(mut self, unit_type: UnitType, position: Vec2) -> Self {
        self.app
            .world_mut()
            .resource_mut::<UnitRoster>()
            .spawn_patrol(unit_type, position);
        self
    }

    /// Put `count` patrol cars in the pool, spaced 5 m apart along +x from
    /// `start`.
    pub fn with_patrol_units(mut self, count: u32, start: Vec2) -> Self {
        for i in 0..count {
            self = self.with_patrol_unit(UnitType::Patrol, start + Vec2::X * 5.0 * i as f32);
        }
        self
    }

    pub fn with_cooldown_zone(mut self, zone: CooldownZone) -> Self {
        self.app
            .world_mut()
            .resource_mut::<CooldownZones>()
            .register(zone);
        self
    }

    /// Place an actor in the world before the first tick.
    pub fn with_actor(mut self, actor: ActorId, position: Vec2, velocity: Vec2) -> Self {
        let default_value = self
            .app
            .world()
            .resource::<PursuitParams>()
            .bust
            .default_vehicle_value;
        self.app
            .world_mut()
            .resource_mut::<PursuedActors>()
            .update_transform(actor, position, velocity, default_value);
        self
    }

    pub fn with_vehicle(mut self, actor: ActorId, vehicle: VehicleId, value: f64) -> Self {
        self.app
            .world_mut()
            .resource_mut::<PursuedActors>()
            .assign_vehicle(actor, vehicle, value);
        self
    }

    pub fn with_notoriety(mut self, actor: ActorId, notoriety: f32) -> Self {
        self.app
            .world_mut()
            .resource_mut::<CriminalRecords>()
            .get_or_default_mut(actor)
            .notoriety = notoriety;
        self
    }

    // -----------------------------------------------------------------------
    // Collaborator input (delivered on the next tick)
    // -----------------------------------------------------------------------

    pub fn send<E: Event>(&mut self, event: E) -> &mut Self {
        self.app.world_mut().send_event(event);
        self
    }

    pub fn report_violation(
        &mut self,
        actor: ActorId,
        kind: ViolationKind,
        location: Vec2,
        speed: f32,
    ) -> &mut Self {
        self.send(ViolationReported::new(actor, kind, location, speed))
    }

    pub fn move_actor(&mut self, actor: ActorId, position: Vec2, velocity: Vec2) -> &mut Self {
        self.send(ActorTransformUpdated {
            actor,
            position,
            velocity,
        })
    }

    pub fn assign_vehicle(&mut self, actor: ActorId, vehicle: VehicleId, value: f64) -> &mut Self {
        self.send(ActorVehicleAssigned {
            actor,
            vehicle,
            value,
        })
    }

    pub fn near_miss(&mut self, actor: ActorId) -> &mut Self {
        self.send(NearMissRecorded { actor })
    }

    pub fn sense(&mut self, unit: UnitId, position: Vec2, velocity: Vec2, has_visual: bool) -> &mut Self {
        self.send(UnitSensorUpdated {
            unit,
            position,
            velocity,
            has_visual,
        })
    }

    /// Report every active unit of `actor` at its current position with the
    /// given visual contact.
    pub fn sense_all(&mut self, actor: ActorId, has_visual: bool) -> &mut Self {
        let units: Vec<(UnitId, Vec2, Vec2)> = {
            let roster = self.app.world().resource::<UnitRoster>();
            roster
                .active_units(actor)
                .iter()
                .filter_map(|id| roster.get(*id))
                .map(|u| (u.id, u.position, u.velocity))
                .collect()
        };
        for (id, position, velocity) in units {
            self.sense(id, position, velocity, has_visual);
        }
        self
    }

    /// Teleport every active unit of `actor` onto a ring of `radius` around
    /// `center`, each with the given visual contact.
    pub fn surround(&mut self, actor: ActorId, center: Vec2, radius: f32, has_visual: bool) -> &mut Self {
        let ids = self.active_units(actor);
        let n = ids.len().max(1) as f32;
        for (i, id) in ids.into_iter().enumerate() {
            let offset = Vec2::from_angle(std::f32::consts::TAU * i as f32 / n) * radius;
            self.sense(id, center + offset, Vec2::ZERO, has_visual);
        }
        self
    }

    pub fn damage_unit(&mut self, unit: UnitId, damage: f32) -> &mut Self {
        self.send(UnitDamaged { unit, damage })
    }

    pub fn disable_unit(&mut self, unit: UnitId) -> &mut Self {
        self.send(UnitDisableRequested { unit })
    }

    pub fn attempt_capture(
        &mut self,
        actor: ActorId,
        unit: Option<UnitId>,
        trigger: CaptureTrigger,
    ) -> &mut Self {
        self.send(CaptureAttempted {
            actor,
            unit,
            trigger,
        })
    }

    pub fn cancel(&mut self, actor: ActorId) -> &mut Self {
        self.send(PursuitCancelRequested { actor })
    }

    pub fn request_retrieval(&mut self, vehicle: VehicleId) -> &mut Self {
        self.send(VehicleRetrievalRequested { vehicle })
    }
}
