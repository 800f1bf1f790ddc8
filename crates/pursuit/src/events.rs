//! Messages exchanged with the collaborators around the pursuit engine.
//!
//! Inbound events are written by gameplay, physics and world systems; the
//! pursuit systems only read them. Outbound events are written by the pursuit
//! systems for UI, audio and other subsystems to observe. No pursuit system
//! calls into a collaborator directly.

use bevy::prelude::*;

use crate::bust::BustConsequences;
use crate::sessions::SessionStats;
use crate::types::{
    ActorId, CaptureTrigger, HeatLevel, PerturbationCause, PursuitOutcome, SessionId, Tactic,
    UnitId, UnitType, VehicleId, ViolationKind,
};
use crate::violation_ledger::ViolationRecord;

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// An infraction detected by a gameplay system.
///
/// `kind_code` is the wire code of a [`ViolationKind`]; unknown codes are
/// logged and dropped.
#[derive(Event, Debug, Clone)]
pub struct ViolationReported {
    pub actor: ActorId,
    pub kind_code: u8,
    pub location: Vec2,
    pub speed: f32,
}

impl ViolationReported {
    pub fn new(actor: ActorId, kind: ViolationKind, location: Vec2, speed: f32) -> Self {
        Self {
            actor,
            kind_code: kind.code(),
            location,
            speed,
        }
    }
}

/// Per-frame position feed for a pursued actor.
#[derive(Event, Debug, Clone)]
pub struct ActorTransformUpdated {
    pub actor: ActorId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// The vehicle an actor is driving, used for fines and impounds.
#[derive(Event, Debug, Clone)]
pub struct ActorVehicleAssigned {
    pub actor: ActorId,
    pub vehicle: VehicleId,
    pub value: f64,
}

#[derive(Event, Debug, Clone)]
pub struct NearMissRecorded {
    pub actor: ActorId,
}

/// Damage dealt to a police unit by the collision collaborator.
#[derive(Event, Debug, Clone)]
pub struct UnitDamaged {
    pub unit: UnitId,
    pub damage: f32,
}

/// A collision or weapon event that takes a unit out regardless of health.
#[derive(Event, Debug, Clone)]
pub struct UnitDisableRequested {
    pub unit: UnitId,
}

/// World feed for one police unit: where it is and whether it can see its target.
#[derive(Event, Debug, Clone)]
pub struct UnitSensorUpdated {
    pub unit: UnitId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub has_visual: bool,
}

/// Administrative end of a pursuit (race or session end). Not persisted.
#[derive(Event, Debug, Clone)]
pub struct PursuitCancelRequested {
    pub actor: ActorId,
}

/// A capture-class event succeeded; the bust resolver decides whether it sticks.
#[derive(Event, Debug, Clone)]
pub struct CaptureAttempted {
    pub actor: ActorId,
    pub unit: Option<UnitId>,
    pub trigger: CaptureTrigger,
}

#[derive(Event, Debug, Clone)]
pub struct VehicleRetrievalRequested {
    pub vehicle: VehicleId,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Emitted for every single-level step, up or down.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HeatLevelChanged {
    pub actor: ActorId,
    pub old: HeatLevel,
    pub new: HeatLevel,
}

#[derive(Event, Debug, Clone)]
pub struct ViolationCommitted {
    pub actor: ActorId,
    pub record: ViolationRecord,
}

#[derive(Event, Debug, Clone)]
pub struct UnitDispatched {
    pub unit: UnitId,
    pub unit_type: UnitType,
    pub actor: ActorId,
}

#[derive(Event, Debug, Clone)]
pub struct UnitDisabled {
    pub unit: UnitId,
}

/// A unit went back to the pool as a fresh patrol.
#[derive(Event, Debug, Clone)]
pub struct UnitReleased {
    pub unit: UnitId,
}

#[derive(Event, Debug, Clone)]
pub struct TacticAssigned {
    pub unit: UnitId,
    pub actor: ActorId,
    pub tactic: Tactic,
}

#[derive(Event, Debug, Clone)]
pub struct TacticResolved {
    pub actor: ActorId,
    pub tactic: Tactic,
    pub success: bool,
}

/// The target should lose control; simulated by the physics collaborator.
#[derive(Event, Debug, Clone)]
pub struct TargetControlPerturbed {
    pub actor: ActorId,
    pub unit: Option<UnitId>,
    pub cause: PerturbationCause,
}

/// Progress (0..1) of a boxed target being held to a stop.
#[derive(Event, Debug, Clone)]
pub struct BustProgress {
    pub actor: ActorId,
    pub progress: f32,
}

/// Raised when an actor's pursuit has fewer units than its level asks for.
#[derive(Event, Debug, Clone)]
pub struct PursuitUnderstaffed {
    pub actor: ActorId,
}

#[derive(Event, Debug, Clone)]
pub struct CooldownZoneEntered {
    pub actor: ActorId,
    pub zone: u32,
}

#[derive(Event, Debug, Clone)]
pub struct CooldownZoneExited {
    pub actor: ActorId,
    pub zone: u32,
}

#[derive(Event, Debug, Clone)]
pub struct CooldownStarted {
    pub actor: ActorId,
}

#[derive(Event, Debug, Clone)]
pub struct CooldownInterrupted {
    pub actor: ActorId,
}

#[derive(Event, Debug, Clone)]
pub struct PursuitResolved {
    pub actor: ActorId,
    pub session: SessionId,
    pub outcome: PursuitOutcome,
    pub stats: SessionStats,
}

#[derive(Event, Debug, Clone)]
pub struct PursuitCancelled {
    pub actor: ActorId,
    pub session: SessionId,
}

#[derive(Event, Debug, Clone)]
pub struct Busted {
    pub actor: ActorId,
    pub consequences: BustConsequences,
}

#[derive(Event, Debug, Clone)]
pub struct VehicleImpounded {
    pub vehicle: VehicleId,
    pub actor: ActorId,
    pub retrieval_cost: f64,
}

#[derive(Event, Debug, Clone)]
pub struct VehicleRetrieved {
    pub vehicle: VehicleId,
    pub cost: f64,
}

#[derive(Event, Debug, Clone)]
pub struct VehicleAuctioned {
    pub vehicle: VehicleId,
    pub actor: ActorId,
}

pub struct PursuitEventsPlugin;

impl Plugin for PursuitEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ViolationReported>()
            .add_event::<ActorTransformUpdated>()
            .add_event::<ActorVehicleAssigned>()
            .add_event::<NearMissRecorded>()
            .add_event::<UnitDamaged>()
            .add_event::<UnitDisableRequested>()
            .add_event::<UnitSensorUpdated>()
            .add_event::<PursuitCancelRequested>()
            .add_event::<CaptureAttempted>()
            .add_event::<VehicleRetrievalRequested>()
            .add_event::<HeatLevelChanged>()
            .add_event::<ViolationCommitted>()
            .add_event::<UnitDispatched>()
            .add_event::<UnitDisabled>()
            .add_event::<UnitReleased>()
            .add_event::<TacticAssigned>()
            .add_event::<TacticResolved>()
            .add_event::<TargetControlPerturbed>()
            .add_event::<BustProgress>()
            .add_event::<PursuitUnderstaffed>()
            .add_event::<CooldownZoneEntered>()
            .add_event::<CooldownZoneExited>()
            .add_event::<CooldownStarted>()
            .add_event::<CooldownInterrupted>()
            .add_event::<PursuitResolved>()
            .add_event::<PursuitCancelled>()
            .add_event::<Busted>()
            .add_event::<VehicleImpounded>()
            .add_event::<VehicleRetrieved>()
            .add_event::<VehicleAuctioned>();
    }
}
