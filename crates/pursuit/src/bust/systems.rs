use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::actors::PursuedActors;
use crate::clock::SimClock;
use crate::criminal_record::CriminalRecords;
use crate::events::{
    Busted, CaptureAttempted, PursuitResolved, VehicleAuctioned, VehicleImpounded,
    VehicleRetrievalRequested, VehicleRetrieved,
};
use crate::params::PursuitParams;
use crate::sessions::{cancel_pursuits, PursuitSessions, PursuitTeardown};
use crate::simulation_sets::PursuitSet;
use crate::types::PursuitOutcome;

use super::consequences::{capture_allowed, compute_consequences};
use super::impound::{ImpoundLot, ImpoundedVehicle};

#[derive(SystemParam)]
pub struct BustEvents<'w> {
    pub busted: EventWriter<'w, Busted>,
    pub impounded: EventWriter<'w, VehicleImpounded>,
    pub resolved: EventWriter<'w, PursuitResolved>,
}

/// Turn successful capture attempts into busts.
///
/// An attempt for an actor without an open session is a no-op, so a session
/// resolves to exactly one terminal outcome no matter how many captures land
/// in the same tick.
#[allow(clippy::too_many_arguments)]
pub fn resolve_captures(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    actors: Res<PursuedActors>,
    mut attempts: EventReader<CaptureAttempted>,
    mut sessions: ResMut<PursuitSessions>,
    mut records: ResMut<CriminalRecords>,
    mut lot: ResMut<ImpoundLot>,
    mut teardown: PursuitTeardown,
    mut events: BustEvents,
) {
    for attempt in attempts.read() {
        let actor = attempt.actor;
        if !sessions.is_active(actor) {
            debug!("Bust: capture of {:?} ignored, no open pursuit", actor);
            continue;
        }
        let level = teardown.heat.level(actor);
        if let Err(reason) = capture_allowed(level, attempt.trigger) {
            debug!("Bust: capture of {:?} rejected: {reason}", actor);
            continue;
        }

        let (vehicle, value) = actors.vehicle_of(actor, params.bust.default_vehicle_value);
        teardown.force_busted(actor);
        let log = teardown.finish(actor);
        let Some(session) = sessions.finalize(actor, PursuitOutcome::Busted, &log) else {
            continue;
        };

        let consequences =
            compute_consequences(level, vehicle, value, &log, &params.bust, &params.impound);
        lot.impound(ImpoundedVehicle::from_bust(actor, clock.day, &consequences));
        records.get_or_default_mut(actor).record_bust(
            session.peak_level,
            &session.stats,
            &log,
            consequences.fine,
            params.bust.notoriety_increment,
        );

        info!(
            "Bust: {:?} busted at {:?} by {:?} (unit {:?}), fine {:.0}",
            actor, level, attempt.trigger, attempt.unit, consequences.fine
        );
        events.impounded.send(VehicleImpounded {
            vehicle,
            actor,
            retrieval_cost: consequences.retrieval_cost,
        });
        events.busted.send(Busted {
            actor,
            consequences,
        });
        events.resolved.send(PursuitResolved {
            actor,
            session: session.id,
            outcome: PursuitOutcome::Busted,
            stats: session.stats,
        });
    }
}

/// Handle retrieval requests and auction off vehicles whose storage ran out.
pub fn process_impound(
    clock: Res<SimClock>,
    mut requests: EventReader<VehicleRetrievalRequested>,
    mut lot: ResMut<ImpoundLot>,
    mut retrieved: EventWriter<VehicleRetrieved>,
    mut auctioned: EventWriter<VehicleAuctioned>,
) {
    for request in requests.read() {
        match lot.retrieve(request.vehicle, clock.day) {
            Some(cost) => {
                info!("Impound: {:?} retrieved for {:.0}", request.vehicle, cost);
                retrieved.send(VehicleRetrieved {
                    vehicle: request.vehicle,
                    cost,
                });
            }
            None => warn!("Impound: {:?} is not impounded", request.vehicle),
        }
    }

    for record in lot.process_auctions(clock.day) {
        info!("Impound: {:?} auctioned", record.vehicle);
        auctioned.send(VehicleAuctioned {
            vehicle: record.vehicle,
            actor: record.owner,
        });
    }
}

pub struct BustPlugin;

impl Plugin for BustPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ImpoundLot>()
            .add_systems(
                FixedUpdate,
                resolve_captures
                    .after(cancel_pursuits)
                    .in_set(PursuitSet::Resolve),
            )
            .add_systems(FixedUpdate, process_impound.in_set(PursuitSet::Report));

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<ImpoundLot>();
    }
}
