//! Bevy systems and plugin for the unit roster.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::actors::PursuedActors;
use crate::clock::{advance_clock, SimClock};
use crate::coordinator::TacticBoard;
use crate::criminal_record::CriminalRecords;
use crate::events::{
    HeatLevelChanged, PursuitUnderstaffed, UnitDamaged, UnitDisableRequested, UnitDisabled,
    UnitDispatched, UnitReleased, UnitSensorUpdated,
};
use crate::heat::HeatController;
use crate::params::PursuitParams;
use crate::sessions::PursuitSessions;
use crate::sim_rng::SimRng;
use crate::simulation_sets::PursuitSet;
use crate::types::{ActorId, UnitId, UnitType};

use super::pool::{DispatchContext, RosterChange, UnitRoster};

fn dispatch_context(
    actor: ActorId,
    actors: &PursuedActors,
    records: &CriminalRecords,
) -> DispatchContext {
    DispatchContext {
        actor,
        target_position: actors.position(actor),
        notoriety: records.notoriety(actor),
    }
}

/// Event writers for roster changes.
#[derive(SystemParam)]
pub struct RosterEvents<'w> {
    pub dispatched: EventWriter<'w, UnitDispatched>,
    pub released: EventWriter<'w, UnitReleased>,
    pub understaffed: EventWriter<'w, PursuitUnderstaffed>,
}

impl RosterEvents<'_> {
    fn publish(
        &mut self,
        actor: ActorId,
        change: &RosterChange,
        roster: &UnitRoster,
        sessions: &mut PursuitSessions,
    ) {
        for id in &change.dispatched {
            let Some(unit) = roster.get(*id) else {
                continue;
            };
            if let Some(session) = sessions.get_mut(actor) {
                session.stats.units_dispatched += 1;
                if unit.unit_type == UnitType::Helicopter {
                    session.stats.helicopter_deployed = true;
                }
            }
            info!("Roster: unit {:?} ({:?}) dispatched to {:?}", id, unit.unit_type, actor);
            self.dispatched.send(UnitDispatched {
                unit: *id,
                unit_type: unit.unit_type,
                actor,
            });
        }
        for id in &change.released {
            debug!("Roster: unit {:?} released from {:?}", id, actor);
            self.released.send(UnitReleased { unit: *id });
        }
        if change.understaffed {
            warn!("Roster: pool exhausted, {:?} is understaffed", actor);
            self.understaffed.send(PursuitUnderstaffed { actor });
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Apply the world collaborator's position and visual feed to each unit.
pub fn ingest_unit_sensors(mut sensors: EventReader<UnitSensorUpdated>, mut roster: ResMut<UnitRoster>) {
    for update in sensors.read() {
        if !update.position.is_finite() || !update.velocity.is_finite() {
            warn!("Roster: non-finite sensor update for {:?} ignored", update.unit);
            continue;
        }
        let Some(unit) = roster.get_mut(update.unit) else {
            warn!("Roster: sensor update for unknown unit {:?} ignored", update.unit);
            continue;
        };
        unit.position = update.position;
        unit.velocity = update.velocity;
        unit.has_visual = update.has_visual && unit.target.is_some() && !unit.is_disabled();
    }
}

/// Apply damage and explicit disable requests. A disabled unit leaves its
/// actor's active set immediately and respawns later as a fresh patrol.
pub fn apply_unit_damage(
    params: Res<PursuitParams>,
    mut damage: EventReader<UnitDamaged>,
    mut disable_requests: EventReader<UnitDisableRequested>,
    mut roster: ResMut<UnitRoster>,
    mut sessions: ResMut<PursuitSessions>,
    mut disabled: EventWriter<UnitDisabled>,
) {
    let mut to_disable: Vec<UnitId> = Vec::new();
    for hit in damage.read() {
        let Some(unit) = roster.get_mut(hit.unit) else {
            warn!("Roster: damage for unknown unit {:?} ignored", hit.unit);
            continue;
        };
        if !unit.is_disabled() && unit.apply_damage(hit.damage) {
            to_disable.push(hit.unit);
        }
    }
    to_disable.extend(disable_requests.read().map(|r| r.unit));

    for id in to_disable {
        match roster.disable(id, params.roster.respawn_delay_secs) {
            Some(actor) => {
                info!("Roster: unit {:?} disabled", id);
                if let Some(session) = actor.and_then(|a| sessions.get_mut(a)) {
                    session.stats.units_disabled += 1;
                }
                disabled.send(UnitDisabled { unit: id });
            }
            None if roster.get(id).is_none() => {
                warn!("Roster: disable request for unknown unit {:?} ignored", id);
            }
            None => {}
        }
    }
}

pub fn tick_unit_respawns(clock: Res<SimClock>, mut roster: ResMut<UnitRoster>) {
    for id in roster.tick_respawns(clock.dt) {
        debug!("Roster: unit {:?} back on patrol", id);
    }
}

// ---------------------------------------------------------------------------
// Roster phase
// ---------------------------------------------------------------------------

/// Resize each actor's roster for every level step emitted this tick, in order,
/// so dispatch sizing sees each intermediate level.
#[allow(clippy::too_many_arguments)]
pub fn resize_rosters(
    params: Res<PursuitParams>,
    actors: Res<PursuedActors>,
    records: Res<CriminalRecords>,
    board: Res<TacticBoard>,
    mut changes: EventReader<HeatLevelChanged>,
    mut roster: ResMut<UnitRoster>,
    mut sessions: ResMut<PursuitSessions>,
    mut rng: ResMut<SimRng>,
    mut events: RosterEvents,
) {
    for change in changes.read() {
        let ctx = dispatch_context(change.actor, &actors, &records);
        let committed = board.committed_units(change.actor);
        let result = roster.resize(&ctx, change.new, &committed, &params.roster, &mut rng.0);
        events.publish(change.actor, &result, &roster, &mut sessions);
    }
}

/// Release units whose tactic ended while their type is no longer allowed,
/// retry dispatch for understaffed actors, then top rosters up one unit per
/// reinforcement interval until the level's cap.
#[allow(clippy::too_many_arguments)]
pub fn reinforce_rosters(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    heat: Res<HeatController>,
    actors: Res<PursuedActors>,
    records: Res<CriminalRecords>,
    board: Res<TacticBoard>,
    mut roster: ResMut<UnitRoster>,
    mut sessions: ResMut<PursuitSessions>,
    mut rng: ResMut<SimRng>,
    mut events: RosterEvents,
) {
    for actor in sessions.active_actors() {
        let level = heat.level(actor);
        if !level.is_pursuit() {
            continue;
        }
        let policy = params.roster.policy(level);
        let ctx = dispatch_context(actor, &actors, &records);

        let released = roster.release_disallowed(actor, policy, &board.committed_units(actor));
        let retry = roster.is_understaffed(actor);
        if retry || !released.is_empty() {
            let mut change = roster.fill_to(
                &ctx,
                policy.min_units as usize,
                policy,
                &params.roster,
                &mut rng.0,
            );
            change.released = released;
            events.publish(actor, &change, &roster, &mut sessions);
            if retry || roster.is_understaffed(actor) {
                continue;
            }
        }

        let below_cap = roster.active_count(actor) < policy.max_units as usize;
        if below_cap
            && roster.tick_reinforcement(actor, clock.dt, policy.reinforce_interval_secs)
        {
            let target = roster.active_count(actor) + 1;
            let change = roster.fill_to(
                &ctx,
                target,
                policy,
                &params.roster,
                &mut rng.0,
            );
            events.publish(actor, &change, &roster, &mut sessions);
        }
    }
}

pub struct RosterPlugin;

impl Plugin for RosterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UnitRoster>()
            .add_systems(
                FixedUpdate,
                (ingest_unit_sensors, apply_unit_damage, tick_unit_respawns)
                    .chain()
                    .after(advance_clock)
                    .in_set(PursuitSet::Input),
            )
            .add_systems(
                FixedUpdate,
                (resize_rosters, reinforce_rosters)
                    .chain()
                    .in_set(PursuitSet::Roster),
            );
    }
}
