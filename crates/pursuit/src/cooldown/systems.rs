use bevy::prelude::*;

use crate::actors::PursuedActors;
use crate::bust::resolve_captures;
use crate::clock::SimClock;
use crate::criminal_record::CriminalRecords;
use crate::events::{
    CooldownInterrupted, CooldownStarted, CooldownZoneEntered, CooldownZoneExited,
    PursuitResolved,
};
use crate::heat::decay_heat;
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::sessions::{PursuitSessions, PursuitTeardown};
use crate::simulation_sets::PursuitSet;
use crate::types::{HeatLevel, PursuitOutcome};

use super::bounty::{escape_bounty, escape_notoriety};
use super::zones::CooldownZones;

/// Track which zone each pursued actor is in. Runs before decay so a zone
/// entered this tick already speeds up this tick's decay.
pub fn update_zone_occupancy(
    actors: Res<PursuedActors>,
    sessions: Res<PursuitSessions>,
    mut zones: ResMut<CooldownZones>,
    mut entered: EventWriter<CooldownZoneEntered>,
    mut exited: EventWriter<CooldownZoneExited>,
) {
    for actor in sessions.active_actors() {
        let Some(state) = actors.get(actor) else {
            continue;
        };
        let (left, now_in) = zones.update_occupancy(actor, state.position);
        if let Some(zone) = left {
            debug!("Cooldown: {:?} left zone {}", actor, zone);
            exited.send(CooldownZoneExited { actor, zone });
        }
        if let Some(zone) = now_in {
            info!("Cooldown: {:?} entered zone {}", actor, zone);
            entered.send(CooldownZoneEntered { actor, zone });
        }
    }
}

/// Move sessions between `InProgress` and `CooldownPending` as units lose
/// and regain sight of their target.
pub fn update_cooldown_status(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    roster: Res<UnitRoster>,
    mut sessions: ResMut<PursuitSessions>,
    mut started: EventWriter<CooldownStarted>,
    mut interrupted: EventWriter<CooldownInterrupted>,
) {
    for actor in sessions.active_actors() {
        let Some(session) = sessions.get_mut(actor) else {
            continue;
        };
        if roster.any_visual(actor) {
            session.no_visual_secs = 0.0;
            if session.outcome == PursuitOutcome::CooldownPending {
                session.outcome = PursuitOutcome::InProgress;
                debug!("Cooldown: {:?} spotted again", actor);
                interrupted.send(CooldownInterrupted { actor });
            }
            continue;
        }

        session.no_visual_secs += clock.dt;
        if session.outcome == PursuitOutcome::InProgress
            && session.no_visual_secs >= params.cooldown.lost_visual_secs
        {
            session.outcome = PursuitOutcome::CooldownPending;
            info!("Cooldown: {:?} lost by every unit", actor);
            started.send(CooldownStarted { actor });
        }
    }
}

/// Finalize every session whose heat has decayed to `None` while unseen.
pub fn resolve_escapes(
    params: Res<PursuitParams>,
    mut sessions: ResMut<PursuitSessions>,
    mut records: ResMut<CriminalRecords>,
    mut teardown: PursuitTeardown,
    mut resolved: EventWriter<PursuitResolved>,
) {
    for actor in sessions.active_actors() {
        if teardown.heat.level(actor) != HeatLevel::None || teardown.any_visual(actor) {
            continue;
        }
        let log = teardown.finish(actor);
        let Some(session) = sessions.finalize(actor, PursuitOutcome::Escaped, &log) else {
            continue;
        };

        let bounty = escape_bounty(session.peak_level, &session.stats, &params.bounty);
        records.get_or_default_mut(actor).record_escape(
            session.peak_level,
            &session.stats,
            &log,
            bounty,
            escape_notoriety(session.peak_level, &params.bounty),
        );
        info!(
            "Cooldown: {:?} escaped pursuit {:?} (peak {:?}, bounty {:.0})",
            actor, session.id, session.peak_level, bounty
        );
        resolved.send(PursuitResolved {
            actor,
            session: session.id,
            outcome: PursuitOutcome::Escaped,
            stats: session.stats,
        });
    }
}

pub struct CooldownPlugin;

impl Plugin for CooldownPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CooldownZones>()
            .add_systems(
                FixedUpdate,
                update_zone_occupancy
                    .before(decay_heat)
                    .in_set(PursuitSet::Heat),
            )
            .add_systems(
                FixedUpdate,
                (update_cooldown_status, resolve_escapes)
                    .chain()
                    .after(resolve_captures)
                    .in_set(PursuitSet::Resolve),
            );
    }
}
