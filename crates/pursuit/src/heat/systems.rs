use bevy::prelude::*;

use crate::clock::SimClock;
use crate::cooldown::CooldownZones;
use crate::events::{HeatLevelChanged, ViolationCommitted};
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::sessions::PursuitSessions;
use crate::simulation_sets::PursuitSet;
use crate::types::HeatLevel;

use super::controller::{HeatController, HeatTransition};

/// Emit each transition, opening a session on `None -> Level1` and keeping
/// the session's level and peak in sync.
fn publish_transitions(
    transitions: impl IntoIterator<Item = HeatTransition>,
    now_secs: f64,
    sessions: &mut PursuitSessions,
    writer: &mut EventWriter<HeatLevelChanged>,
) {
    for t in transitions {
        if t.old == HeatLevel::None && t.new.is_pursuit() {
            let id = sessions.start(t.actor, t.new, now_secs).id;
            info!("Heat: pursuit {:?} of {:?} started", id, t.actor);
        }
        if let Some(session) = sessions.get_mut(t.actor) {
            session.heat_level = t.new;
            if t.new.is_pursuit() {
                session.peak_level = session.peak_level.max(t.new);
            }
        }
        info!("Heat: {:?} {:?} -> {:?}", t.actor, t.old, t.new);
        writer.send(HeatLevelChanged {
            actor: t.actor,
            old: t.old,
            new: t.new,
        });
    }
}

/// Feed each committed violation's heat into the controller.
pub fn apply_violation_heat(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    mut committed: EventReader<ViolationCommitted>,
    mut heat: ResMut<HeatController>,
    mut sessions: ResMut<PursuitSessions>,
    mut level_changed: EventWriter<HeatLevelChanged>,
) {
    for event in committed.read() {
        if !event.record.witnessed {
            continue;
        }
        let transitions = heat.apply_delta(event.actor, event.record.heat_delta, &params.heat);
        publish_transitions(transitions, clock.elapsed_secs, &mut sessions, &mut level_changed);
    }
}

/// Decay heat for actors past the grace period that are either hiding in a
/// cooldown zone or unseen. The zone multiplier only applies while unseen, and
/// the last level is never dropped while a unit still has visual.
pub fn decay_heat(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    zones: Res<CooldownZones>,
    roster: Res<UnitRoster>,
    mut heat: ResMut<HeatController>,
    mut sessions: ResMut<PursuitSessions>,
    mut level_changed: EventWriter<HeatLevelChanged>,
) {
    heat.tick_since_violation(clock.dt);

    for actor in heat.actors() {
        let level = heat.level(actor);
        if !level.is_pursuit() || !heat.decay_allowed(actor, &params.heat) {
            continue;
        }
        let visual = roster.any_visual(actor);
        let zone_multiplier = zones.decay_multiplier(actor, level);
        if visual && (zone_multiplier.is_none() || level == HeatLevel::Level1) {
            continue;
        }
        let multiplier = if visual {
            1.0
        } else {
            zone_multiplier.unwrap_or(1.0)
        };
        if let Some(transition) = heat.apply_decay(actor, clock.dt, multiplier, &params.heat) {
            publish_transitions(
                [transition],
                clock.elapsed_secs,
                &mut sessions,
                &mut level_changed,
            );
        }
    }
}

pub struct HeatPlugin;

impl Plugin for HeatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeatController>().add_systems(
            FixedUpdate,
            (apply_violation_heat, decay_heat)
                .chain()
                .in_set(PursuitSet::Heat),
        );
    }
}
