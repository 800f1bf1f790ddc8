use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::actors::PursuedActors;
use crate::clock::SimClock;
use crate::coordinator::{TacticBoard, TargetView};
use crate::events::{BustProgress, CaptureAttempted, TacticResolved, TargetControlPerturbed};
use crate::heat::HeatController;
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::sessions::PursuitSessions;
use crate::sim_rng::SimRng;
use crate::simulation_sets::PursuitSet;
use crate::types::{ActorId, CaptureTrigger, PerturbationCause, Tactic, UnitId};

use super::formations::{evaluate_formations, FormationEvent};
use super::fsm::{step_unit, StepContext};

#[derive(SystemParam)]
pub struct BehaviorEvents<'w> {
    pub perturbed: EventWriter<'w, TargetControlPerturbed>,
    pub captures: EventWriter<'w, CaptureAttempted>,
    pub progress: EventWriter<'w, BustProgress>,
    pub resolved: EventWriter<'w, TacticResolved>,
}

impl BehaviorEvents<'_> {
    fn perturb(&mut self, actor: ActorId, unit: Option<UnitId>, cause: PerturbationCause) {
        debug!("Behavior: {:?} lands {:?} on {:?}", unit, cause, actor);
        self.perturbed.send(TargetControlPerturbed { actor, unit, cause });
    }

    fn capture(&mut self, actor: ActorId, unit: Option<UnitId>, trigger: CaptureTrigger) {
        info!("Behavior: capture attempt on {:?} ({:?})", actor, trigger);
        self.captures.send(CaptureAttempted {
            actor,
            unit,
            trigger,
        });
    }
}

/// Step every attached unit's state machine.
#[allow(clippy::too_many_arguments)]
pub fn update_unit_behavior(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    heat: Res<HeatController>,
    actors: Res<PursuedActors>,
    sessions: Res<PursuitSessions>,
    board: Res<TacticBoard>,
    mut roster: ResMut<UnitRoster>,
    mut rng: ResMut<SimRng>,
    mut events: BehaviorEvents,
) {
    for actor in sessions.active_actors() {
        let level = heat.level(actor);
        if !level.is_pursuit() {
            continue;
        }
        let aerial_track = board
            .plans(actor)
            .and_then(|p| p.aerial)
            .and_then(|id| roster.get(id))
            .is_some_and(|u| u.has_visual);
        let ctx = StepContext {
            level,
            target_position: actors.position(actor),
            target_velocity: actors.velocity(actor),
            aerial_track,
            dt: clock.dt,
        };

        for id in roster.active_units(actor).to_vec() {
            let Some(unit) = roster.get_mut(id) else {
                continue;
            };
            if let Some(signal) = step_unit(unit, &ctx, &params.behavior, &mut rng.0) {
                let (cause, trigger) = signal.contact();
                events.perturb(actor, Some(id), cause);
                events.capture(actor, Some(id), trigger);
            }
        }
    }
}

/// Advance formation plans and publish their outcomes.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_pursuit_formations(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    heat: Res<HeatController>,
    actors: Res<PursuedActors>,
    mut sessions: ResMut<PursuitSessions>,
    mut board: ResMut<TacticBoard>,
    mut roster: ResMut<UnitRoster>,
    mut events: BehaviorEvents,
) {
    for actor in sessions.active_actors() {
        let level = heat.level(actor);
        if !level.is_pursuit() {
            continue;
        }
        let target = TargetView {
            position: actors.position(actor),
            velocity: actors.velocity(actor),
        };
        let outcomes = evaluate_formations(
            board.plans_mut(actor),
            &mut roster,
            &target,
            level,
            &params.behavior,
            &params.tactics,
            clock.dt,
        );

        for outcome in outcomes {
            match outcome {
                FormationEvent::BustProgress(progress) => {
                    events.progress.send(BustProgress { actor, progress });
                }
                FormationEvent::Resolved { tactic, success } => {
                    debug!("Behavior: {:?} against {:?} resolved, success {}", tactic, actor, success);
                    events.resolved.send(TacticResolved {
                        actor,
                        tactic,
                        success,
                    });
                }
                FormationEvent::Capture { unit, trigger } => events.capture(actor, unit, trigger),
                FormationEvent::Perturbed { unit, cause } => events.perturb(actor, unit, cause),
                FormationEvent::Evaded(tactic) => {
                    if let Some(session) = sessions.get_mut(actor) {
                        session.stats.evasions += 1;
                        match tactic {
                            Tactic::RoadblockAhead => session.stats.roadblocks_evaded += 1,
                            Tactic::SpikeStripTrap => session.stats.spike_strips_evaded += 1,
                            _ => {}
                        }
                    }
                }
            }
        }
    }
}

pub struct BehaviorPlugin;

impl Plugin for BehaviorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (update_unit_behavior, evaluate_pursuit_formations)
                .chain()
                .in_set(PursuitSet::Behavior),
        );
    }
}
