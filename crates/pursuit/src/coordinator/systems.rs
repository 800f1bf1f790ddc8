use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::actors::PursuedActors;
use crate::events::{PursuitUnderstaffed, TacticAssigned, TacticResolved};
use crate::heat::HeatController;
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::sessions::PursuitSessions;
use crate::simulation_sets::PursuitSet;
use crate::types::UnitId;

use super::board::TacticBoard;
use super::planning::{plan_tactics, prune_plans, TargetView, UnitView};

/// Run the tactical planner for every actor under pursuit and push the
/// resulting tactics onto the units. Only changes are announced.
#[allow(clippy::too_many_arguments)]
pub fn coordinate_pursuits(
    params: Res<PursuitParams>,
    heat: Res<HeatController>,
    actors: Res<PursuedActors>,
    sessions: Res<PursuitSessions>,
    mut board: ResMut<TacticBoard>,
    mut roster: ResMut<UnitRoster>,
    mut assigned: EventWriter<TacticAssigned>,
    mut resolved: EventWriter<TacticResolved>,
    mut understaffed: EventWriter<PursuitUnderstaffed>,
) {
    for actor in sessions.active_actors() {
        let level = heat.level(actor);
        if !level.is_pursuit() {
            continue;
        }

        let live: BTreeSet<UnitId> = roster.active_units(actor).iter().copied().collect();
        let plans = board.plans_mut(actor);
        for tactic in prune_plans(plans, &live, &params.tactics) {
            debug!("Coordinator: {:?} for {:?} lost its units", tactic, actor);
            resolved.send(TacticResolved {
                actor,
                tactic,
                success: false,
            });
        }

        let views: Vec<UnitView> = roster
            .active_units(actor)
            .iter()
            .filter_map(|id| roster.get(*id))
            .map(|u| UnitView {
                id: u.id,
                unit_type: u.unit_type,
                position: u.position,
            })
            .collect();
        let target = TargetView {
            position: actors.position(actor),
            velocity: actors.velocity(actor),
        };

        let result = plan_tactics(level, &target, &views, plans, &params.tactics);
        if result.understaffed {
            if roster.mark_understaffed(actor) {
                warn!("Coordinator: no units left to pursue {:?}", actor);
                understaffed.send(PursuitUnderstaffed { actor });
            }
            continue;
        }

        for (id, tactic) in result.assignments {
            let Some(unit) = roster.get_mut(id) else {
                warn!("Coordinator: stale unit {:?} skipped", id);
                continue;
            };
            if unit.tactic == tactic {
                continue;
            }
            unit.tactic = tactic;
            if let Some(tactic) = tactic {
                debug!("Coordinator: {:?} -> {:?}", id, tactic);
                assigned.send(TacticAssigned {
                    unit: id,
                    actor,
                    tactic,
                });
            }
        }
    }
}

pub struct CoordinatorPlugin;

impl Plugin for CoordinatorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TacticBoard>().add_systems(
            FixedUpdate,
            coordinate_pursuits.in_set(PursuitSet::Coordinate),
        );
    }
}
