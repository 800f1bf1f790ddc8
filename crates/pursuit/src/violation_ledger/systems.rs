use bevy::prelude::*;

use crate::clock::SimClock;
use crate::criminal_record::CriminalRecords;
use crate::events::{CooldownInterrupted, ViolationCommitted, ViolationReported};
use crate::heat::HeatController;
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::sessions::PursuitSessions;
use crate::simulation_sets::PursuitSet;
use crate::types::{ActorId, PursuitOutcome, UnitId};

use super::calculations::validate_report;
use super::state::{ReportContext, ViolationLedger, Witness};

fn nearest(units: impl Iterator<Item = (UnitId, f32)>) -> Option<UnitId> {
    units
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(id, _)| id)
}

/// The unit that saw an infraction at `location`: an active unit of the
/// actor with visual first, otherwise any working unit within `sensor_range`.
/// Nearest wins in both cases.
pub fn find_witness(
    roster: &UnitRoster,
    actor: ActorId,
    location: Vec2,
    sensor_range: f32,
) -> Option<UnitId> {
    let chasing = roster
        .active_units(actor)
        .iter()
        .filter_map(|id| roster.get(*id))
        .filter(|u| u.has_visual)
        .map(|u| (u.id, u.position.distance(location)));
    nearest(chasing).or_else(|| {
        nearest(
            roster
                .units()
                .filter(|u| !u.is_disabled())
                .map(|u| (u.id, u.position.distance(location)))
                .filter(|(_, d)| *d <= sensor_range),
        )
    })
}

/// Turn inbound reports into ledger records. A witnessed report during
/// cooldown puts the pursuit back in progress. Records of actors outside
/// pursuit expire first.
#[allow(clippy::too_many_arguments)]
pub fn record_violations(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    heat: Res<HeatController>,
    records: Res<CriminalRecords>,
    mut reports: EventReader<ViolationReported>,
    mut ledger: ResMut<ViolationLedger>,
    mut roster: ResMut<UnitRoster>,
    mut sessions: ResMut<PursuitSessions>,
    mut committed: EventWriter<ViolationCommitted>,
    mut interrupted: EventWriter<CooldownInterrupted>,
) {
    ledger.expire_idle(clock.elapsed_secs, &params.violations, |actor| {
        sessions.is_active(actor)
    });

    for report in reports.read() {
        let kind = match validate_report(report) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("ViolationLedger: report for {:?} dropped: {e}", report.actor);
                continue;
            }
        };
        let Some(rule) = params.violations.rule(kind) else {
            warn!("ViolationLedger: no rule for {:?}, report dropped", kind);
            continue;
        };

        let seen_by = find_witness(
            &roster,
            report.actor,
            report.location,
            params.violations.sensor_range,
        );
        let witness = match seen_by {
            Some(unit) => Witness::by(Some(unit)),
            None if !rule.requires_witness => Witness::by(None),
            None => Witness::NONE,
        };

        let ctx = ReportContext {
            location: report.location,
            speed: report.speed,
            now_secs: clock.elapsed_secs,
            level: heat.level(report.actor),
            notoriety: records.notoriety(report.actor),
            in_session: sessions.is_active(report.actor),
        };
        let record = ledger.record(report.actor, rule, ctx, witness, &params.violations);
        debug!(
            "ViolationLedger: {:?} {:?} heat {:.1} fine {:.0} witnessed {}",
            report.actor, record.kind, record.heat_delta, record.fine, record.witnessed
        );

        if let Some(unit) = record.witness {
            if roster.get(unit).is_some_and(|u| u.is_available()) {
                roster.set_witness_hint(report.actor, unit);
            }
        }

        if record.witnessed {
            if let Some(session) = sessions.get_mut(report.actor) {
                if session.outcome == PursuitOutcome::CooldownPending {
                    session.outcome = PursuitOutcome::InProgress;
                    session.no_visual_secs = 0.0;
                    session.stats.cooldowns_interrupted += 1;
                    info!("ViolationLedger: cooldown of {:?} interrupted", report.actor);
                    interrupted.send(CooldownInterrupted {
                        actor: report.actor,
                    });
                }
            }
        }

        committed.send(ViolationCommitted {
            actor: report.actor,
            record,
        });
    }
}

pub struct ViolationLedgerPlugin;

impl Plugin for ViolationLedgerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViolationLedger>()
            .add_systems(FixedUpdate, record_violations.in_set(PursuitSet::Ledger));
    }
}
