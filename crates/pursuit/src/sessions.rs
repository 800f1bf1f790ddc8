//! Pursuit sessions: one per actively pursued actor, created when heat first
//! crosses into `Level1` and finalized exactly once on a terminal outcome.
//!
//! The violation log and the active unit ids of a session are owned by the
//! `ViolationLedger` and the `UnitRoster`; a session only carries its id,
//! outcome and statistics. [`PursuitTeardown`] is the shared terminal path
//! used by escape, bust and cancellation.

use std::collections::BTreeMap;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::clock::SimClock;
use crate::cooldown::CooldownZones;
use crate::coordinator::TacticBoard;
use crate::events::{HeatLevelChanged, PursuitCancelRequested, PursuitCancelled, UnitReleased};
use crate::heat::{HeatController, HeatTransition};
use crate::params::PursuitParams;
use crate::roster::UnitRoster;
use crate::simulation_sets::PursuitSet;
use crate::types::{ActorId, HeatLevel, PursuitOutcome, SessionId};
use crate::violation_ledger::{ViolationLedger, ViolationRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    pub duration_secs: f32,
    pub top_speed: f32,
    pub distance: f32,
    /// Tactics the actor escaped (roadblocks, spike strips).
    pub evasions: u32,
    pub units_disabled: u32,
    pub near_misses: u32,
    pub roadblocks_evaded: u32,
    pub spike_strips_evaded: u32,
    pub cooldowns_interrupted: u32,
    pub units_dispatched: u32,
    pub helicopter_deployed: bool,
    /// Running bounty shown while the pursuit is live.
    pub live_bounty: f64,
    pub violations: u32,
    pub total_fines: f64,
}

#[derive(Debug, Clone)]
pub struct PursuitSession {
    pub id: SessionId,
    pub actor: ActorId,
    pub heat_level: HeatLevel,
    pub peak_level: HeatLevel,
    pub outcome: PursuitOutcome,
    pub started_at_secs: f64,
    /// Seconds since any active unit last had visual contact.
    pub no_visual_secs: f32,
    pub stats: SessionStats,
}

/// A finalized session, kept for post-pursuit summaries.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: SessionId,
    pub actor: ActorId,
    pub outcome: PursuitOutcome,
    pub peak_level: HeatLevel,
    pub stats: SessionStats,
}

/// Open sessions plus the most recent finalized ones. The archive keeps at
/// most [`PursuitSessions::ARCHIVE_LIMIT`] entries, oldest dropped first;
/// hosts that want the full history take it with [`PursuitSessions::drain_archive`].
#[derive(Resource, Default, Debug)]
pub struct PursuitSessions {
    active: BTreeMap<ActorId, PursuitSession>,
    archive: Vec<ResolvedSession>,
    next_id: u64,
}

impl PursuitSessions {
    pub const ARCHIVE_LIMIT: usize = 64;

    /// Open a session for `actor`, or return the one already open.
    pub fn start(&mut self, actor: ActorId, level: HeatLevel, now_secs: f64) -> &mut PursuitSession {
        let next_id = &mut self.next_id;
        self.active.entry(actor).or_insert_with(|| {
            *next_id += 1;
            PursuitSession {
                id: SessionId(*next_id),
                actor,
                heat_level: level,
                peak_level: level,
                outcome: PursuitOutcome::InProgress,
                started_at_secs: now_secs,
                no_visual_secs: 0.0,
                stats: SessionStats::default(),
            }
        })
    }

    pub fn get(&self, actor: ActorId) -> Option<&PursuitSession> {
        self.active.get(&actor)
    }

    pub fn get_mut(&mut self, actor: ActorId) -> Option<&mut PursuitSession> {
        self.active.get_mut(&actor)
    }

    pub fn is_active(&self, actor: ActorId) -> bool {
        self.active.contains_key(&actor)
    }

    pub fn active_actors(&self) -> Vec<ActorId> {
        self.active.keys().copied().collect()
    }

    /// Close the actor's session with a terminal `outcome`, folding the
    /// drained violation log into its stats. `None` if no session is open,
    /// which makes every terminal path idempotent.
    pub fn finalize(
        &mut self,
        actor: ActorId,
        outcome: PursuitOutcome,
        log: &[ViolationRecord],
    ) -> Option<ResolvedSession> {
        let mut session = self.active.remove(&actor)?;
        session.outcome = outcome;
        session.stats.violations = log.len() as u32;
        session.stats.total_fines = log.iter().map(|r| r.fine).sum();
        let resolved = ResolvedSession {
            id: session.id,
            actor,
            outcome,
            peak_level: session.peak_level,
            stats: session.stats,
        };
        self.archive.push(resolved.clone());
        if self.archive.len() > Self::ARCHIVE_LIMIT {
            let excess = self.archive.len() - Self::ARCHIVE_LIMIT;
            self.archive.drain(..excess);
        }
        Some(resolved)
    }

    /// Drop the actor's session without archiving it.
    pub fn discard(&mut self, actor: ActorId) -> Option<PursuitSession> {
        self.active.remove(&actor)
    }

    /// Finalized sessions, oldest first.
    pub fn archive(&self) -> &[ResolvedSession] {
        &self.archive
    }

    /// Hand the archived sessions to the host and empty the archive.
    pub fn drain_archive(&mut self) -> Vec<ResolvedSession> {
        std::mem::take(&mut self.archive)
    }
}

/// Live bounty accrued over `dt` seconds at `level`.
pub fn live_bounty_rate(level: HeatLevel, params: &crate::params::BountyParams) -> f64 {
    if !level.is_pursuit() {
        return 0.0;
    }
    params.bounty_per_second * params.level_growth.powi(level.tier() as i32 - 1)
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

/// Everything a terminal outcome has to reset for one actor.
#[derive(SystemParam)]
pub struct PursuitTeardown<'w> {
    pub heat: ResMut<'w, HeatController>,
    pub roster: ResMut<'w, UnitRoster>,
    pub board: ResMut<'w, TacticBoard>,
    pub ledger: ResMut<'w, ViolationLedger>,
    pub zones: ResMut<'w, CooldownZones>,
    pub level_changed: EventWriter<'w, HeatLevelChanged>,
    pub released: EventWriter<'w, UnitReleased>,
}

impl PursuitTeardown<'_> {
    fn send_transition(&mut self, transition: HeatTransition) {
        info!(
            "Heat: {:?} {:?} -> {:?}",
            transition.actor, transition.old, transition.new
        );
        self.level_changed.send(HeatLevelChanged {
            actor: transition.actor,
            old: transition.old,
            new: transition.new,
        });
    }

    /// Transition the actor to `Busted`, emitting the level change.
    pub fn force_busted(&mut self, actor: ActorId) {
        if let Some(transition) = self.heat.force_busted(actor) {
            self.send_transition(transition);
        }
    }

    pub fn any_visual(&self, actor: ActorId) -> bool {
        self.roster.any_visual(actor)
    }

    /// Release every unit back to patrol, drop tactic plans and zone
    /// occupancy, reset heat to `None` and hand back the drained violation log.
    pub fn finish(&mut self, actor: ActorId) -> Vec<ViolationRecord> {
        for unit in self.roster.release_all(actor) {
            self.released.send(UnitReleased { unit });
        }
        self.board.clear(actor);
        self.zones.clear_occupancy(actor);
        if let Some(transition) = self.heat.reset(actor) {
            self.send_transition(transition);
        }
        self.ledger.drain(actor)
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Administrative cancellation: units go back to patrol and the session is
/// discarded without touching the criminal record.
pub fn cancel_pursuits(
    mut requests: EventReader<PursuitCancelRequested>,
    mut sessions: ResMut<PursuitSessions>,
    mut teardown: PursuitTeardown,
    mut cancelled: EventWriter<PursuitCancelled>,
) {
    for request in requests.read() {
        let Some(session) = sessions.discard(request.actor) else {
            debug!("Sessions: cancel for {:?} without a pursuit ignored", request.actor);
            continue;
        };
        teardown.finish(request.actor);
        info!("Sessions: pursuit {:?} of {:?} cancelled", session.id, request.actor);
        cancelled.send(PursuitCancelled {
            actor: request.actor,
            session: session.id,
        });
    }
}

pub fn track_session_stats(
    params: Res<PursuitParams>,
    clock: Res<SimClock>,
    mut sessions: ResMut<PursuitSessions>,
) {
    for session in sessions.active.values_mut() {
        session.stats.duration_secs += clock.dt;
        session.stats.live_bounty +=
            live_bounty_rate(session.heat_level, &params.bounty) * clock.dt as f64;
    }
}

pub struct SessionsPlugin;

impl Plugin for SessionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PursuitSessions>()
            .add_systems(FixedUpdate, cancel_pursuits.in_set(PursuitSet::Resolve))
            .add_systems(FixedUpdate, track_session_stats.in_set(PursuitSet::Report));
    }
}
