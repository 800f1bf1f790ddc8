//! Persistent per-actor criminal record.
//!
//! Mutated only at session-terminal points (escape and bust); nothing reads
//! or writes it mid-pursuit except notoriety lookups for heat and aggression.

use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::sessions::SessionStats;
use crate::types::{ActorId, HeatLevel, ViolationKind};
use crate::violation_ledger::ViolationRecord;
use crate::Saveable;

#[derive(Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct CriminalRecord {
    pub total_busts: u32,
    pub total_escapes: u32,
    pub total_pursuits: u32,
    pub total_fines_paid: f64,
    pub total_bounty_earned: f64,
    pub longest_pursuit_secs: f32,
    pub highest_heat_reached: HeatLevel,
    pub violation_counts: BTreeMap<ViolationKind, u32>,
    pub total_units_disabled: u32,
    /// 0..1 reputation with the police across sessions.
    pub notoriety: f32,
}

impl CriminalRecord {
    fn fold_session(&mut self, peak: HeatLevel, stats: &SessionStats, log: &[ViolationRecord]) {
        self.total_pursuits += 1;
        self.highest_heat_reached = self.highest_heat_reached.max(peak);
        self.total_units_disabled += stats.units_disabled;
        for record in log {
            *self.violation_counts.entry(record.kind).or_insert(0) += 1;
        }
    }

    fn raise_notoriety(&mut self, amount: f32) {
        self.notoriety = (self.notoriety + amount).clamp(0.0, 1.0);
    }

    pub fn record_escape(
        &mut self,
        peak: HeatLevel,
        stats: &SessionStats,
        log: &[ViolationRecord],
        bounty: f64,
        notoriety_gain: f32,
    ) {
        self.fold_session(peak, stats, log);
        self.total_escapes += 1;
        self.total_bounty_earned += bounty;
        self.longest_pursuit_secs = self.longest_pursuit_secs.max(stats.duration_secs);
        self.raise_notoriety(notoriety_gain);
    }

    pub fn record_bust(
        &mut self,
        level: HeatLevel,
        stats: &SessionStats,
        log: &[ViolationRecord],
        fine: f64,
        notoriety_gain: f32,
    ) {
        self.fold_session(level, stats, log);
        self.total_busts += 1;
        self.total_fines_paid += fine;
        self.raise_notoriety(notoriety_gain);
    }

    pub fn violations_of(&self, kind: ViolationKind) -> u32 {
        self.violation_counts.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct CriminalRecords {
    records: BTreeMap<ActorId, CriminalRecord>,
}

impl CriminalRecords {
    pub fn get(&self, actor: ActorId) -> Option<&CriminalRecord> {
        self.records.get(&actor)
    }

    pub fn notoriety(&self, actor: ActorId) -> f32 {
        self.get(actor).map(|r| r.notoriety).unwrap_or(0.0)
    }

    pub fn get_or_default_mut(&mut self, actor: ActorId) -> &mut CriminalRecord {
        self.records.entry(actor).or_default()
    }
}

impl Saveable for CriminalRecords {
    const SAVE_KEY: &'static str = "criminal_records";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.records.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub struct CriminalRecordPlugin;

impl Plugin for CriminalRecordPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CriminalRecords>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<CriminalRecords>();
    }
}
