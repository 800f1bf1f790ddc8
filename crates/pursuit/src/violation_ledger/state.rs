//! `ViolationLedger` resource: the per-actor ordered violation log and the
//! stacking state used to escalate repeated infractions.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::params::{ViolationParams, ViolationRule};
use crate::types::{ActorId, HeatLevel, UnitId, ViolationKind};

use super::calculations::{next_stack_count, violation_fine, violation_heat};

/// One logged infraction. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationRecord {
    pub kind: ViolationKind,
    pub timestamp_secs: f64,
    pub location: Vec2,
    pub heat_delta: f32,
    pub fine: f64,
    pub witnessed: bool,
    pub witness: Option<UnitId>,
    /// How many earlier repeats of this kind were stacked on top of it.
    pub stacks: u32,
}

/// Who saw an infraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Witness {
    pub witnessed: bool,
    pub unit: Option<UnitId>,
}

impl Witness {
    pub const NONE: Witness = Witness {
        witnessed: false,
        unit: None,
    };

    pub fn by(unit: Option<UnitId>) -> Self {
        Self {
            witnessed: true,
            unit,
        }
    }
}

/// Circumstances of a report at the moment it is logged.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext {
    pub location: Vec2,
    pub speed: f32,
    pub now_secs: f64,
    pub level: HeatLevel,
    pub notoriety: f32,
    /// The actor has an open pursuit session.
    pub in_session: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackState {
    pub count: u32,
    pub last_at_secs: f64,
}

#[derive(Resource, Default, Debug)]
pub struct ViolationLedger {
    logs: BTreeMap<ActorId, Vec<ViolationRecord>>,
    stacks: BTreeMap<(ActorId, ViolationKind), StackState>,
}

impl ViolationLedger {
    /// The actor's violations in report order.
    pub fn log(&self, actor: ActorId) -> &[ViolationRecord] {
        self.logs.get(&actor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_fines(&self, actor: ActorId) -> f64 {
        self.log(actor).iter().map(|r| r.fine).sum()
    }

    /// Turn a validated report into an immutable record and append it to the
    /// actor's log. Unwitnessed reports carry zero heat and fine, and are only
    /// logged while the actor has a session.
    pub fn record(
        &mut self,
        actor: ActorId,
        rule: &ViolationRule,
        ctx: ReportContext,
        witness: Witness,
        params: &ViolationParams,
    ) -> ViolationRecord {
        let (heat_delta, fine, stacks) = if witness.witnessed {
            let stacks = self.bump_stack(actor, rule, ctx.now_secs);
            (
                violation_heat(rule, ctx.speed, stacks, ctx.notoriety, params),
                violation_fine(rule, ctx.level, params),
                stacks,
            )
        } else {
            (0.0, 0.0, 0)
        };

        let record = ViolationRecord {
            kind: rule.kind,
            timestamp_secs: ctx.now_secs,
            location: ctx.location,
            heat_delta,
            fine,
            witnessed: witness.witnessed,
            witness: witness.unit,
            stacks,
        };
        if witness.witnessed || ctx.in_session {
            self.logs.entry(actor).or_default().push(record.clone());
        }
        record
    }

    /// Drop records and stacks of actors outside pursuit once they are older
    /// than the longest stack window. `pursued` tells which actors have a
    /// session; their logs are left alone.
    pub fn expire_idle(
        &mut self,
        now_secs: f64,
        params: &ViolationParams,
        pursued: impl Fn(ActorId) -> bool,
    ) {
        let horizon = params
            .rules
            .iter()
            .map(|r| r.stack_window_secs)
            .fold(0.0_f32, f32::max) as f64;
        self.logs.retain(|actor, log| {
            if pursued(*actor) {
                return true;
            }
            log.retain(|r| now_secs - r.timestamp_secs <= horizon);
            !log.is_empty()
        });
        self.stacks
            .retain(|(actor, _), stack| pursued(*actor) || now_secs - stack.last_at_secs <= horizon);
    }

    fn bump_stack(&mut self, actor: ActorId, rule: &ViolationRule, now_secs: f64) -> u32 {
        let previous = self.stacks.get(&(actor, rule.kind)).copied();
        let stacks = next_stack_count(previous, rule, now_secs);
        self.stacks.insert(
            (actor, rule.kind),
            StackState {
                count: stacks,
                last_at_secs: now_secs,
            },
        );
        stacks
    }

    /// Remove and return the actor's log; clears stacking state too.
    pub fn drain(&mut self, actor: ActorId) -> Vec<ViolationRecord> {
        self.stacks.retain(|(a, _), _| *a != actor);
        self.logs.remove(&actor).unwrap_or_default()
    }
}
