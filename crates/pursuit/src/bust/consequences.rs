use std::fmt;

use crate::params::{BustParams, ImpoundParams};
use crate::types::{CaptureTrigger, HeatLevel, VehicleId};
use crate::violation_ledger::ViolationRecord;

/// Everything a bust costs the actor.
#[derive(Debug, Clone, PartialEq)]
pub struct BustConsequences {
    pub impound: bool,
    pub vehicle: VehicleId,
    pub fine: f64,
    pub reputation_loss: f64,
    pub retrieval_cost: f64,
    pub daily_storage_fee: f64,
    pub days_until_auction: u32,
    /// Heat level the capture happened at.
    pub level: HeatLevel,
    pub violation_count: u32,
}

/// Why a capture attempt did not end the pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRejection {
    NotCaptureClass(CaptureTrigger),
    LevelTooLow(HeatLevel),
}

impl fmt::Display for CaptureRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureRejection::NotCaptureClass(trigger) => {
                write!(f, "{trigger:?} cannot end a pursuit")
            }
            CaptureRejection::LevelTooLow(level) => {
                write!(f, "captures need Level4 or above, actor is at {level:?}")
            }
        }
    }
}

/// Whether a capture by `trigger` sticks at `level`.
pub fn capture_allowed(level: HeatLevel, trigger: CaptureTrigger) -> Result<(), CaptureRejection> {
    if !trigger.is_capture_class() {
        return Err(CaptureRejection::NotCaptureClass(trigger));
    }
    if !level.is_pursuit() || level < HeatLevel::Level4 {
        return Err(CaptureRejection::LevelTooLow(level));
    }
    Ok(())
}

/// Fine, reputation loss and impound terms for a bust at `level`.
///
/// Both the fine and the reputation loss grow with every violation logged in
/// the session.
pub fn compute_consequences(
    level: HeatLevel,
    vehicle: VehicleId,
    vehicle_value: f64,
    log: &[ViolationRecord],
    bust: &BustParams,
    impound: &ImpoundParams,
) -> BustConsequences {
    let tier = level.tier();
    let session_fines: f64 = log.iter().map(|r| r.fine).sum();
    let violation_factor = 1.0 + log.len() as f64 * bust.per_violation_bonus;

    let fine = (bust.base_fine + session_fines + vehicle_value * bust.vehicle_fine_pct[tier])
        * bust.level_multiplier[tier]
        * violation_factor;

    BustConsequences {
        impound: true,
        vehicle,
        fine,
        reputation_loss: bust.reputation_loss[tier] * violation_factor,
        retrieval_cost: impound.base_fee + vehicle_value * impound.value_pct,
        daily_storage_fee: impound.daily_storage_fee,
        days_until_auction: impound.days_until_auction,
        level,
        violation_count: log.len() as u32,
    }
}
