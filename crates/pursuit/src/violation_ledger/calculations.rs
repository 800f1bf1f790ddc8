//! Pure heat, fine and stacking functions for violation reports.

use std::fmt;

use crate::events::ViolationReported;
use crate::params::{at, ViolationParams, ViolationRule};
use crate::types::{HeatLevel, ViolationKind};

use super::state::StackState;

/// Why a violation report was dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportRejected {
    UnknownKind(u8),
    InvalidSpeed(f32),
    InvalidLocation,
}

impl fmt::Display for ReportRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportRejected::UnknownKind(code) => write!(f, "unknown violation kind code {code}"),
            ReportRejected::InvalidSpeed(speed) => write!(f, "invalid context speed {speed}"),
            ReportRejected::InvalidLocation => write!(f, "non-finite location"),
        }
    }
}

/// Check a raw report and decode its kind.
pub fn validate_report(report: &ViolationReported) -> Result<ViolationKind, ReportRejected> {
    let kind = ViolationKind::from_code(report.kind_code)
        .ok_or(ReportRejected::UnknownKind(report.kind_code))?;
    if !report.speed.is_finite() || report.speed < 0.0 {
        return Err(ReportRejected::InvalidSpeed(report.speed));
    }
    if !report.location.is_finite() {
        return Err(ReportRejected::InvalidLocation);
    }
    Ok(kind)
}

/// Stack count for a new report given the previous stack for the same kind.
/// Repeats inside the rule's window stack, up to `max_stacks`.
pub fn next_stack_count(previous: Option<StackState>, rule: &ViolationRule, now_secs: f64) -> u32 {
    if !rule.stackable {
        return 0;
    }
    match previous {
        Some(prev) if now_secs - prev.last_at_secs <= rule.stack_window_secs as f64 => {
            (prev.count + 1).min(rule.max_stacks)
        }
        _ => 0,
    }
}

/// Heat contributed by a witnessed report.
pub fn violation_heat(
    rule: &ViolationRule,
    speed: f32,
    stacks: u32,
    notoriety: f32,
    params: &ViolationParams,
) -> f32 {
    let mut heat = rule.base_heat;
    if rule.kind.scales_with_speed() {
        heat += (speed - params.speed_limit).max(0.0) * params.speeding_heat_per_unit;
    }
    heat *= rule.stack_multiplier.powi(stacks as i32);
    heat * (1.0 + notoriety.clamp(0.0, 1.0) * params.notoriety_heat_bonus)
}

/// Fine for a witnessed report at the current heat level.
pub fn violation_fine(rule: &ViolationRule, level: HeatLevel, params: &ViolationParams) -> f64 {
    rule.base_fine * at(&params.fine_multiplier, level) as f64
}
