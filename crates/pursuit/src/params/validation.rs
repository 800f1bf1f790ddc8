//! Consistency checks for [`PursuitParams`](super::PursuitParams).

use std::fmt;

use crate::types::{HeatLevel, ViolationKind};

use super::PursuitParams;

/// Errors that can occur while loading or validating tuning parameters.
#[derive(Debug)]
pub enum ParamsError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),
    /// A level's threshold is not above the previous level's.
    ThresholdNotIncreasing { level: HeatLevel },
    /// A level allows fewer units at most than it dispatches at once.
    UnitBoundsInverted { level: HeatLevel },
    /// A level allows fewer units than the level below it.
    MaxUnitsDecreasing { level: HeatLevel },
    /// A pursuit level has no unit types to dispatch.
    EmptyComposition { level: HeatLevel },
    /// Fines get cheaper as heat rises.
    FineMultiplierDecreasing { level: HeatLevel },
    /// No rule for a violation kind.
    MissingViolationRule(ViolationKind),
    /// The accumulator clamp sits below the top threshold.
    MaxHeatBelowThreshold,
    /// A rate, window or radius that must be positive is not.
    NotPositive(&'static str),
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::Parse(e) => write!(f, "invalid parameter document: {e}"),
            ParamsError::ThresholdNotIncreasing { level } => {
                write!(f, "heat threshold for {level:?} must exceed the level below")
            }
            ParamsError::UnitBoundsInverted { level } => {
                write!(f, "{level:?} policy has min_units above max_units")
            }
            ParamsError::MaxUnitsDecreasing { level } => {
                write!(f, "{level:?} policy allows fewer units than the level below")
            }
            ParamsError::EmptyComposition { level } => {
                write!(f, "{level:?} policy has no unit types")
            }
            ParamsError::FineMultiplierDecreasing { level } => {
                write!(f, "fine multiplier for {level:?} is below the level below")
            }
            ParamsError::MissingViolationRule(kind) => {
                write!(f, "no violation rule for {kind:?}")
            }
            ParamsError::MaxHeatBelowThreshold => {
                write!(f, "max_heat is below the Level5 threshold")
            }
            ParamsError::NotPositive(field) => write!(f, "{field} must be positive"),
        }
    }
}

impl std::error::Error for ParamsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParamsError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParamsError {
    fn from(e: serde_json::Error) -> Self {
        ParamsError::Parse(e)
    }
}

pub(crate) fn positive(value: f32, field: &'static str) -> Result<(), ParamsError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ParamsError::NotPositive(field))
    }
}

pub(super) fn validate(params: &PursuitParams) -> Result<(), ParamsError> {
    positive(params.tick_seconds, "tick_seconds")?;
    positive(params.day_length_secs, "day_length_secs")?;
    positive(params.heat.max_heat, "heat.max_heat")?;
    positive(params.violations.sensor_range, "violations.sensor_range")?;
    positive(params.tactics.unit_travel_speed, "tactics.unit_travel_speed")?;
    positive(
        params.behavior.maneuver_attempt_interval_secs,
        "behavior.maneuver_attempt_interval_secs",
    )?;
    positive(params.behavior.max_relative_speed, "behavior.max_relative_speed")?;

    for kind in ViolationKind::ALL {
        if params.violations.rule(kind).is_none() {
            return Err(ParamsError::MissingViolationRule(kind));
        }
    }

    let mut previous = HeatLevel::None;
    for level in HeatLevel::PURSUIT_LEVELS {
        if params.heat.threshold(level) <= params.heat.threshold(previous) {
            return Err(ParamsError::ThresholdNotIncreasing { level });
        }

        let policy = params.roster.policy(level);
        if policy.min_units > policy.max_units {
            return Err(ParamsError::UnitBoundsInverted { level });
        }
        if policy.max_units < params.roster.policy(previous).max_units {
            return Err(ParamsError::MaxUnitsDecreasing { level });
        }
        if policy.composition.is_empty() || policy.composition.iter().all(|(_, w)| *w <= 0.0) {
            return Err(ParamsError::EmptyComposition { level });
        }

        let fines = &params.violations.fine_multiplier;
        if fines[level.tier()] < fines[previous.tier()] {
            return Err(ParamsError::FineMultiplierDecreasing { level });
        }
        previous = level;
    }

    if params.heat.threshold(HeatLevel::Level5) > params.heat.max_heat {
        return Err(ParamsError::MaxHeatBelowThreshold);
    }

    Ok(())
}
