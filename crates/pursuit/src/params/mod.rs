//! Data-driven pursuit tuning.
//!
//! Every threshold, multiplier, window and radius the pursuit engine reads
//! lives in the [`PursuitParams`] resource so designers can retune it without
//! recompiling. Parameters load from JSON, are checked by
//! [`PursuitParams::validate`], and are registered as `Saveable` so tuned
//! overrides persist with the rest of the pursuit state.

mod tables;
mod validation;


use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub use tables::*;
pub use validation::ParamsError;
pub(crate) use validation::positive;

/// All pursuit tunables.
#[derive(Resource, Debug, Clone, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
#[serde(default)]
pub struct PursuitParams {
    /// Simulated seconds advanced by one `FixedUpdate` tick.
    pub tick_seconds: f32,
    /// Simulated seconds per in-game day (impound storage and auctions).
    pub day_length_secs: f32,
    pub violations: ViolationParams,
    pub heat: HeatParams,
    pub roster: RosterParams,
    pub tactics: TacticParams,
    pub behavior: BehaviorParams,
    pub cooldown: CooldownParams,
    pub bounty: BountyParams,
    pub bust: BustParams,
    pub impound: ImpoundParams,
}

impl Default for PursuitParams {
    fn default() -> Self {
        Self {
            tick_seconds: 0.1,
            day_length_secs: 1_200.0,
            violations: ViolationParams::default(),
            heat: HeatParams::default(),
            roster: RosterParams::default(),
            tactics: TacticParams::default(),
            behavior: BehaviorParams::default(),
            cooldown: CooldownParams::default(),
            bounty: BountyParams::default(),
            bust: BustParams::default(),
            impound: ImpoundParams::default(),
        }
    }
}

impl PursuitParams {
    /// Check the tables for internal consistency (increasing thresholds,
    /// non-decreasing unit caps, sane windows).
    pub fn validate(&self) -> Result<(), ParamsError> {
        validation::validate(self)
    }

    /// Parse and validate a JSON parameter document. Missing fields keep
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: PursuitParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Like [`Self::from_json_str`], but logs the error and falls back to the
    /// defaults instead of failing.
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json_str(json) {
            Ok(params) => params,
            Err(e) => {
                warn!("PursuitParams: {e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ParamsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Saveable implementation
// ---------------------------------------------------------------------------

impl crate::Saveable for PursuitParams {
    const SAVE_KEY: &'static str = "pursuit_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        // Always save so tuned overrides survive a reload.
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct PursuitParamsPlugin;

impl Plugin for PursuitParamsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PursuitParams>();

        if let Err(e) = app.world().resource::<PursuitParams>().validate() {
            warn!("PursuitParams: inserted parameters are inconsistent: {e}");
        }

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<PursuitParams>();
    }
}
