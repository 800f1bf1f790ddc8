use crate::params::BountyParams;
use crate::sessions::SessionStats;
use crate::types::HeatLevel;

/// Bounty paid out for escaping a pursuit that peaked at `peak`.
///
/// The peak level's base grows with every minute survived; disabled units,
/// evaded roadblocks and a deployed helicopter add flat bonuses.
pub fn escape_bounty(peak: HeatLevel, stats: &SessionStats, params: &BountyParams) -> f64 {
    let base = params.base_by_level[peak.tier()];
    let minutes = stats.duration_secs as f64 / 60.0;
    let mut bounty = base * (1.0 + minutes * params.duration_bonus_per_minute);
    bounty += stats.units_disabled as f64 * params.unit_disabled_bonus;
    bounty += stats.roadblocks_evaded as f64 * params.roadblock_bonus;
    if stats.helicopter_deployed {
        bounty += params.helicopter_bonus;
    }
    bounty
}

/// Criminal record notoriety gained by escaping at `peak`.
pub fn escape_notoriety(peak: HeatLevel, params: &BountyParams) -> f32 {
    params.escape_notoriety_per_level * peak.tier() as f32
}
