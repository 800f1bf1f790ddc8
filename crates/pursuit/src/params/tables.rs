//! Tuning tables grouped by subsystem, with designer defaults.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::types::{HeatLevel, UnitType, ViolationKind, LEVEL_TIERS};

/// Look up a per-level row. `Busted` shares the `Level5` row.
pub fn at<T: Copy>(table: &[T; LEVEL_TIERS], level: HeatLevel) -> T {
    table[level.tier()]
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// Heat and fine for one violation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ViolationRule {
    pub kind: ViolationKind,
    pub base_heat: f32,
    pub base_fine: f64,
    /// Unwitnessed reports of this kind log with zero heat and zero fine.
    pub requires_witness: bool,
    pub stackable: bool,
    /// Heat multiplier applied once per stacked repeat.
    pub stack_multiplier: f32,
    pub max_stacks: u32,
    /// A repeat within this many seconds of the previous one stacks.
    pub stack_window_secs: f32,
}

impl ViolationRule {
    fn new(kind: ViolationKind, base_heat: f32, base_fine: f64, stackable: bool) -> Self {
        Self {
            kind,
            base_heat,
            base_fine,
            requires_witness: true,
            stackable,
            stack_multiplier: 1.25,
            max_stacks: 5,
            stack_window_secs: 10.0,
        }
    }

    fn unwitnessed(mut self) -> Self {
        self.requires_witness = false;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct ViolationParams {
    pub rules: Vec<ViolationRule>,
    /// Radius within which any police unit witnesses an infraction.
    pub sensor_range: f32,
    /// Speed above which speeding reports gain extra heat.
    pub speed_limit: f32,
    pub speeding_heat_per_unit: f32,
    /// Heat gain multiplier per point of notoriety: `1 + notoriety * bonus`.
    pub notoriety_heat_bonus: f32,
    /// Fine multiplier by the heat level at the time of the report.
    pub fine_multiplier: [f32; LEVEL_TIERS],
}

impl ViolationParams {
    pub fn rule(&self, kind: ViolationKind) -> Option<&ViolationRule> {
        self.rules.iter().find(|r| r.kind == kind)
    }
}

impl Default for ViolationParams {
    fn default() -> Self {
        use ViolationKind::*;
        Self {
            rules: vec![
                ViolationRule::new(Speeding, 20.0, 350.0, true),
                ViolationRule::new(Reckless, 40.0, 800.0, true),
                ViolationRule::new(RunRedLight, 25.0, 200.0, false),
                ViolationRule::new(WrongWay, 30.0, 400.0, true),
                ViolationRule::new(PropertyDamage, 35.0, 1_000.0, true),
                ViolationRule::new(HitCivilian, 75.0, 2_000.0, true),
                ViolationRule::new(HitPolice, 150.0, 5_000.0, true),
                ViolationRule::new(EvadePursuit, 100.0, 3_000.0, false),
                ViolationRule::new(NearMissPolice, 50.0, 500.0, true),
                ViolationRule::new(SpeedTrap, 20.0, 350.0, false).unwitnessed(),
                ViolationRule::new(RoadblockBreach, 125.0, 3_500.0, false),
                ViolationRule::new(SpikeStripEvaded, 75.0, 1_500.0, false),
                ViolationRule::new(HelicopterEvaded, 100.0, 2_000.0, false),
                ViolationRule::new(StreetRacing, 200.0, 2_500.0, false).unwitnessed(),
                ViolationRule::new(Nitrous, 15.0, 250.0, true),
                ViolationRule::new(PoliceVehicleDestroyed, 200.0, 7_500.0, false),
            ],
            sensor_range: 150.0,
            speed_limit: 25.0,
            speeding_heat_per_unit: 0.5,
            notoriety_heat_bonus: 0.5,
            fine_multiplier: [1.0, 1.0, 1.25, 1.5, 2.0, 3.0],
        }
    }
}

// ---------------------------------------------------------------------------
// Heat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct HeatParams {
    /// Accumulator value at which each level starts. Row 0 (`None`) is zero.
    pub thresholds: [f32; LEVEL_TIERS],
    pub max_heat: f32,
    /// Heat removed per second while decay is allowed.
    pub decay_per_second: [f32; LEVEL_TIERS],
    /// Seconds without a violation before decay may start.
    pub decay_grace_secs: f32,
}

impl HeatParams {
    /// Accumulator value at which `level` starts.
    pub fn threshold(&self, level: HeatLevel) -> f32 {
        at(&self.thresholds, level)
    }

    /// Highest accumulation level whose threshold is at or below `heat`.
    pub fn level_for(&self, heat: f32) -> HeatLevel {
        HeatLevel::PURSUIT_LEVELS
            .iter()
            .rev()
            .copied()
            .find(|level| heat >= self.threshold(*level))
            .unwrap_or(HeatLevel::None)
    }
}

impl Default for HeatParams {
    fn default() -> Self {
        Self {
            thresholds: [0.0, 50.0, 150.0, 300.0, 500.0, 750.0],
            max_heat: 1_000.0,
            decay_per_second: [0.0, 4.0, 5.0, 6.0, 8.0, 10.0],
            decay_grace_secs: 3.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Dispatch policy for one heat level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct LevelPolicy {
    /// Units dispatched immediately when the level is reached.
    pub min_units: u32,
    /// Hard cap on active units for the actor at this level.
    pub max_units: u32,
    /// Allowed unit types with their share of the roster.
    pub composition: Vec<(UnitType, f32)>,
    /// Seconds between reinforcement dispatches while below `max_units`.
    pub reinforce_interval_secs: f32,
    pub aggression: f32,
}

impl LevelPolicy {
    pub fn allows(&self, unit_type: UnitType) -> bool {
        self.composition.iter().any(|(t, _)| *t == unit_type)
    }

    fn empty() -> Self {
        Self {
            min_units: 0,
            max_units: 0,
            composition: Vec::new(),
            reinforce_interval_secs: 0.0,
            aggression: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct RosterParams {
    pub policies: [LevelPolicy; LEVEL_TIERS],
    /// Arena slots available across all actors.
    pub pool_capacity: u32,
    pub respawn_delay_secs: f32,
    /// Distance from the target at which freshly allocated units appear.
    pub spawn_distance: f32,
    /// Unit aggression multiplier per point of notoriety.
    pub notoriety_aggression_bonus: f32,
    pub max_helicopters_per_actor: u32,
}

impl RosterParams {
    pub fn policy(&self, level: HeatLevel) -> &LevelPolicy {
        &self.policies[level.tier()]
    }
}

impl Default for RosterParams {
    fn default() -> Self {
        use UnitType::*;
        Self {
            policies: [
                LevelPolicy::empty(),
                LevelPolicy {
                    min_units: 1,
                    max_units: 1,
                    composition: vec![(Patrol, 1.0)],
                    reinforce_interval_secs: 20.0,
                    aggression: 1.0,
                },
                LevelPolicy {
                    min_units: 2,
                    max_units: 3,
                    composition: vec![(Patrol, 2.0), (Interceptor, 1.0)],
                    reinforce_interval_secs: 15.0,
                    aggression: 1.25,
                },
                LevelPolicy {
                    min_units: 4,
                    max_units: 5,
                    composition: vec![
                        (Patrol, 2.0),
                        (Interceptor, 2.0),
                        (Suv, 1.0),
                        (Undercover, 0.5),
                    ],
                    reinforce_interval_secs: 12.0,
                    aggression: 1.5,
                },
                LevelPolicy {
                    min_units: 5,
                    max_units: 7,
                    composition: vec![
                        (Patrol, 1.0),
                        (Interceptor, 2.0),
                        (Suv, 1.5),
                        (Undercover, 0.5),
                        (Roadblock, 1.0),
                        (SpikeStrip, 1.0),
                    ],
                    reinforce_interval_secs: 10.0,
                    aggression: 1.75,
                },
                LevelPolicy {
                    min_units: 6,
                    max_units: 10,
                    composition: vec![
                        (Interceptor, 3.0),
                        (Suv, 2.0),
                        (Heavy, 2.0),
                        (Roadblock, 1.0),
                        (SpikeStrip, 1.0),
                        (Helicopter, 1.0),
                    ],
                    reinforce_interval_secs: 8.0,
                    aggression: 2.0,
                },
            ],
            pool_capacity: 24,
            respawn_delay_secs: 30.0,
            spawn_distance: 120.0,
            notoriety_aggression_bonus: 0.3,
            max_helicopters_per_actor: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct TacticParams {
    /// Units closer than this to the target may form a box.
    pub coordination_range: f32,
    pub boxing_min_units: u32,
    pub boxing_max_units: u32,
    /// Radius of the formation slots placed around the target.
    pub box_slot_radius: f32,
    pub roadblock_min_target_speed: f32,
    /// How far ahead of the target the intercept point is projected.
    pub roadblock_lead_distance: f32,
    /// The target must need at least this long to reach the intercept point.
    pub roadblock_min_lead_secs: f32,
    /// Speed used to decide whether a unit can reach the intercept in time.
    pub unit_travel_speed: f32,
    /// Spike strips sit this far before the roadblock along the target path.
    pub spike_setback: f32,
    pub rolling_min_units: u32,
    pub rolling_distance: f32,
    pub funnel_min_units: u32,
    pub funnel_max_units: u32,
    pub funnel_offset: f32,
    pub funnel_ahead: f32,
}

impl Default for TacticParams {
    fn default() -> Self {
        Self {
            coordination_range: 60.0,
            boxing_min_units: 2,
            boxing_max_units: 4,
            box_slot_radius: 6.0,
            roadblock_min_target_speed: 10.0,
            roadblock_lead_distance: 200.0,
            roadblock_min_lead_secs: 4.0,
            unit_travel_speed: 35.0,
            spike_setback: 40.0,
            rolling_min_units: 4,
            rolling_distance: 30.0,
            funnel_min_units: 4,
            funnel_max_units: 2,
            funnel_offset: 15.0,
            funnel_ahead: 25.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct BehaviorParams {
    /// Seconds without visual before a pursuing unit switches to intercepting.
    pub lost_visual_grace_secs: f32,
    /// Intercept point lead, in seconds of the target's last known velocity.
    pub intercept_lead_secs: f32,
    pub maneuver_range: f32,
    pub disengage_range: f32,
    /// Chance factor for ramming over a PIT: `aggression * ram_bias`.
    pub ram_bias: f32,
    pub maneuver_attempt_interval_secs: f32,
    pub maneuver_cooldown_secs: f32,
    pub maneuver_base_chance: f32,
    pub max_relative_speed: f32,
    pub max_maneuver_failures: u32,
    pub box_radius: f32,
    /// Target speed below which a boxed target counts as stopped.
    pub stop_speed: f32,
    pub box_hold_secs: f32,
    /// Hold time is divided by `1 + level * box_level_bonus`.
    pub box_level_bonus: f32,
    pub boxing_window_secs: f32,
    pub roadblock_radius: f32,
    /// Targets reaching a roadblock faster than this break through.
    pub breach_speed: f32,
    pub roadblock_window_secs: f32,
    pub spike_radius: f32,
    pub rolling_window_secs: f32,
    pub rolling_slow_speed: f32,
    pub funnel_window_secs: f32,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            lost_visual_grace_secs: 3.0,
            intercept_lead_secs: 2.0,
            maneuver_range: 20.0,
            disengage_range: 100.0,
            ram_bias: 0.3,
            maneuver_attempt_interval_secs: 1.0,
            maneuver_cooldown_secs: 2.0,
            maneuver_base_chance: 0.35,
            max_relative_speed: 15.0,
            max_maneuver_failures: 3,
            box_radius: 12.0,
            stop_speed: 2.2,
            box_hold_secs: 3.0,
            box_level_bonus: 0.2,
            boxing_window_secs: 20.0,
            roadblock_radius: 10.0,
            breach_speed: 8.0,
            roadblock_window_secs: 25.0,
            spike_radius: 6.0,
            rolling_window_secs: 15.0,
            rolling_slow_speed: 12.0,
            funnel_window_secs: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Cooldown, bounty, bust, impound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct CooldownParams {
    /// Seconds with no unit holding visual before the session goes cooldown-pending.
    pub lost_visual_secs: f32,
}

impl Default for CooldownParams {
    fn default() -> Self {
        Self {
            lost_visual_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct BountyParams {
    /// Escape bounty by peak heat level.
    pub base_by_level: [f64; LEVEL_TIERS],
    pub duration_bonus_per_minute: f64,
    pub unit_disabled_bonus: f64,
    pub roadblock_bonus: f64,
    pub helicopter_bonus: f64,
    pub escape_notoriety_per_level: f32,
    /// Live bounty accrued per second at `Level1`.
    pub bounty_per_second: f64,
    /// Live bounty growth factor per heat level.
    pub level_growth: f64,
}

impl Default for BountyParams {
    fn default() -> Self {
        Self {
            base_by_level: [0.0, 250.0, 500.0, 1_500.0, 3_500.0, 7_500.0],
            duration_bonus_per_minute: 0.25,
            unit_disabled_bonus: 500.0,
            roadblock_bonus: 250.0,
            helicopter_bonus: 2_500.0,
            escape_notoriety_per_level: 0.05,
            bounty_per_second: 10.0,
            level_growth: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct BustParams {
    pub base_fine: f64,
    /// Share of the vehicle's value added to the fine, by level.
    pub vehicle_fine_pct: [f64; LEVEL_TIERS],
    pub level_multiplier: [f64; LEVEL_TIERS],
    /// Extra fine and reputation loss per logged violation.
    pub per_violation_bonus: f64,
    pub reputation_loss: [f64; LEVEL_TIERS],
    pub notoriety_increment: f32,
    /// Value used for actors whose vehicle was never reported.
    pub default_vehicle_value: f64,
}

impl Default for BustParams {
    fn default() -> Self {
        Self {
            base_fine: 5_000.0,
            vehicle_fine_pct: [0.0, 0.05, 0.075, 0.10, 0.125, 0.15],
            level_multiplier: [1.0, 1.0, 1.5, 2.0, 3.0, 5.0],
            per_violation_bonus: 0.02,
            reputation_loss: [0.0, 200.0, 350.0, 500.0, 750.0, 1_000.0],
            notoriety_increment: 0.1,
            default_vehicle_value: 25_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct ImpoundParams {
    pub base_fee: f64,
    pub value_pct: f64,
    pub daily_storage_fee: f64,
    pub days_until_auction: u32,
}

impl Default for ImpoundParams {
    fn default() -> Self {
        Self {
            base_fee: 1_000.0,
            value_pct: 0.05,
            daily_storage_fee: 500.0,
            days_until_auction: 7,
        }
    }
}
