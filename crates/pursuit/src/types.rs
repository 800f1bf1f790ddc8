//! Identifiers and small enums shared by every pursuit subsystem.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A pursued actor (normally the player).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct ActorId(pub u32);

/// Stable arena index of a police unit inside the `UnitRoster`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A vehicle owned by a pursued actor; the impound lot is keyed by it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct VehicleId(pub u32);

/// Monotonic id handed to each pursuit session when it starts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct SessionId(pub u64);

// ---------------------------------------------------------------------------
// HeatLevel
// ---------------------------------------------------------------------------

/// Ordinal law-enforcement attention on an actor.
///
/// `None < Level1 < ... < Level5 < Busted`. Per-level tuning tables are
/// indexed with [`HeatLevel::tier`], where `Busted` shares the `Level5` row.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub enum HeatLevel {
    #[default]
    None,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
    Busted,
}

/// Number of rows in a per-level tuning table (`None` through `Level5`).
pub const LEVEL_TIERS: usize = 6;

impl HeatLevel {
    /// The five levels at which a pursuit is active.
    pub const PURSUIT_LEVELS: [HeatLevel; 5] = [
        HeatLevel::Level1,
        HeatLevel::Level2,
        HeatLevel::Level3,
        HeatLevel::Level4,
        HeatLevel::Level5,
    ];

    /// Row index into a `[T; LEVEL_TIERS]` table.
    pub fn tier(self) -> usize {
        match self {
            HeatLevel::None => 0,
            HeatLevel::Level1 => 1,
            HeatLevel::Level2 => 2,
            HeatLevel::Level3 => 3,
            HeatLevel::Level4 => 4,
            HeatLevel::Level5 | HeatLevel::Busted => 5,
        }
    }

    pub fn from_tier(tier: usize) -> Option<HeatLevel> {
        match tier {
            0 => Some(HeatLevel::None),
            1 => Some(HeatLevel::Level1),
            2 => Some(HeatLevel::Level2),
            3 => Some(HeatLevel::Level3),
            4 => Some(HeatLevel::Level4),
            5 => Some(HeatLevel::Level5),
            _ => None,
        }
    }

    /// Next level reachable by accumulation. `Level5` and `Busted` have none.
    pub fn next(self) -> Option<HeatLevel> {
        match self {
            HeatLevel::Level5 | HeatLevel::Busted => None,
            other => HeatLevel::from_tier(other.tier() + 1),
        }
    }

    /// Next level down reachable by decay.
    pub fn prev(self) -> Option<HeatLevel> {
        match self {
            HeatLevel::None | HeatLevel::Busted => None,
            other => HeatLevel::from_tier(other.tier() - 1),
        }
    }

    /// True for `Level1..=Level5`.
    pub fn is_pursuit(self) -> bool {
        !matches!(self, HeatLevel::None | HeatLevel::Busted)
    }

    /// Wanted stars shown by the HUD collaborator.
    pub fn stars(self) -> u8 {
        match self {
            HeatLevel::None => 0,
            HeatLevel::Busted => 5,
            other => other.tier() as u8,
        }
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum ViolationKind {
    Speeding,
    Reckless,
    RunRedLight,
    WrongWay,
    PropertyDamage,
    HitCivilian,
    HitPolice,
    EvadePursuit,
    NearMissPolice,
    SpeedTrap,
    RoadblockBreach,
    SpikeStripEvaded,
    HelicopterEvaded,
    StreetRacing,
    Nitrous,
    PoliceVehicleDestroyed,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 16] = [
        ViolationKind::Speeding,
        ViolationKind::Reckless,
        ViolationKind::RunRedLight,
        ViolationKind::WrongWay,
        ViolationKind::PropertyDamage,
        ViolationKind::HitCivilian,
        ViolationKind::HitPolice,
        ViolationKind::EvadePursuit,
        ViolationKind::NearMissPolice,
        ViolationKind::SpeedTrap,
        ViolationKind::RoadblockBreach,
        ViolationKind::SpikeStripEvaded,
        ViolationKind::HelicopterEvaded,
        ViolationKind::StreetRacing,
        ViolationKind::Nitrous,
        ViolationKind::PoliceVehicleDestroyed,
    ];

    /// Wire code used by gameplay systems when reporting an infraction.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<ViolationKind> {
        Self::ALL.get(code as usize).copied()
    }

    /// Kinds whose heat grows with the reported speed.
    pub fn scales_with_speed(self) -> bool {
        matches!(self, ViolationKind::Speeding | ViolationKind::SpeedTrap)
    }
}

// ---------------------------------------------------------------------------
// Units and tactics
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum UnitType {
    Patrol,
    Interceptor,
    Suv,
    Undercover,
    Helicopter,
    Roadblock,
    SpikeStrip,
    Heavy,
}

impl UnitType {
    pub fn is_ground(self) -> bool {
        self != UnitType::Helicopter
    }
}

/// A coordinated behavior assigned by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tactic {
    StandardPursuit,
    Boxing,
    RoadblockAhead,
    SpikeStripTrap,
    AerialSupport,
    RollingRoadblock,
    Funneling,
}

impl Tactic {
    /// Tactics that run over several ticks and lock their units until resolved.
    pub fn is_multi_step(self) -> bool {
        matches!(
            self,
            Tactic::Boxing
                | Tactic::RoadblockAhead
                | Tactic::SpikeStripTrap
                | Tactic::RollingRoadblock
                | Tactic::Funneling
        )
    }

    /// Behavior state a unit enters once it engages with this tactic.
    pub fn engaged_state(self) -> BehaviorState {
        match self {
            Tactic::StandardPursuit | Tactic::AerialSupport => BehaviorState::Pursuing,
            Tactic::Boxing => BehaviorState::Boxing,
            Tactic::RoadblockAhead | Tactic::SpikeStripTrap | Tactic::RollingRoadblock => {
                BehaviorState::SettingRoadblock
            }
            Tactic::Funneling => BehaviorState::Intercepting,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    #[default]
    Patrolling,
    Alerted,
    Pursuing,
    Ramming,
    Boxing,
    PITManeuver,
    SettingRoadblock,
    Intercepting,
    Disabled,
}

impl BehaviorState {
    /// States a unit can only be in while attached to a pursuit.
    pub fn is_engaged(self) -> bool {
        !matches!(self, BehaviorState::Patrolling | BehaviorState::Disabled)
    }

    pub fn is_maneuver(self) -> bool {
        matches!(self, BehaviorState::Ramming | BehaviorState::PITManeuver)
    }
}

// ---------------------------------------------------------------------------
// Outcomes and capture triggers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuitOutcome {
    #[default]
    InProgress,
    CooldownPending,
    Escaped,
    Busted,
    Cancelled,
}

impl PursuitOutcome {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PursuitOutcome::Escaped | PursuitOutcome::Busted | PursuitOutcome::Cancelled
        )
    }
}

/// What produced a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptureTrigger {
    BoxingHold,
    PitManeuver,
    RoadblockHeld,
    Ramming,
    SpikeStrip,
}

impl CaptureTrigger {
    /// Only these may end a pursuit in a bust.
    pub fn is_capture_class(self) -> bool {
        matches!(
            self,
            CaptureTrigger::BoxingHold | CaptureTrigger::PitManeuver | CaptureTrigger::RoadblockHeld
        )
    }
}

/// Why a target lost control, reported to the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerturbationCause {
    Ram,
    Pit,
    SpikeStrip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_level_order() {
        assert!(HeatLevel::None < HeatLevel::Level1);
        assert!(HeatLevel::Level5 < HeatLevel::Busted);
        assert_eq!(HeatLevel::Level2.next(), Some(HeatLevel::Level3));
        assert_eq!(HeatLevel::Level5.next(), None);
        assert_eq!(HeatLevel::Level1.prev(), Some(HeatLevel::None));
        assert_eq!(HeatLevel::None.prev(), None);
        assert_eq!(HeatLevel::Busted.tier(), HeatLevel::Level5.tier());
    }

    #[test]
    fn test_violation_codes_roundtrip() {
        for kind in ViolationKind::ALL {
            assert_eq!(ViolationKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ViolationKind::from_code(200), None);
    }

    #[test]
    fn test_capture_class() {
        assert!(CaptureTrigger::BoxingHold.is_capture_class());
        assert!(CaptureTrigger::RoadblockHeld.is_capture_class());
        assert!(!CaptureTrigger::Ramming.is_capture_class());
        assert!(!CaptureTrigger::SpikeStrip.is_capture_class());
    }

    #[test]
    fn test_multi_step_tactics() {
        assert!(Tactic::Boxing.is_multi_step());
        assert!(!Tactic::StandardPursuit.is_multi_step());
        assert!(!Tactic::AerialSupport.is_multi_step());
        assert_eq!(
            Tactic::SpikeStripTrap.engaged_state(),
            BehaviorState::SettingRoadblock
        );
    }
}
