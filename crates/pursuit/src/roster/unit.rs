use bevy::prelude::*;

use crate::types::{ActorId, BehaviorState, Tactic, UnitId, UnitType};

/// Ram/PIT bookkeeping for a unit currently attempting a maneuver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManeuverProgress {
    pub attempt_timer: f32,
    pub failures: u32,
    /// Seconds before another maneuver may be chosen.
    pub cooldown: f32,
}

/// A police unit. Owned by the `UnitRoster`; everything else refers to it by id.
#[derive(Debug, Clone, PartialEq)]
pub struct PoliceUnit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub state: BehaviorState,
    pub tactic: Option<Tactic>,
    /// Actor this unit is attached to; `None` while pooled.
    pub target: Option<ActorId>,
    pub health: f32,
    pub aggression: f32,
    pub time_in_pursuit: f32,
    pub last_known_target: Option<Vec2>,
    pub last_known_velocity: Vec2,
    pub has_visual: bool,
    pub no_visual_secs: f32,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Where the driving collaborator should steer this unit.
    pub destination: Option<Vec2>,
    /// Where the unit reappears after being disabled.
    pub home: Vec2,
    pub maneuver: ManeuverProgress,
    /// Seconds until a disabled unit returns to the pool.
    pub respawn_in: Option<f32>,
}

impl PoliceUnit {
    pub const MAX_HEALTH: f32 = 100.0;

    pub fn new(id: UnitId, unit_type: UnitType, home: Vec2) -> Self {
        Self {
            id,
            unit_type,
            state: BehaviorState::Patrolling,
            tactic: None,
            target: None,
            health: Self::MAX_HEALTH,
            aggression: 1.0,
            time_in_pursuit: 0.0,
            last_known_target: None,
            last_known_velocity: Vec2::ZERO,
            has_visual: false,
            no_visual_secs: 0.0,
            position: home,
            velocity: Vec2::ZERO,
            destination: None,
            home,
            maneuver: ManeuverProgress::default(),
            respawn_in: None,
        }
    }

    /// Clear every pursuit-specific field, leaving a fresh patrol at `position`.
    pub fn reset_to_patrol(&mut self, position: Vec2) {
        *self = Self {
            position,
            ..Self::new(self.id, self.unit_type, self.home)
        };
    }

    pub fn is_disabled(&self) -> bool {
        self.state == BehaviorState::Disabled
    }

    /// Pooled and ready to be dispatched.
    pub fn is_available(&self) -> bool {
        self.state == BehaviorState::Patrolling && self.target.is_none()
    }

    /// Apply collision damage; true once health reaches zero.
    pub fn apply_damage(&mut self, damage: f32) -> bool {
        self.health = (self.health - damage.max(0.0)).clamp(0.0, Self::MAX_HEALTH);
        self.health <= 0.0
    }
}
