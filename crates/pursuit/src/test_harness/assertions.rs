//! Assertion helpers for `TestPursuit` integration tests.

use crate::roster::PoliceUnit;
use crate::types::{ActorId, BehaviorState, HeatLevel, PursuitOutcome};

use super::TestPursuit;

impl TestPursuit {
    pub fn assert_level(&self, actor: ActorId, expected: HeatLevel) {
        let level = self.level(actor);
        assert_eq!(
            level, expected,
            "expected {actor:?} at {expected:?}, got {level:?} (heat {:.1})",
            self.heat(actor)
        );
    }

    /// The actor never has more active units than its level allows.
    pub fn assert_within_unit_cap(&self, actor: ActorId) {
        let level = self.level(actor);
        let max = self.params().roster.policy(level).max_units as usize;
        let count = self.active_units(actor).len();
        assert!(
            count <= max,
            "{actor:?} at {level:?} has {count} units, cap is {max}"
        );
    }

    pub fn assert_active_units(&self, actor: ActorId, expected: usize) {
        let count = self.active_units(actor).len();
        assert_eq!(count, expected, "expected {expected} units on {actor:?}, got {count}");
    }

    pub fn assert_session_outcome(&self, actor: ActorId, expected: PursuitOutcome) {
        let outcome = self.session(actor).map(|s| s.outcome);
        assert_eq!(
            outcome,
            Some(expected),
            "expected an open {expected:?} session for {actor:?}"
        );
    }

    pub fn assert_no_session(&self, actor: ActorId) {
        assert!(
            self.session(actor).is_none(),
            "expected no open session for {actor:?}, found {:?}",
            self.session(actor).map(|s| s.outcome)
        );
    }

    /// Every unit not attached to an actor is a fresh, undamaged patrol or
    /// waiting to respawn.
    pub fn assert_pool_clean(&self) {
        for unit in self.roster().units().filter(|u| u.target.is_none()) {
            if unit.state == BehaviorState::Disabled {
                continue;
            }
            assert_eq!(unit.state, BehaviorState::Patrolling, "{:?}", unit.id);
            assert_eq!(unit.tactic, None, "{:?} kept a tactic", unit.id);
            assert_eq!(unit.health, PoliceUnit::MAX_HEALTH, "{:?} kept damage", unit.id);
            assert!(!unit.has_visual, "{:?} kept visual contact", unit.id);
            assert_eq!(unit.time_in_pursuit, 0.0, "{:?} kept pursuit time", unit.id);
        }
    }
}
