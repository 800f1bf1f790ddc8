//! Unit Behavior: the per-unit state machine, ram/PIT maneuvers, and the
//! formation checks that resolve multi-step tactics.

mod formations;
mod fsm;
mod maneuvers;
mod systems;

#[cfg(test)]
mod tests;

pub use formations::{evaluate_formations, required_hold_secs, FormationEvent};
pub use fsm::{step_unit, StepContext, StepSignal};
pub use maneuvers::{choose_maneuver, maneuver_success_chance};
pub use systems::{evaluate_pursuit_formations, update_unit_behavior, BehaviorEvents, BehaviorPlugin};
