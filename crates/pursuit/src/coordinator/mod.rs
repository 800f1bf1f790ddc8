//! Pursuit Coordinator: assigns a tactic to every active unit of each pursued
//! actor and keeps multi-step plans (boxing, roadblocks, spike strips,
//! rolling roadblocks, funneling) locked until they resolve.

mod board;
mod planning;
mod systems;


pub use board::{ActorPlans, BoxPlan, PointPlan, TacticBoard, TimedPlan};
pub use planning::{plan_tactics, prune_plans, PlanResult, TargetView, UnitView};
pub use systems::{coordinate_pursuits, CoordinatorPlugin};
