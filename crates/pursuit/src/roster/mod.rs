//! Unit Roster: the pool of police units and each pursued actor's active set.
//!
//! Split into sub-modules:
//! - `unit`: the `PoliceUnit` record
//! - `dispatch`: pure type-preference and release-order policy
//! - `pool`: the `UnitRoster` arena and its resize/dispatch/release operations
//! - `systems`: sensor/damage ingestion, resize on level change, reinforcement

mod dispatch;
mod pool;
mod systems;
mod unit;

#[cfg(test)]
mod tests;

pub use dispatch::{dispatch_preference, release_order, spawn_position, ReleaseCandidate};
pub use pool::{DispatchContext, RosterChange, UnitRoster};
pub use systems::*;
pub use unit::{ManeuverProgress, PoliceUnit};
