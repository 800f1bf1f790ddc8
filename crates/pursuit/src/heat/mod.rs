//! Heat Controller: per-actor heat accumulator and the `HeatLevel` state
//! machine that every other pursuit component reacts to.

mod controller;
mod systems;

#[cfg(test)]
mod tests;

pub use controller::{HeatController, HeatState, HeatTransition};
pub use systems::{apply_violation_heat, decay_heat, HeatPlugin};
