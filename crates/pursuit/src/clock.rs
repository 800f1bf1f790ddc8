use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::params::PursuitParams;
use crate::simulation_sets::PursuitSet;

/// Simulated time seen by every pursuit timer.
///
/// Advanced by a fixed `tick_seconds` per `FixedUpdate` run instead of reading
/// Bevy's `Time`, so headless drivers and tests step it deterministically.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    pub tick: u64,
    pub elapsed_secs: f64,
    /// Seconds covered by the current tick.
    pub dt: f32,
    /// In-game day, used for impound storage and auctions.
    pub day: u32,
}

impl SimClock {
    pub fn advance(&mut self, dt: f32, day_length_secs: f32) {
        self.tick += 1;
        self.dt = dt;
        self.elapsed_secs += dt as f64;
        self.day = (self.elapsed_secs / day_length_secs.max(f32::EPSILON) as f64) as u32;
    }
}

pub fn advance_clock(params: Res<PursuitParams>, mut clock: ResMut<SimClock>) {
    clock.advance(params.tick_seconds, params.day_length_secs);
}

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>().add_systems(
            FixedUpdate,
            advance_clock.in_set(PursuitSet::Input),
        );
    }
}
