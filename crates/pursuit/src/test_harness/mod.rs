//! # TestPursuit: headless harness for pursuit integration tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `PursuitPlugin`. Builder
//! methods set up the world, input helpers play the collaborators (gameplay,
//! physics, world sensors), and `tick()` runs the `FixedUpdate` schedule
//! directly.
//!
//! Events are never rotated after construction, so `events::<E>()` returns
//! every event of that type sent since the harness was built.

mod assertions;
mod queries;
mod setup;

use bevy::app::App;
use bevy::prelude::*;

use crate::PursuitPlugin;

pub struct TestPursuit {
    app: App,
}

impl TestPursuit {
    /// An empty world: default parameters, no police units in the pool, no
    /// cooldown zones.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(PursuitPlugin);
        // Let plugin finish hooks and the first event rotation run before
        // any test input arrives.
        app.update();
        Self { app }
    }

    pub fn app(&mut self) -> &mut App {
        &mut self.app
    }
}

impl Default for TestPursuit {
    fn default() -> Self {
        Self::new()
    }
}
