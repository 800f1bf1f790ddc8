//! Headless pursuit driver.
//!
//! Wires `MinimalPlugins`, `LogPlugin` and `PursuitPlugin`, then plays every
//! collaborator of the engine (gameplay, physics, world sensors) for one
//! scripted getaway and logs how it ended.
//!
//! Environment:
//! - `PURSUIT_LOG`: log filter, defaults to `pursuit=debug,info`
//! - `PURSUIT_PARAMS`: path to a JSON tuning file
//! - `PURSUIT_SEED`: RNG seed

mod script;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use pursuit::params::PursuitParams;
use pursuit::sim_rng::SimRng;
use pursuit::PursuitPlugin;

const DEFAULT_LOG_FILTER: &str = "pursuit=debug,info";

fn main() {
    let filter =
        std::env::var("PURSUIT_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin {
            filter,
            ..default()
        })
        .add_plugins(PursuitPlugin);

    if let Some(params) = load_params() {
        app.insert_resource(params);
    }
    if let Some(seed) = load_seed() {
        app.insert_resource(SimRng::from_seed_u64(seed));
    }

    // Finish plugin setup before the script starts sending events.
    app.update();
    script::run_getaway(&mut app);
}

fn load_params() -> Option<PursuitParams> {
    let path = std::env::var("PURSUIT_PARAMS").ok()?;
    match std::fs::read_to_string(&path) {
        Ok(json) => {
            info!("Driver: tuning loaded from {path}");
            Some(PursuitParams::load_or_default(&json))
        }
        Err(e) => {
            warn!("Driver: cannot read {path}: {e}; using default parameters");
            None
        }
    }
}

fn load_seed() -> Option<u64> {
    let raw = std::env::var("PURSUIT_SEED").ok()?;
    match raw.parse() {
        Ok(seed) => Some(seed),
        Err(e) => {
            warn!("Driver: PURSUIT_SEED '{raw}' is not a number ({e}), using the default seed");
            None
        }
    }
}
