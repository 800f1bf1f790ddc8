use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod actors;
pub mod behavior;
pub mod bust;
pub mod clock;
pub mod cooldown;
pub mod coordinator;
pub mod criminal_record;
pub mod events;
pub mod heat;
pub mod params;
pub mod roster;
pub mod sessions;
pub mod sim_rng;
pub mod simulation_sets;
pub mod types;
pub mod violation_ledger;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

use simulation_sets::PursuitSet;

// ---------------------------------------------------------------------------
// Persistence: criminal records, impound lot, tuning and RNG state
// ---------------------------------------------------------------------------

/// A pursuit resource that outlives a single chase and is carried in the
/// host's save file under its own key.
///
/// The engine hands out bytes and takes them back; where they are stored is
/// up to the host.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Key in the save map. Changing it orphans existing saves.
    const SAVE_KEY: &'static str;

    /// `None` leaves the key out of the save, e.g. an empty impound lot.
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Rebuild from saved bytes. Corrupt input yields the default value.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Bitcode-decode a saved pursuit resource. A decode error is logged and the
/// resource starts from its default.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    bitcode::decode(bytes).unwrap_or_else(|e| {
        warn!(
            "Saveable {}: {} bytes unreadable, starting from default: {}",
            key,
            bytes.len(),
            e
        );
        T::default()
    })
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// How to snapshot, restore and clear one persistent pursuit resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

/// Persistent pursuit resources, registered by the plugin that owns each one.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Add `T` under its `SAVE_KEY`. Two plugins claiming one key is a
    /// wiring bug: the second is dropped with a warning.
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!("SaveableRegistry: '{}' registered twice, keeping the first", key);
            debug_assert!(false, "SaveableRegistry: duplicate key '{}'", key);
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| world.get_resource::<T>()?.save_to_bytes()),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                world.insert_resource(T::load_from_bytes(bytes));
            }),
            reset_fn: Box::new(|world: &mut World| {
                world.insert_resource(T::default());
            }),
        });
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .iter()
            .filter_map(|entry| Some((entry.key.clone(), (entry.save_fn)(world)?)))
            .collect()
    }

    /// Restore every resource with a key in `saved`; the rest are untouched.
    pub fn load_all(&self, world: &mut World, saved: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = saved.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }

    /// Put every registered resource back to its default.
    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

/// Snapshot records, impound lot, tuning and RNG for the host's save file.
pub fn save_pursuit_state(world: &World) -> BTreeMap<String, Vec<u8>> {
    world
        .get_resource::<SaveableRegistry>()
        .map(|registry| registry.save_all(world))
        .unwrap_or_default()
}

/// Restore a snapshot taken with [`save_pursuit_state`].
pub fn load_pursuit_state(world: &mut World, saved: &BTreeMap<String, Vec<u8>>) {
    if !world.contains_resource::<SaveableRegistry>() {
        warn!("Saveable: no registry, nothing loaded");
        return;
    }
    world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
        registry.load_all(world, saved);
    });
}

/// Start a new game: persistent resources go back to their defaults, and
/// every open pursuit is dropped without an outcome, its units back on
/// patrol. The unit pool, cooldown zones and actor positions are kept.
pub fn reset_pursuit_state(world: &mut World) {
    let pursued = world
        .get_resource::<sessions::PursuitSessions>()
        .map(sessions::PursuitSessions::active_actors)
        .unwrap_or_default();
    if let Some(mut zones) = world.get_resource_mut::<cooldown::CooldownZones>() {
        for actor in &pursued {
            zones.clear_occupancy(*actor);
        }
    }
    if world.contains_resource::<SaveableRegistry>() {
        world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.reset_all(world);
        });
    }
    world.insert_resource(heat::HeatController::default());
    world.insert_resource(sessions::PursuitSessions::default());
    world.insert_resource(violation_ledger::ViolationLedger::default());
    world.insert_resource(coordinator::TacticBoard::default());
    if let Some(mut roster) = world.get_resource_mut::<roster::UnitRoster>() {
        for actor in roster.pursued_actors() {
            roster.release_all(actor);
        }
    }
    info!("Saveable: pursuit state reset");
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// The whole pursuit engine. Systems run in `FixedUpdate`, ordered by
/// [`PursuitSet`].
pub struct PursuitPlugin;

impl Plugin for PursuitPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SaveableRegistry>().configure_sets(
            FixedUpdate,
            (
                PursuitSet::Input,
                PursuitSet::Ledger,
                PursuitSet::Heat,
                PursuitSet::Roster,
                PursuitSet::Coordinate,
                PursuitSet::Behavior,
                PursuitSet::Resolve,
                PursuitSet::Report,
            )
                .chain(),
        );

        // Configuration, time and shared state
        app.add_plugins((
            params::PursuitParamsPlugin,
            events::PursuitEventsPlugin,
            clock::ClockPlugin,
            sim_rng::SimRngPlugin,
            criminal_record::CriminalRecordPlugin,
            sessions::SessionsPlugin,
            actors::ActorsPlugin,
        ));

        // Pursuit pipeline
        app.add_plugins((
            violation_ledger::ViolationLedgerPlugin,
            heat::HeatPlugin,
            roster::RosterPlugin,
            coordinator::CoordinatorPlugin,
            behavior::BehaviorPlugin,
            bust::BustPlugin,
            cooldown::CooldownPlugin,
        ));
    }
}
