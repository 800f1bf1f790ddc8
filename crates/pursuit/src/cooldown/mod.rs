//! Cooldown & Evasion: zone occupancy, the `InProgress` / `CooldownPending`
//! oscillation of a session, and escape resolution with its bounty.

mod bounty;
mod systems;
mod zones;


pub use bounty::{escape_bounty, escape_notoriety};
pub use systems::{resolve_escapes, update_cooldown_status, update_zone_occupancy, CooldownPlugin};
pub use zones::{CooldownZone, CooldownZones};
