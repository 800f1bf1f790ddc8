//! Deterministic pursuit ordering via `SystemSet` phases.
//!
//! These sets are the **contract** for execution order inside `FixedUpdate`.
//! Every pursuit system belongs to exactly one of them, and the sets are
//! chained, so a component always sees the output of the components before
//! it within the same tick.
//!
//! ```text
//! Input → Ledger → Heat → Roster → Coordinate → Behavior → Resolve → Report
//! ```
//!
//! * **Input** – Clock advance and ingestion of collaborator feeds (actor
//!   transforms, unit sensors, damage, vehicle assignments).
//! * **Ledger** – Violation reports become immutable records with heat and fines.
//! * **Heat** – Heat deltas, zone occupancy and decay; emits level changes.
//! * **Roster** – Resizes each actor's active units to the new level, then
//!   reinforcement and understaffed retries.
//! * **Coordinate** – Tactic assignment and arbitration.
//! * **Behavior** – Per-unit state machines and formation checks.
//! * **Resolve** – Cancellation, bust, cooldown and escape handling.
//! * **Report** – Session statistics, impound day rollover.

use bevy::prelude::*;

/// Ordered phases for the pursuit systems in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PursuitSet {
    Input,
    Ledger,
    Heat,
    Roster,
    Coordinate,
    Behavior,
    Resolve,
    Report,
}
