//! Bust Resolver: validates capture attempts, computes fines and impound
//! terms, and keeps the impound lot through retrieval and auction.

mod consequences;
mod impound;
mod systems;

#[cfg(test)]
mod tests;

pub use consequences::{capture_allowed, compute_consequences, BustConsequences, CaptureRejection};
pub use impound::{ImpoundLot, ImpoundedVehicle};
pub use systems::{process_impound, resolve_captures, BustEvents, BustPlugin};
