//! Pure dispatch and release policy helpers.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::params::LevelPolicy;
use crate::types::{UnitId, UnitType};

/// Unit types to try for the next dispatch, most wanted first.
///
/// Each allowed type's wanted share is its weight over the total, applied to
/// the roster size after this dispatch; the type with the largest shortfall
/// comes first, ties broken by composition order. Helicopters past the
/// per-actor cap are skipped.
pub fn dispatch_preference(
    policy: &LevelPolicy,
    current: &[UnitType],
    max_helicopters: u32,
) -> Vec<UnitType> {
    let total_weight: f32 = policy
        .composition
        .iter()
        .map(|(_, w)| w.max(0.0))
        .sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    let helicopters = current.iter().filter(|t| **t == UnitType::Helicopter).count() as u32;
    let next_size = current.len() as f32 + 1.0;

    let mut wanted: Vec<(usize, UnitType, f32)> = policy
        .composition
        .iter()
        .enumerate()
        .filter(|(_, (_, weight))| *weight > 0.0)
        .filter(|(_, (unit_type, _))| {
            *unit_type != UnitType::Helicopter || helicopters < max_helicopters
        })
        .map(|(order, (unit_type, weight))| {
            let have = current.iter().filter(|t| *t == unit_type).count() as f32;
            (order, *unit_type, weight / total_weight * next_size - have)
        })
        .collect();

    wanted.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));
    wanted.into_iter().map(|(_, unit_type, _)| unit_type).collect()
}

/// What the release policy needs to know about an active unit.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseCandidate {
    pub id: UnitId,
    /// Mid multi-step tactic.
    pub committed: bool,
    /// Type still allowed at the new level.
    pub allowed: bool,
    pub distance: f32,
    pub time_in_pursuit: f32,
}

/// Order in which units are released when the roster shrinks, first out first.
///
/// Uncommitted units go before committed ones, disallowed types before allowed
/// ones, then farthest from the target, then least time invested.
pub fn release_order(mut candidates: Vec<ReleaseCandidate>) -> Vec<UnitId> {
    candidates.sort_by(|a, b| {
        a.committed
            .cmp(&b.committed)
            .then(a.allowed.cmp(&b.allowed))
            .then(b.distance.total_cmp(&a.distance))
            .then(a.time_in_pursuit.total_cmp(&b.time_in_pursuit))
            .then(a.id.cmp(&b.id))
    });
    candidates.into_iter().map(|c| c.id).collect()
}

/// A point on a circle of `distance` around `center`, at a random bearing.
pub fn spawn_position(center: Vec2, distance: f32, rng: &mut impl Rng) -> Vec2 {
    let bearing = rng.gen_range(0.0..TAU);
    center + Vec2::from_angle(bearing) * distance
}
