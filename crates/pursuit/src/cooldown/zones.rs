use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::params::{positive, ParamsError};
use crate::types::{ActorId, HeatLevel};

/// A hiding spot where heat decays faster while no unit can see the actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownZone {
    pub id: u32,
    pub name: String,
    pub location: Vec2,
    pub radius: f32,
    /// Decay rate multiplier while occupied and unseen.
    pub cooldown_multiplier: f32,
    /// Highest heat level the zone still works at.
    pub max_effective_level: HeatLevel,
    #[serde(default = "unlocked_by_default")]
    pub unlocked: bool,
    #[serde(default)]
    pub use_cost: f64,
    #[serde(default)]
    pub times_used: u32,
}

fn unlocked_by_default() -> bool {
    true
}

impl CooldownZone {
    pub fn new(id: u32, name: impl Into<String>, location: Vec2, radius: f32) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            radius,
            cooldown_multiplier: 2.0,
            max_effective_level: HeatLevel::Level3,
            unlocked: true,
            use_cost: 0.0,
            times_used: 0,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.cooldown_multiplier = multiplier;
        self
    }

    pub fn with_max_level(mut self, level: HeatLevel) -> Self {
        self.max_effective_level = level;
        self
    }

    pub fn locked(mut self) -> Self {
        self.unlocked = false;
        self
    }

    pub fn contains(&self, position: Vec2) -> bool {
        self.location.distance_squared(position) <= self.radius * self.radius
    }

    /// Whether the zone still helps at `level`.
    pub fn effective_at(&self, level: HeatLevel) -> bool {
        level.is_pursuit() && level <= self.max_effective_level
    }

    fn validate(&self) -> Result<(), ParamsError> {
        positive(self.radius, "cooldown zone radius")?;
        positive(self.cooldown_multiplier, "cooldown zone multiplier")
    }
}

/// Zone layout plus which zone each pursued actor is sitting in.
#[derive(Resource, Debug, Clone, Default)]
pub struct CooldownZones {
    zones: Vec<CooldownZone>,
    occupancy: BTreeMap<ActorId, u32>,
}

impl CooldownZones {
    /// Parse a JSON array of zones.
    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let zones: Vec<CooldownZone> = serde_json::from_str(json)?;
        let mut out = Self::default();
        for zone in zones {
            zone.validate()?;
            out.register(zone);
        }
        Ok(out)
    }

    /// Add a zone, replacing one with the same id.
    pub fn register(&mut self, zone: CooldownZone) {
        match self.zones.iter_mut().find(|z| z.id == zone.id) {
            Some(existing) => *existing = zone,
            None => self.zones.push(zone),
        }
    }

    pub fn unlock(&mut self, id: u32) -> bool {
        match self.zones.iter_mut().find(|z| z.id == id) {
            Some(zone) => {
                zone.unlocked = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u32) -> Option<&CooldownZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zones(&self) -> &[CooldownZone] {
        &self.zones
    }

    /// First unlocked zone containing `position`.
    pub fn zone_at(&self, position: Vec2) -> Option<&CooldownZone> {
        self.zones
            .iter()
            .find(|z| z.unlocked && z.contains(position))
    }

    pub fn occupied_zone(&self, actor: ActorId) -> Option<&CooldownZone> {
        self.occupancy.get(&actor).and_then(|id| self.get(*id))
    }

    /// Move `actor` to `position`. Returns the zone left and the zone
    /// entered, if either changed. Entering counts as a use of the zone.
    pub fn update_occupancy(&mut self, actor: ActorId, position: Vec2) -> (Option<u32>, Option<u32>) {
        let current = self.occupancy.get(&actor).copied();
        let now = self.zone_at(position).map(|z| z.id);
        if current == now {
            return (None, None);
        }
        match now {
            Some(id) => {
                self.occupancy.insert(actor, id);
                if let Some(zone) = self.zones.iter_mut().find(|z| z.id == id) {
                    zone.times_used += 1;
                }
            }
            None => {
                self.occupancy.remove(&actor);
            }
        }
        (current, now)
    }

    /// Decay multiplier for `actor` at `level`, if it sits in a zone that
    /// still works at that level.
    pub fn decay_multiplier(&self, actor: ActorId, level: HeatLevel) -> Option<f32> {
        self.occupied_zone(actor)
            .filter(|z| z.effective_at(level))
            .map(|z| z.cooldown_multiplier)
    }

    pub fn clear_occupancy(&mut self, actor: ActorId) {
        self.occupancy.remove(&actor);
    }
}
