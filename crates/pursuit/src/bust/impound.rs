use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::types::{ActorId, VehicleId};
use crate::Saveable;

use super::consequences::BustConsequences;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ImpoundedVehicle {
    pub vehicle: VehicleId,
    pub owner: ActorId,
    pub impounded_day: u32,
    pub retrieval_cost: f64,
    pub daily_storage_fee: f64,
    pub days_until_auction: u32,
}

impl ImpoundedVehicle {
    pub fn from_bust(owner: ActorId, day: u32, consequences: &BustConsequences) -> Self {
        Self {
            vehicle: consequences.vehicle,
            owner,
            impounded_day: day,
            retrieval_cost: consequences.retrieval_cost,
            daily_storage_fee: consequences.daily_storage_fee,
            days_until_auction: consequences.days_until_auction,
        }
    }

    pub fn days_stored(&self, day: u32) -> u32 {
        day.saturating_sub(self.impounded_day)
    }

    /// Cost to get the vehicle back on `day`. Storage is charged for at
    /// least one day.
    pub fn cost_on(&self, day: u32) -> f64 {
        self.retrieval_cost + self.daily_storage_fee * self.days_stored(day).max(1) as f64
    }

    pub fn is_due_for_auction(&self, day: u32) -> bool {
        self.days_stored(day) >= self.days_until_auction
    }
}

/// Every vehicle currently held after a bust.
#[derive(Resource, Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct ImpoundLot {
    vehicles: BTreeMap<VehicleId, ImpoundedVehicle>,
}

impl ImpoundLot {
    pub fn impound(&mut self, record: ImpoundedVehicle) {
        if self.vehicles.insert(record.vehicle, record).is_some() {
            warn!("ImpoundLot: vehicle was already impounded, record replaced");
        }
    }

    pub fn get(&self, vehicle: VehicleId) -> Option<&ImpoundedVehicle> {
        self.vehicles.get(&vehicle)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn retrieval_cost(&self, vehicle: VehicleId, day: u32) -> Option<f64> {
        self.get(vehicle).map(|v| v.cost_on(day))
    }

    /// Release the vehicle to its owner, returning what it cost.
    pub fn retrieve(&mut self, vehicle: VehicleId, day: u32) -> Option<f64> {
        self.vehicles.remove(&vehicle).map(|v| v.cost_on(day))
    }

    /// Remove and return every vehicle whose storage ran out by `day`.
    pub fn process_auctions(&mut self, day: u32) -> Vec<ImpoundedVehicle> {
        let due: Vec<VehicleId> = self
            .vehicles
            .values()
            .filter(|v| v.is_due_for_auction(day))
            .map(|v| v.vehicle)
            .collect();
        due.into_iter()
            .filter_map(|id| self.vehicles.remove(&id))
            .collect()
    }
}

impl Saveable for ImpoundLot {
    const SAVE_KEY: &'static str = "impound_lot";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if self.vehicles.is_empty() {
            return None;
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}
