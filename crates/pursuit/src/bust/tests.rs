use bevy::prelude::*;

use super::*;
use crate::params::{BustParams, ImpoundParams};
use crate::types::{ActorId, CaptureTrigger, HeatLevel, VehicleId, ViolationKind};
use crate::violation_ledger::ViolationRecord;
use crate::Saveable;

fn record(fine: f64) -> ViolationRecord {
    ViolationRecord {
        kind: ViolationKind::HitPolice,
        timestamp_secs: 0.0,
        location: Vec2::ZERO,
        heat_delta: 10.0,
        fine,
        witnessed: true,
        witness: None,
        stacks: 0,
    }
}

#[test]
fn test_capture_needs_capture_class_and_level4() {
    assert_eq!(capture_allowed(HeatLevel::Level4, CaptureTrigger::BoxingHold), Ok(()));
    assert_eq!(capture_allowed(HeatLevel::Level5, CaptureTrigger::PitManeuver), Ok(()));
    assert_eq!(
        capture_allowed(HeatLevel::Level5, CaptureTrigger::RoadblockHeld),
        Ok(())
    );
    assert_eq!(
        capture_allowed(HeatLevel::Level3, CaptureTrigger::BoxingHold),
        Err(CaptureRejection::LevelTooLow(HeatLevel::Level3))
    );
    assert_eq!(
        capture_allowed(HeatLevel::Busted, CaptureTrigger::BoxingHold),
        Err(CaptureRejection::LevelTooLow(HeatLevel::Busted))
    );
    assert_eq!(
        capture_allowed(HeatLevel::Level5, CaptureTrigger::Ramming),
        Err(CaptureRejection::NotCaptureClass(CaptureTrigger::Ramming))
    );
}

#[test]
fn test_fine_formula() {
    let bust = BustParams::default();
    let impound = ImpoundParams::default();
    let log = [record(1_000.0), record(500.0)];
    let c = compute_consequences(
        HeatLevel::Level4,
        VehicleId(3),
        40_000.0,
        &log,
        &bust,
        &impound,
    );

    let factor = 1.0 + 2.0 * bust.per_violation_bonus;
    let expected = (bust.base_fine + 1_500.0 + 40_000.0 * bust.vehicle_fine_pct[4])
        * bust.level_multiplier[4]
        * factor;
    assert!((c.fine - expected).abs() < 1e-6);
    assert!((c.reputation_loss - bust.reputation_loss[4] * factor).abs() < 1e-6);
    assert!((c.retrieval_cost - (impound.base_fee + 40_000.0 * impound.value_pct)).abs() < 1e-6);
    assert!(c.impound);
    assert_eq!(c.violation_count, 2);
    assert_eq!(c.vehicle, VehicleId(3));
    assert_eq!(c.days_until_auction, impound.days_until_auction);
}

#[test]
fn test_fine_rises_with_level_and_violations() {
    let bust = BustParams::default();
    let impound = ImpoundParams::default();
    let l4 = compute_consequences(HeatLevel::Level4, VehicleId(1), 20_000.0, &[], &bust, &impound);
    let l5 = compute_consequences(HeatLevel::Level5, VehicleId(1), 20_000.0, &[], &bust, &impound);
    let l5_dirty = compute_consequences(
        HeatLevel::Level5,
        VehicleId(1),
        20_000.0,
        &[record(0.0), record(0.0), record(0.0)],
        &bust,
        &impound,
    );
    assert!(l5.fine > l4.fine);
    assert!(l5_dirty.fine > l5.fine);
    assert!(l5_dirty.reputation_loss > l5.reputation_loss);
}

fn impounded(day: u32) -> ImpoundedVehicle {
    ImpoundedVehicle {
        vehicle: VehicleId(9),
        owner: ActorId(1),
        impounded_day: day,
        retrieval_cost: 2_000.0,
        daily_storage_fee: 500.0,
        days_until_auction: 7,
    }
}

#[test]
fn test_retrieval_cost_charges_at_least_one_day() {
    let v = impounded(3);
    assert_eq!(v.cost_on(3), 2_500.0);
    assert_eq!(v.cost_on(4), 2_500.0);
    assert_eq!(v.cost_on(6), 3_500.0);
}

#[test]
fn test_retrieve_removes_vehicle() {
    let mut lot = ImpoundLot::default();
    lot.impound(impounded(0));
    assert_eq!(lot.retrieval_cost(VehicleId(9), 2), Some(3_000.0));
    assert_eq!(lot.retrieve(VehicleId(9), 2), Some(3_000.0));
    assert!(lot.is_empty());
    assert_eq!(lot.retrieve(VehicleId(9), 2), None);
}

#[test]
fn test_auction_after_storage_runs_out() {
    let mut lot = ImpoundLot::default();
    lot.impound(impounded(0));
    lot.impound(ImpoundedVehicle {
        vehicle: VehicleId(10),
        ..impounded(5)
    });

    assert!(lot.process_auctions(6).is_empty());
    let sold = lot.process_auctions(7);
    assert_eq!(sold.len(), 1);
    assert_eq!(sold[0].vehicle, VehicleId(9));
    assert_eq!(lot.len(), 1);
    assert!(lot.get(VehicleId(10)).is_some());
}

#[test]
fn test_lot_save_roundtrip() {
    assert!(ImpoundLot::default().save_to_bytes().is_none());

    let mut lot = ImpoundLot::default();
    lot.impound(impounded(2));
    let bytes = lot.save_to_bytes().expect("non-empty lot saves");
    assert_eq!(ImpoundLot::load_from_bytes(&bytes), lot);
}

#[test]
fn test_corrupt_lot_falls_back_to_empty() {
    assert!(ImpoundLot::load_from_bytes(&[]).is_empty());
}
