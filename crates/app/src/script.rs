//! A scripted getaway. The driver moves the player along a fixed route,
//! reports its violations, steers every attached unit toward the destination
//! the engine gives it and decides who can see the player.

use bevy::prelude::*;

use pursuit::cooldown::{CooldownZone, CooldownZones};
use pursuit::criminal_record::CriminalRecords;
use pursuit::events::{ActorTransformUpdated, UnitSensorUpdated, ViolationReported};
use pursuit::params::PursuitParams;
use pursuit::roster::UnitRoster;
use pursuit::sessions::PursuitSessions;
use pursuit::types::{ActorId, UnitType, ViolationKind};

const PLAYER: ActorId = ActorId(0);
const PLAYER_SPEED: f32 = 30.0;
const UNIT_SPEED: f32 = 32.0;
const SIGHT_RANGE: f32 = 90.0;
const MAX_TICKS: u32 = 6_000;

const AVENUE_END: Vec2 = Vec2::new(600.0, 0.0);
const HIDEOUT: Vec2 = Vec2::new(900.0, 300.0);

struct ScriptedViolation {
    at_secs: f32,
    kind: ViolationKind,
    speed: f32,
}

const VIOLATIONS: [ScriptedViolation; 5] = [
    ScriptedViolation {
        at_secs: 1.0,
        kind: ViolationKind::Speeding,
        speed: 40.0,
    },
    ScriptedViolation {
        at_secs: 3.0,
        kind: ViolationKind::Reckless,
        speed: 30.0,
    },
    ScriptedViolation {
        at_secs: 6.0,
        kind: ViolationKind::HitPolice,
        speed: 30.0,
    },
    ScriptedViolation {
        at_secs: 9.0,
        kind: ViolationKind::HitCivilian,
        speed: 30.0,
    },
    ScriptedViolation {
        at_secs: 12.0,
        kind: ViolationKind::HitPolice,
        speed: 30.0,
    },
];

/// Twelve patrols spread over the district and one cooldown zone at the end
/// of the route.
fn setup_city(world: &mut World) {
    {
        let mut roster = world.resource_mut::<UnitRoster>();
        for i in 0..12 {
            let position = Vec2::new((i % 4) as f32 * 250.0, (i / 4) as f32 * 200.0 - 200.0);
            let unit_type = if i % 3 == 0 {
                UnitType::Interceptor
            } else {
                UnitType::Patrol
            };
            roster.spawn_patrol(unit_type, position);
        }
    }
    world
        .resource_mut::<CooldownZones>()
        .register(CooldownZone::new(1, "Harbor underpass", HIDEOUT, 60.0).with_multiplier(3.0));
}

/// Player transform at `t`: east along the avenue, north-east into the
/// hideout, then parked.
fn player_at(t: f32) -> (Vec2, Vec2) {
    let avenue_secs = AVENUE_END.length() / PLAYER_SPEED;
    if t < avenue_secs {
        return (Vec2::X * PLAYER_SPEED * t, Vec2::X * PLAYER_SPEED);
    }
    let turn = HIDEOUT - AVENUE_END;
    let turn_secs = turn.length() / PLAYER_SPEED;
    if t < avenue_secs + turn_secs {
        let heading = turn.normalize_or_zero();
        return (
            AVENUE_END + heading * PLAYER_SPEED * (t - avenue_secs),
            heading * PLAYER_SPEED,
        );
    }
    (HIDEOUT, Vec2::ZERO)
}

/// Move every unit chasing the player one step toward its destination and
/// report what it sees. Nobody sees into a cooldown zone.
fn drive_units(world: &mut World, player: Vec2, dt: f32) {
    let hidden = world.resource::<CooldownZones>().zone_at(player).is_some();
    let updates: Vec<UnitSensorUpdated> = world
        .resource::<UnitRoster>()
        .units()
        .filter(|u| u.target == Some(PLAYER))
        .map(|u| {
            let goal = u.destination.unwrap_or(u.position);
            let step = (goal - u.position).clamp_length_max(UNIT_SPEED * dt);
            let position = u.position + step;
            UnitSensorUpdated {
                unit: u.id,
                position,
                velocity: step / dt,
                has_visual: !hidden && position.distance(player) <= SIGHT_RANGE,
            }
        })
        .collect();
    for update in updates {
        world.send_event(update);
    }
}

pub fn run_getaway(app: &mut App) {
    setup_city(app.world_mut());
    let dt = app.world().resource::<PursuitParams>().tick_seconds;
    let mut next_violation = 0;

    for tick in 0..MAX_TICKS {
        let t = tick as f32 * dt;
        let (position, velocity) = player_at(t);
        let world = app.world_mut();
        world.send_event(ActorTransformUpdated {
            actor: PLAYER,
            position,
            velocity,
        });
        while let Some(v) = VIOLATIONS.get(next_violation).filter(|v| v.at_secs <= t) {
            world.send_event(ViolationReported::new(PLAYER, v.kind, position, v.speed));
            next_violation += 1;
        }
        drive_units(world, position, dt);
        world.run_schedule(FixedUpdate);

        let sessions = world.resource::<PursuitSessions>();
        if next_violation == VIOLATIONS.len()
            && !sessions.is_active(PLAYER)
            && !sessions.archive().is_empty()
        {
            break;
        }
    }

    report(app.world_mut());
}

fn report(world: &mut World) {
    let resolved = world.resource_mut::<PursuitSessions>().drain_archive();
    match resolved.last() {
        Some(session) => info!(
            "Driver: pursuit {:?} ended {:?} at peak {:?} after {:.1}s ({} units dispatched, {} violations, live bounty {:.0})",
            session.id,
            session.outcome,
            session.peak_level,
            session.stats.duration_secs,
            session.stats.units_dispatched,
            session.stats.violations,
            session.stats.live_bounty,
        ),
        None => warn!("Driver: no pursuit resolved within {MAX_TICKS} ticks"),
    }
    if let Some(record) = world.resource::<CriminalRecords>().get(PLAYER) {
        info!(
            "Driver: record busts {} escapes {} fines {:.0} bounty {:.0} notoriety {:.2}",
            record.total_busts,
            record.total_escapes,
            record.total_fines_paid,
            record.total_bounty_earned,
            record.notoriety
        );
    }
}
