//! Structural invariants of the scheduling core
//!
//! Checked after every operation and tick of a scripted session:
//! capacity bounds, state/queue agreement, queue ordering, timer
//! membership, journal/room cost agreement, and the open-record rule.

use std::sync::Arc;

use hotelac_config::AcConfig;
use hotelac_core::{AcSystem, FanSpeed, Mode, PowerState, RoomId};
use hotelac_journal::SledJournal;

const SERVED_CAPACITY: usize = 2;
const WAITING_CAPACITY: usize = 2;

fn system() -> AcSystem {
    let mut config = AcConfig::default();
    config.system.room_count = 5;
    config.system.served_capacity = SERVED_CAPACITY;
    config.system.waiting_capacity = WAITING_CAPACITY as i64;
    config.system.time_slice_seconds = 30;
    let journal = Arc::new(SledJournal::temporary().unwrap());
    AcSystem::new(&config.system, journal)
}

fn assert_invariants(system: &AcSystem, context: &str) {
    let serving = system.serving_rooms();
    let waiting = system.waiting_rooms();

    // 1. Capacity bounds.
    assert!(serving.len() <= SERVED_CAPACITY, "{}: serving overflow", context);
    assert!(waiting.len() <= WAITING_CAPACITY, "{}: waiting overflow", context);

    // 2. State matches queue membership; at most one queue per room.
    for status in system.all_room_statuses() {
        let id = status.room_id;
        let in_serving = serving.contains(&id);
        let in_waiting = waiting.contains(&id);
        assert!(!(in_serving && in_waiting), "{}: room {} in both queues", context, id);
        match status.state {
            PowerState::Serving => assert!(in_serving, "{}: room {} serving but unqueued", context, id),
            PowerState::Waiting => assert!(in_waiting, "{}: room {} waiting but unqueued", context, id),
            PowerState::Off | PowerState::Paused => assert!(
                !in_serving && !in_waiting,
                "{}: room {} {} but queued",
                context,
                id,
                status.state
            ),
        }
    }

    // 3/4. Queue ordering: speed descending, seconds descending on ties.
    for (queue, seconds_of) in [
        (&serving, "served"),
        (&waiting, "waited"),
    ] {
        for pair in queue.windows(2) {
            let a = system.room_status(pair[0]);
            let b = system.room_status(pair[1]);
            let (a_secs, b_secs) = if seconds_of == "served" {
                (a.served_seconds, b.served_seconds)
            } else {
                (a.waiting_seconds, b.waiting_seconds)
            };
            assert!(
                a.fan_speed > b.fan_speed || (a.fan_speed == b.fan_speed && a_secs >= b_secs),
                "{}: {} queue misordered at {} before {}",
                context,
                seconds_of,
                pair[0],
                pair[1]
            );
        }
    }

    // 5. Timer entries exist exactly for queue members.
    let mut service_timed = system.service_timed_rooms();
    let mut wait_timed = system.wait_timed_rooms();
    let mut serving_sorted = serving.clone();
    let mut waiting_sorted = waiting.clone();
    service_timed.sort();
    wait_timed.sort();
    serving_sorted.sort();
    waiting_sorted.sort();
    assert_eq!(service_timed, serving_sorted, "{}: service timer drift", context);
    assert_eq!(wait_timed, waiting_sorted, "{}: wait timer drift", context);

    // 6. Journal totals track in-memory cost.
    // 8. At most one open record per room, and only while serving.
    for status in system.all_room_statuses() {
        let bill = system.bill(status.room_id);
        assert!(
            (bill.total_cost - status.cost).abs() <= 0.02,
            "{}: room {} journal {} vs cost {}",
            context,
            status.room_id,
            bill.total_cost,
            status.cost
        );
        let open = bill.details.iter().filter(|r| r.end_time.is_none()).count();
        let expected = if status.state == PowerState::Serving { 1 } else { 0 };
        assert_eq!(
            open, expected,
            "{}: room {} has {} open records in state {}",
            context, status.room_id, open, status.state
        );
    }

    // 7. No serving room sits exactly on its target at a tick boundary.
    for status in system.all_room_statuses() {
        if status.state == PowerState::Serving {
            assert!(
                (status.current_temp - status.target_temp).abs() > 1e-9,
                "{}: room {} serving at its target",
                context,
                status.room_id
            );
        }
    }
}

#[test]
fn invariants_hold_through_a_full_session() {
    let system = system();

    system.power_on(RoomId(1), 32.0, Mode::Cool);
    assert_invariants(&system, "power on 1");
    system.power_on(RoomId(2), 28.0, Mode::Cool);
    assert_invariants(&system, "power on 2");
    system.power_on(RoomId(3), 30.0, Mode::Cool);
    assert_invariants(&system, "power on 3 (queued)");
    system.power_on(RoomId(4), 29.0, Mode::Cool);
    assert_invariants(&system, "power on 4 (queued)");

    system.tick(15);
    assert_invariants(&system, "tick 15");

    // A fifth arrival forces an eviction decision in the waiting queue.
    system.power_on(RoomId(5), 35.0, Mode::Cool);
    assert_invariants(&system, "power on 5 into full plant");

    system.change_speed(RoomId(3), FanSpeed::High);
    assert_invariants(&system, "speed up waiting room");
    system.change_speed(RoomId(1), FanSpeed::Low);
    assert_invariants(&system, "slow down room 1");
    system.change_temperature(RoomId(2), 23.0);
    assert_invariants(&system, "retarget room 2");

    for round in 0..8 {
        system.tick(45);
        assert_invariants(&system, &format!("tick round {}", round));
    }

    system.power_off(RoomId(1));
    assert_invariants(&system, "power off 1");
    system.power_off(RoomId(3));
    assert_invariants(&system, "power off 3");

    system.tick(120);
    assert_invariants(&system, "drain");

    system.power_on(RoomId(1), 27.0, Mode::Heat);
    assert_invariants(&system, "heat session");
    system.tick(200);
    assert_invariants(&system, "heat running");

    for id in [RoomId(1), RoomId(2), RoomId(4), RoomId(5)] {
        system.power_off(id);
    }
    assert_invariants(&system, "all off");
    system.tick(90);
    assert_invariants(&system, "idle");
}

#[test]
fn rotation_preserves_invariants_under_contention() {
    let system = system();
    for (id, temp) in [(1, 32.0), (2, 31.0), (3, 30.0), (4, 29.0)] {
        system.power_on(RoomId(id), temp, Mode::Cool);
    }
    assert_invariants(&system, "all on");

    // Everyone at the same speed: only the time slice rotates service.
    for step in 0..12 {
        system.tick(10);
        assert_invariants(&system, &format!("contention step {}", step));
    }

    // Rooms must have rotated at least once by now.
    let statuses = system.all_room_statuses();
    let served_any: Vec<_> = statuses
        .iter()
        .filter(|s| s.cost > 0.0)
        .map(|s| s.room_id)
        .collect();
    assert!(
        served_any.len() > SERVED_CAPACITY,
        "only {:?} ever accrued service",
        served_any
    );
}
