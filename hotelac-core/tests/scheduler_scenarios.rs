//! End-to-end scheduler scenarios
//!
//! Simulated-time walkthroughs of the scheduling core: cool-down and
//! billing, priority preemption, time-slice rotation, pause/resume, and
//! full-waiting-queue eviction.

use std::sync::Arc;

use hotelac_config::AcConfig;
use hotelac_core::{AcSystem, FanSpeed, Mode, PowerOnResponse, PowerState, RoomId};
use hotelac_journal::SledJournal;

fn system(room_count: u32, served: usize, waiting: i64, time_slice: u64) -> AcSystem {
    let mut config = AcConfig::default();
    config.system.room_count = room_count;
    config.system.served_capacity = served;
    config.system.waiting_capacity = waiting;
    config.system.time_slice_seconds = time_slice;
    let journal = Arc::new(SledJournal::temporary().unwrap());
    AcSystem::new(&config.system, journal)
}

fn operation_tags(system: &AcSystem, room: RoomId) -> Vec<String> {
    system
        .bill(room)
        .details
        .iter()
        .map(|r| r.operation_type.clone())
        .collect()
}

#[test]
fn single_room_cool_down_reaches_target_and_bills_five_units() {
    let system = system(1, 1, 2, 30);
    system.power_on(RoomId(1), 30.0, Mode::Cool);

    system.tick(600);

    let status = system.room_status(RoomId(1));
    assert_eq!(status.current_temp, 25.0);
    assert_eq!(status.state, PowerState::Paused);
    assert_eq!(status.cost, 5.0);

    // The room left the serving queue the tick it landed on target.
    assert!(system.serving_rooms().is_empty());
    assert!(system.service_timed_rooms().is_empty());

    let bill = system.bill(RoomId(1));
    assert!((bill.total_cost - 5.0).abs() < 0.01);
    assert!(bill.details.iter().all(|r| r.end_time.is_some()));
}

#[test]
fn higher_fan_speed_preempts_the_longest_served_low_room() {
    let system = system(3, 2, 2, 100_000);
    system.power_on(RoomId(1), 30.0, Mode::Cool);
    system.power_on(RoomId(2), 30.0, Mode::Cool);
    system.change_speed(RoomId(1), FanSpeed::Low);
    system.change_speed(RoomId(2), FanSpeed::Low);

    system.tick(10);

    let response = system.power_on(RoomId(3), 30.0, Mode::Cool);
    match response {
        PowerOnResponse::Admitted { state, .. } => assert_eq!(state, PowerState::Serving),
        other => panic!("expected admission, got {:?}", other),
    }

    let serving = system.serving_rooms();
    let waiting = system.waiting_rooms();
    assert!(serving.contains(&RoomId(3)));
    assert_eq!(serving.len(), 2);
    assert_eq!(waiting.len(), 1);
    // Exactly one of the low-speed rooms was demoted.
    assert!(waiting[0] == RoomId(1) || waiting[0] == RoomId(2));
    assert!(operation_tags(&system, RoomId(3)).contains(&"PRIORITY_REPLACE".to_string()));
    // The demoted room restarted its wait from zero.
    assert_eq!(system.room_status(waiting[0]).waiting_seconds, 0);
}

#[test]
fn equal_speed_power_on_never_preempts() {
    let system = system(2, 1, 2, 100_000);
    system.power_on(RoomId(1), 30.0, Mode::Cool);

    let response = system.power_on(RoomId(2), 28.0, Mode::Cool);
    match response {
        PowerOnResponse::State { state, .. } => assert_eq!(state, PowerState::Waiting),
        other => panic!("expected waiting admission, got {:?}", other),
    }
    assert_eq!(system.serving_rooms(), vec![RoomId(1)]);
    assert_eq!(system.waiting_rooms(), vec![RoomId(2)]);
}

#[test]
fn time_slice_rotation_swaps_same_speed_rooms() {
    let system = system(2, 1, 2, 30);
    system.power_on(RoomId(1), 30.0, Mode::Cool);
    system.power_on(RoomId(2), 30.0, Mode::Cool); // queued at medium

    system.tick(29);
    assert_eq!(system.serving_rooms(), vec![RoomId(1)]);

    system.tick(1);
    assert_eq!(system.serving_rooms(), vec![RoomId(2)]);
    assert_eq!(system.waiting_rooms(), vec![RoomId(1)]);

    // The rotated-out room restarts its wait; the admitted room's wait
    // clock is gone and its service clock starts fresh.
    let r1 = system.room_status(RoomId(1));
    assert_eq!(r1.state, PowerState::Waiting);
    assert_eq!(r1.waiting_seconds, 0);
    let r2 = system.room_status(RoomId(2));
    assert_eq!(r2.state, PowerState::Serving);
    assert_eq!(r2.served_seconds, 0);
    assert!(!system.wait_timed_rooms().contains(&RoomId(2)));

    assert!(operation_tags(&system, RoomId(2)).contains(&"SERVING_RESUME".to_string()));
}

#[test]
fn paused_room_drifts_back_and_is_resumed_through_the_waiting_queue() {
    let system = system(1, 1, 2, 30);
    // Power on close to target so the pause happens quickly.
    system.power_on(RoomId(1), 25.2, Mode::Cool);

    system.tick(30);
    let status = system.room_status(RoomId(1));
    assert_eq!(status.state, PowerState::Paused);
    assert!(system.serving_rooms().is_empty());
    assert!(system
        .bill(RoomId(1))
        .details
        .iter()
        .all(|r| r.end_time.is_some()));

    // Drift away from the target at 0.5 °C/min until the one-degree
    // threshold re-requests service; refill promotes it the same tick.
    let mut ticks = 0;
    while system.room_status(RoomId(1)).state != PowerState::Serving && ticks < 300 {
        system.tick(1);
        ticks += 1;
    }

    let status = system.room_status(RoomId(1));
    assert_eq!(status.state, PowerState::Serving);
    assert!(status.current_temp >= 25.9);
    assert_eq!(system.serving_rooms(), vec![RoomId(1)]);
    assert!(system.waiting_rooms().is_empty());
    assert!(!system.wait_timed_rooms().contains(&RoomId(1)));
    assert!(operation_tags(&system, RoomId(1)).contains(&"QUEUE_FILL".to_string()));
}

#[test]
fn bills_stay_consistent_across_a_mixed_session() {
    let system = system(3, 2, 2, 30);
    system.power_on(RoomId(1), 32.0, Mode::Cool);
    system.power_on(RoomId(2), 28.0, Mode::Cool);
    system.power_on(RoomId(3), 30.0, Mode::Cool); // queued

    system.tick(90);
    system.change_speed(RoomId(1), FanSpeed::High);
    system.tick(45);
    system.change_temperature(RoomId(2), 24.0);
    system.tick(100);
    system.power_off(RoomId(1));
    system.tick(65);

    for id in [RoomId(1), RoomId(2), RoomId(3)] {
        let status = system.room_status(id);
        let bill = system.bill(id);
        assert!(
            (bill.total_cost - status.cost).abs() <= 0.02,
            "room {} journal {} vs in-memory {}",
            id,
            bill.total_cost,
            status.cost
        );
    }

    // The plant-wide summary is the sum of the room bills.
    let summary = system.summary();
    let total: f64 = [RoomId(1), RoomId(2), RoomId(3)]
        .iter()
        .map(|&id| system.bill(id).total_cost)
        .sum();
    assert!((summary.total_cost - total).abs() <= 0.02);
}

#[test]
fn forced_demotion_into_a_full_waiting_queue_parks_the_lowest_waiter() {
    let system = system(3, 1, 1, 100_000);
    system.power_on(RoomId(1), 30.0, Mode::Cool); // serving
    system.power_on(RoomId(2), 30.0, Mode::Cool); // waiting, queue now full
    system.change_speed(RoomId(1), FanSpeed::Low);
    system.change_speed(RoomId(2), FanSpeed::Low);

    // Room 3 arrives at medium and preempts the low-speed server; its
    // victim must enter the already-full waiting queue.
    system.power_on(RoomId(3), 30.0, Mode::Cool);

    assert_eq!(system.serving_rooms(), vec![RoomId(3)]);
    assert_eq!(system.waiting_rooms(), vec![RoomId(1)]);
    let parked = system.room_status(RoomId(2));
    assert_eq!(parked.state, PowerState::Paused);
    assert!(!system.wait_timed_rooms().contains(&RoomId(2)));
}

#[test]
fn preemption_is_antisymmetric() {
    // Forward: a medium request displaces a low-speed server.
    let forward = system(2, 1, 2, 100_000);
    forward.power_on(RoomId(1), 30.0, Mode::Cool);
    forward.change_speed(RoomId(1), FanSpeed::Low);
    forward.power_on(RoomId(2), 30.0, Mode::Cool);
    assert_eq!(forward.serving_rooms(), vec![RoomId(2)]);
    assert!(forward.waiting_rooms().contains(&RoomId(1)));

    // Reverse composition: a low request against a medium server waits.
    let reverse = system(2, 1, 2, 100_000);
    reverse.power_on(RoomId(1), 30.0, Mode::Cool); // serving at medium
    reverse.power_on(RoomId(2), 30.0, Mode::Cool); // queued
    reverse.change_speed(RoomId(2), FanSpeed::Low);
    reverse.power_off(RoomId(2)); // keeps its low fan setting
    let response = reverse.power_on(RoomId(2), 30.0, Mode::Cool);
    match response {
        PowerOnResponse::State { state, .. } => assert_eq!(state, PowerState::Waiting),
        other => panic!("expected waiting admission, got {:?}", other),
    }
    assert_eq!(reverse.serving_rooms(), vec![RoomId(1)]);
}

#[test]
fn minute_alignment_rounds_to_display_precision() {
    let system = system(3, 2, 2, 100_000);
    system.power_on(RoomId(1), 32.0, Mode::Cool);
    system.power_on(RoomId(2), 29.0, Mode::Cool);
    system.change_speed(RoomId(2), FanSpeed::Low);

    system.tick(60);

    for status in system.all_room_statuses() {
        let tenths = status.current_temp * 10.0;
        assert!(
            (tenths - tenths.round()).abs() < 1e-9,
            "room {} temperature {} not aligned to one decimal",
            status.room_id,
            status.current_temp
        );
        let cents = status.cost * 100.0;
        assert!(
            (cents - cents.round()).abs() < 1e-9,
            "room {} cost {} not aligned to two decimals",
            status.room_id,
            status.cost
        );
    }

    // Medium fan bills 0.5 per minute once aligned with the rounded
    // one-degree-per-two-minutes change.
    assert_eq!(system.room_status(RoomId(1)).cost, 0.5);
}
