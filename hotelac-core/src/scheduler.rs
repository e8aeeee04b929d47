//! Scheduler: queue discipline, tick pipeline, journal bookkeeping
//!
//! The scheduler is the single entry point for user actions and time.
//! Per action it mutates the room store and the two queues and writes
//! journal entries; per tick it advances timers, runs the thermal engine
//! over every room, applies minute alignment, sweeps state transitions
//! into queue membership, refills freed serving slots, and rotates
//! same-speed rooms on time-slice expiry.
//!
//! Lock discipline: the queue priority callbacks read-lock the room
//! store and the timer maps. Queue operations that re-sort (`push`,
//! `promote`, `resort`) must therefore never run while a room or timer
//! guard is held.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Local;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use hotelac_config::SystemConfig;
use hotelac_journal::{Journal, NewRecord, OperationType, RecordId};

use crate::api::{
    ChangeResponse, FeesResponse, PowerOffResponse, PowerOnResponse, QueuePositionResponse,
    RoomBill, RoomStatus, SummaryReport,
};
use crate::engine::{round_to, ThermalEngine, TEMP_TOLERANCE};
use crate::queue::{PriorityKey, RoomQueue};
use crate::room::{FanSpeed, Mode, PowerState, RoomId, RoomStore};
use crate::timer::SecondsTimer;

/// Priority/time-slice scheduler over the shared cooling plant
pub struct Scheduler {
    rooms: Arc<RwLock<RoomStore>>,
    served: RoomQueue,
    waiting: RoomQueue,
    service_timer: Arc<RwLock<SecondsTimer>>,
    wait_timer: Arc<RwLock<SecondsTimer>>,
    engine: ThermalEngine,
    journal: Arc<dyn Journal>,
    /// Wait threshold for same-speed rotation, seconds
    time_slice: u64,
    /// Target applied at serving admission, both modes
    default_target: f64,
    /// Room id → currently open detail record
    open_records: HashMap<RoomId, RecordId>,
    /// Seconds into the current minute, 0..60
    minute_seconds: u32,
    /// Temperature of each room when the current minute began
    minute_start_temps: HashMap<RoomId, f64>,
}

impl Scheduler {
    pub fn new(config: &SystemConfig, journal: Arc<dyn Journal>) -> Self {
        let rooms = Arc::new(RwLock::new(RoomStore::from_config(config)));
        let service_timer = Arc::new(RwLock::new(SecondsTimer::new()));
        let wait_timer = Arc::new(RwLock::new(SecondsTimer::new()));

        // Serving order: higher fan speed first, longer service first.
        let served = {
            let rooms = Arc::clone(&rooms);
            let timer = Arc::clone(&service_timer);
            RoomQueue::bounded(
                config.served_capacity,
                Box::new(move |id| PriorityKey {
                    speed: rooms.read().get(id).fan_speed.priority(),
                    seconds: timer.read().get(id),
                }),
            )
        };
        // Waiting order: higher fan speed first, longer wait first.
        let waiting = {
            let rooms = Arc::clone(&rooms);
            let timer = Arc::clone(&wait_timer);
            RoomQueue::with_capacity(
                config.waiting_capacity_limit(),
                Box::new(move |id| PriorityKey {
                    speed: rooms.read().get(id).fan_speed.priority(),
                    seconds: timer.read().get(id),
                }),
            )
        };

        Self {
            rooms,
            served,
            waiting,
            service_timer,
            wait_timer,
            engine: ThermalEngine::new(),
            journal,
            time_slice: config.time_slice_seconds,
            default_target: config.default_target_temp,
            open_records: HashMap::new(),
            minute_seconds: 0,
            minute_start_temps: HashMap::new(),
        }
    }

    // ---------- user actions ----------

    /// Power a room on, supplying its measured temperature and mode
    pub fn power_on(&mut self, room_id: RoomId, current_temp: f64, mode: Mode) -> PowerOnResponse {
        let state = { self.rooms.read().get(room_id).state };
        if state != PowerState::Off {
            return PowerOnResponse::State { room_id, state };
        }

        let now = Self::now();
        if self.served.has_slot() {
            self.admit_new(room_id, current_temp, mode, OperationType::PowerOn, &now);
            return self.admitted_response(room_id);
        }

        // No slot: a strictly faster fan preempts a slower serving room.
        // The incoming room still carries its previous fan speed here
        // (medium on first boot); equal speeds never preempt.
        let new_speed = { self.rooms.read().get(room_id).fan_speed };
        if let Some(victim) = self.preemption_victim(new_speed) {
            info!(room = room_id.0, victim = victim.0, "priority preemption at power-on");
            self.demote_to_waiting(victim);
            self.admit_new(
                room_id,
                current_temp,
                mode,
                OperationType::PriorityReplace,
                &now,
            );
            return self.admitted_response(room_id);
        }

        // Queue behind the plant.
        {
            let mut rooms = self.rooms.write();
            let room = rooms.get_mut(room_id);
            room.current_temp = round_to(current_temp, 3);
            room.mode = mode;
            room.state = PowerState::Waiting;
        }
        self.wait_timer.write().reset(room_id);
        self.force_enqueue_waiting(room_id);
        debug!(room = room_id.0, "queued for service");
        PowerOnResponse::State {
            room_id,
            state: PowerState::Waiting,
        }
    }

    /// Change a room's fan speed
    pub fn change_speed(&mut self, room_id: RoomId, new_speed: FanSpeed) -> ChangeResponse {
        let now = Self::now();

        if self.served.contains(room_id) {
            let old_speed = {
                let mut rooms = self.rooms.write();
                let room = rooms.get_mut(room_id);
                let old = room.fan_speed;
                room.fan_speed = new_speed;
                old
            };
            self.served.resort();
            if new_speed != old_speed {
                self.close_record(room_id, &now);
                self.open_record(room_id, OperationType::SpeedChange, &now);
            }
            if new_speed > old_speed {
                // The room already holds a slot; record the priority bump.
                self.log_event(room_id, OperationType::SpeedAdjustPriority, &now);
            } else if new_speed < old_speed {
                self.rebalance_after_speed_decrease();
            }
            return ChangeResponse::ok();
        }

        if self.waiting.contains(room_id) {
            let old_speed = {
                let mut rooms = self.rooms.write();
                let room = rooms.get_mut(room_id);
                let old = room.fan_speed;
                room.fan_speed = new_speed;
                old
            };
            if new_speed > old_speed {
                self.wait_timer.write().reset(room_id);
                self.waiting.promote(room_id);
            } else {
                self.waiting.resort();
            }
            if let Some(victim) = self.preemption_victim(new_speed) {
                info!(
                    room = room_id.0,
                    victim = victim.0,
                    "priority preemption after speed change"
                );
                if let Some(&record_id) = self.open_records.get(&room_id) {
                    self.replace_serving(victim, room_id, None);
                    if let Err(e) = self.journal.update_fan_speed(
                        record_id,
                        self.engine.fee_rate(new_speed),
                        &new_speed.to_string(),
                    ) {
                        warn!(room = room_id.0, error = %e, "journal fan-speed update failed");
                    }
                } else {
                    self.replace_serving(victim, room_id, Some(OperationType::PriorityReplace));
                }
            }
            return ChangeResponse::ok();
        }

        let state = { self.rooms.read().get(room_id).state };
        ChangeResponse::State { room_id, state }
    }

    /// Change a room's target temperature
    ///
    /// Applies while serving, waiting, or paused; logged as a
    /// zero-duration journal event, never touching the open record.
    pub fn change_temperature(&mut self, room_id: RoomId, new_target: f64) -> ChangeResponse {
        let state = { self.rooms.read().get(room_id).state };
        match state {
            PowerState::Serving | PowerState::Waiting | PowerState::Paused => {
                {
                    self.rooms.write().get_mut(room_id).target_temp = round_to(new_target, 3);
                }
                let now = Self::now();
                self.log_event(room_id, OperationType::TempChange, &now);
                ChangeResponse::ok()
            }
            _ => ChangeResponse::State { room_id, state },
        }
    }

    /// Power a room off, closing its open journal record
    pub fn power_off(&mut self, room_id: RoomId) -> PowerOffResponse {
        let now = Self::now();
        if self.served.pop(room_id) {
            self.service_timer.write().remove(room_id);
        }
        if self.waiting.pop(room_id) {
            self.wait_timer.write().remove(room_id);
        }
        {
            self.rooms.write().get_mut(room_id).state = PowerState::Off;
        }
        self.close_record(room_id, &now);
        info!(room = room_id.0, "powered off");

        let total = self.room_total(room_id);
        PowerOffResponse {
            room_id,
            state: PowerState::Off,
            current_fee: total,
            total_fee: total,
        }
    }

    // ---------- time ----------

    /// Advance the simulation by `delta_seconds` one-second steps
    pub fn tick(&mut self, delta_seconds: u64) {
        for _ in 0..delta_seconds {
            self.tick_one_second();
        }
    }

    fn tick_one_second(&mut self) {
        // 1. Timers advance; the serving tie-break (service time) moved.
        self.service_timer.write().tick(1);
        self.wait_timer.write().tick(1);
        self.served.resort();

        // 2. First second of a minute: remember where every room started.
        if self.minute_seconds == 0 {
            let rooms = self.rooms.read();
            self.minute_start_temps = rooms
                .all()
                .map(|room| (room.room_id, room.current_temp))
                .collect();
        }

        let ids = { self.rooms.read().ids() };
        let before = self.state_snapshot(&ids);

        // 3. Engine pass; bill only rooms that are still serving after it.
        for &room_id in &ids {
            let billed = {
                let mut rooms = self.rooms.write();
                let room = rooms.get_mut(room_id);
                let cost = self.engine.advance(room, 1);
                if cost > 0.0 && room.state == PowerState::Serving {
                    room.cost += cost;
                    Some(cost)
                } else {
                    None
                }
            };
            if let Some(cost) = billed {
                self.add_cost_to_open_record(room_id, cost);
            }
        }

        // 4. Minute alignment every 60th second.
        self.minute_seconds += 1;
        if self.minute_seconds >= 60 {
            self.minute_seconds = 0;
            self.minute_alignment();
        }

        // 5. Sweep state transitions into queue membership.
        let after = self.state_snapshot(&ids);
        for &room_id in &ids {
            match (before[&room_id], after[&room_id]) {
                (PowerState::Serving, PowerState::Paused)
                | (PowerState::Serving, PowerState::Off) => {
                    self.served.pop(room_id);
                    self.service_timer.write().remove(room_id);
                    if self.waiting.pop(room_id) {
                        self.wait_timer.write().remove(room_id);
                    }
                    let now = Self::now();
                    self.close_record(room_id, &now);
                    debug!(room = room_id.0, state = %after[&room_id], "left service");
                }
                (PowerState::Paused, PowerState::Waiting) => {
                    self.wait_timer.write().reset(room_id);
                    self.force_enqueue_waiting(room_id);
                    debug!(room = room_id.0, "drifted a degree; re-requesting service");
                }
                _ => {}
            }
        }

        // 6. Refill freed serving slots from the waiting queue.
        self.refill_from_waiting();

        // 7. Same-speed fairness rotation.
        self.time_slice_rotation();
    }

    // ---------- queue discipline ----------

    /// Pick the serving room a strictly faster request replaces
    ///
    /// Single slower room: that one. Several at one slower speed: the
    /// longest-served. Mixed slower speeds: the slowest.
    fn preemption_victim(&self, new_speed: FanSpeed) -> Option<RoomId> {
        let members = self.served.members().to_vec();
        let lower: Vec<RoomId> = {
            let rooms = self.rooms.read();
            members
                .into_iter()
                .filter(|&id| rooms.get(id).fan_speed < new_speed)
                .collect()
        };
        if lower.is_empty() {
            return None;
        }
        if lower.len() == 1 {
            return Some(lower[0]);
        }
        let speeds: HashSet<FanSpeed> = {
            let rooms = self.rooms.read();
            lower.iter().map(|&id| rooms.get(id).fan_speed).collect()
        };
        if speeds.len() == 1 {
            let timer = self.service_timer.read();
            lower.into_iter().max_by_key(|&id| timer.get(id))
        } else {
            let rooms = self.rooms.read();
            lower.into_iter().min_by_key(|&id| rooms.get(id).fan_speed)
        }
    }

    /// Admit a powered-on room into a serving slot
    fn admit_new(
        &mut self,
        room_id: RoomId,
        current_temp: f64,
        mode: Mode,
        op: OperationType,
        now: &str,
    ) {
        {
            let mut rooms = self.rooms.write();
            let room = rooms.get_mut(room_id);
            room.current_temp = round_to(current_temp, 3);
            room.mode = mode;
            room.target_temp = self.default_target;
            room.fan_speed = FanSpeed::Medium;
            room.state = PowerState::Serving;
        }
        self.service_timer.write().reset(room_id);
        self.served.push(room_id);
        self.open_record(room_id, op, now);
    }

    /// Move a serving room to the waiting queue, closing its record
    fn demote_to_waiting(&mut self, victim: RoomId) {
        self.served.pop(victim);
        self.service_timer.write().remove(victim);
        {
            self.rooms.write().get_mut(victim).state = PowerState::Waiting;
        }
        self.wait_timer.write().reset(victim);
        self.force_enqueue_waiting(victim);
        let now = Self::now();
        self.close_record(victim, &now);
    }

    /// Take a room out of the waiting queue along with its timer
    fn take_from_waiting(&mut self, room_id: RoomId) {
        self.waiting.pop(room_id);
        self.wait_timer.write().remove(room_id);
    }

    /// Swap `victim` out of service for `incoming` from the waiting queue
    fn replace_serving(&mut self, victim: RoomId, incoming: RoomId, record: Option<OperationType>) {
        let now = Self::now();
        self.take_from_waiting(incoming);
        self.demote_to_waiting(victim);
        {
            self.rooms.write().get_mut(incoming).state = PowerState::Serving;
        }
        self.service_timer.write().reset(incoming);
        self.served.push(incoming);
        if let Some(op) = record {
            self.open_record(incoming, op, &now);
        }
    }

    /// Enqueue a room that must enter the waiting queue
    ///
    /// When the queue is full, the lowest-priority waiting room is parked
    /// (`paused`) to make room; ownership of the request is preserved.
    fn force_enqueue_waiting(&mut self, room_id: RoomId) {
        if self.waiting.contains(room_id) {
            return;
        }
        if self.waiting.is_full() {
            if let Some(evicted) = self.waiting.back() {
                self.waiting.pop(evicted);
                self.wait_timer.write().remove(evicted);
                {
                    self.rooms.write().get_mut(evicted).state = PowerState::Paused;
                }
                debug!(room = evicted.0, "waiting queue full; parked lowest-priority room");
            }
        }
        self.waiting.push(room_id);
    }

    /// After a serving room slowed down, let an overdue faster waiter in
    fn rebalance_after_speed_decrease(&mut self) {
        if self.served.has_slot() || self.waiting.is_empty() {
            return;
        }
        let Some(lowest_served) = self.served.back() else {
            return;
        };
        let candidate = {
            let timer = self.wait_timer.read();
            self.waiting
                .members()
                .iter()
                .copied()
                .max_by_key(|&id| timer.get(id))
        };
        let Some(candidate) = candidate else {
            return;
        };
        if self.wait_timer.read().get(candidate) < self.time_slice {
            return;
        }
        let outranks = {
            let rooms = self.rooms.read();
            rooms.get(candidate).fan_speed > rooms.get(lowest_served).fan_speed
        };
        if outranks {
            info!(
                room = candidate.0,
                victim = lowest_served.0,
                "speed decrease rebalance"
            );
            self.replace_serving(lowest_served, candidate, Some(OperationType::PriorityReplace));
        }
    }

    /// Promote waiting rooms into every free serving slot, best first
    fn refill_from_waiting(&mut self) {
        while self.served.has_slot() {
            let Some(next) = self.waiting.front() else {
                break;
            };
            let now = Self::now();
            self.take_from_waiting(next);
            {
                self.rooms.write().get_mut(next).state = PowerState::Serving;
            }
            self.service_timer.write().reset(next);
            self.served.push(next);
            self.open_record(next, OperationType::QueueFill, &now);
            debug!(room = next.0, "refilled serving slot");
        }
    }

    /// Rotate same-speed rooms once a waiter's time slice has expired
    ///
    /// Runs only when the serving queue is full and someone is waiting;
    /// at most one rotation per tick.
    fn time_slice_rotation(&mut self) {
        if self.served.has_slot() || self.waiting.is_empty() {
            return;
        }
        let mut speeds: Vec<FanSpeed> = {
            let rooms = self.rooms.read();
            self.served
                .members()
                .iter()
                .map(|&id| rooms.get(id).fan_speed)
                .collect()
        };
        speeds.sort_unstable_by(|a, b| b.cmp(a));
        speeds.dedup();

        for speed in speeds {
            let waiting_at_speed: Vec<RoomId> = {
                let rooms = self.rooms.read();
                self.waiting
                    .members()
                    .iter()
                    .copied()
                    .filter(|&id| rooms.get(id).fan_speed == speed)
                    .collect()
            };
            if waiting_at_speed.is_empty() {
                continue;
            }
            // Longest wait wins; having sat out a full slice wins first.
            let selected = {
                let timer = self.wait_timer.read();
                waiting_at_speed.into_iter().max_by_key(|&id| {
                    let waited = timer.get(id);
                    (waited >= self.time_slice, waited)
                })
            };
            let Some(selected) = selected else {
                continue;
            };
            if self.wait_timer.read().get(selected) < self.time_slice {
                continue;
            }
            let victim = {
                let rooms = self.rooms.read();
                let timer = self.service_timer.read();
                self.served
                    .members()
                    .iter()
                    .copied()
                    .filter(|&id| rooms.get(id).fan_speed == speed)
                    .max_by_key(|&id| timer.get(id))
            };
            let Some(victim) = victim else {
                continue;
            };
            info!(room = selected.0, victim = victim.0, "time-slice rotation");
            self.replace_serving(victim, selected, Some(OperationType::ServingResume));
            break;
        }
    }

    // ---------- minute alignment ----------

    /// Round temperatures to display precision and square cost with the
    /// rounded change, once per simulated minute
    fn minute_alignment(&mut self) {
        let ids = { self.rooms.read().ids() };
        let mut record_adjustments: Vec<(RoomId, f64)> = Vec::new();
        {
            let mut rooms = self.rooms.write();
            for &room_id in &ids {
                let room = rooms.get_mut(room_id);
                if room.state == PowerState::Serving {
                    let start = self
                        .minute_start_temps
                        .get(&room_id)
                        .copied()
                        .unwrap_or(room.current_temp);
                    let change_before = (room.current_temp - start).abs();
                    room.current_temp = round_to(room.current_temp, 1);
                    let change_after = (room.current_temp - start).abs();

                    // Fee follows the rounded change: 1 unit per degree.
                    let adjustment = change_after - change_before;
                    room.cost = round_to(room.cost + adjustment, 2);
                    if adjustment != 0.0 {
                        record_adjustments.push((room_id, adjustment));
                    }

                    // Rounding can land the room exactly on its target;
                    // that ends the service segment this same tick.
                    if (room.current_temp - room.target_temp).abs() <= TEMP_TOLERANCE {
                        room.current_temp = round_to(room.target_temp, 3);
                        room.state = PowerState::Paused;
                    }
                } else {
                    room.current_temp = round_to(room.current_temp, 1);
                    room.cost = round_to(room.cost, 2);
                }
                self.minute_start_temps.insert(room_id, room.current_temp);
            }
        }
        for (room_id, adjustment) in record_adjustments {
            self.adjust_open_record(room_id, adjustment);
        }
    }

    // ---------- journal bookkeeping ----------

    /// Open a service-segment record for a room; failures log and continue
    fn open_record(&mut self, room_id: RoomId, op: OperationType, now: &str) {
        let seed = {
            let rooms = self.rooms.read();
            let room = rooms.get(room_id);
            NewRecord {
                room_id: room_id.0,
                request_time: now.to_string(),
                mode: room.mode.to_string(),
                target_temp: room.target_temp,
                fan_speed: room.fan_speed.to_string(),
                fee_rate: self.engine.fee_rate(room.fan_speed),
                operation_type: op,
            }
        };
        match self.journal.create_record(seed) {
            Ok(record_id) => {
                self.open_records.insert(room_id, record_id);
            }
            Err(e) => warn!(room = room_id.0, error = %e, "journal record create failed"),
        }
    }

    /// Append a zero-duration event record (created already closed)
    fn log_event(&mut self, room_id: RoomId, op: OperationType, now: &str) {
        let seed = {
            let rooms = self.rooms.read();
            let room = rooms.get(room_id);
            NewRecord {
                room_id: room_id.0,
                request_time: now.to_string(),
                mode: room.mode.to_string(),
                target_temp: room.target_temp,
                fan_speed: room.fan_speed.to_string(),
                fee_rate: self.engine.fee_rate(room.fan_speed),
                operation_type: op,
            }
        };
        let written = self
            .journal
            .create_record(seed)
            .and_then(|id| self.journal.update_cost(id, 0.0, Some(now)));
        if let Err(e) = written {
            warn!(room = room_id.0, error = %e, "journal event write failed");
        }
    }

    /// Close the room's open record, keeping its accrued segment cost
    fn close_record(&mut self, room_id: RoomId, now: &str) {
        if let Some(record_id) = self.open_records.remove(&room_id) {
            let cost = match self.journal.get(record_id) {
                Ok(Some(record)) => record.cost,
                Ok(None) => 0.0,
                Err(e) => {
                    warn!(room = room_id.0, error = %e, "journal read failed at close");
                    0.0
                }
            };
            if let Err(e) = self.journal.update_cost(record_id, cost, Some(now)) {
                warn!(room = room_id.0, error = %e, "journal record close failed");
            }
        }
    }

    /// Accrue one second's cost onto the open record
    fn add_cost_to_open_record(&mut self, room_id: RoomId, cost: f64) {
        self.bump_open_record(room_id, cost, false);
    }

    /// Apply a minute-alignment correction to the open record
    fn adjust_open_record(&mut self, room_id: RoomId, adjustment: f64) {
        self.bump_open_record(room_id, adjustment, true);
    }

    fn bump_open_record(&mut self, room_id: RoomId, delta: f64, align: bool) {
        let Some(&record_id) = self.open_records.get(&room_id) else {
            return;
        };
        let updated = self.journal.get(record_id).and_then(|record| {
            let current = record.map(|r| r.cost).unwrap_or(0.0);
            let mut cost = current + delta;
            if align {
                cost = round_to(cost, 2);
            }
            self.journal.update_cost(record_id, cost, None)
        });
        if let Err(e) = updated {
            warn!(room = room_id.0, error = %e, "journal cost update failed");
        }
    }

    // ---------- observation ----------

    pub fn room_status(&self, room_id: RoomId) -> RoomStatus {
        let (mode, target_temp, current_temp, fan_speed, state, cost) = {
            let rooms = self.rooms.read();
            let room = rooms.get(room_id);
            (
                room.mode,
                room.target_temp,
                round_to(room.current_temp, 2),
                room.fan_speed,
                room.state,
                round_to(room.cost, 2),
            )
        };
        RoomStatus {
            room_id,
            mode,
            target_temp,
            current_temp,
            fan_speed,
            state,
            cost,
            served_seconds: self.service_timer.read().get(room_id),
            waiting_seconds: self.wait_timer.read().get(room_id),
        }
    }

    pub fn all_room_statuses(&self) -> Vec<RoomStatus> {
        let ids = { self.rooms.read().ids() };
        ids.into_iter().map(|id| self.room_status(id)).collect()
    }

    /// Waiting-queue position query (1-based)
    pub fn queue_position(&self, room_id: RoomId) -> QueuePositionResponse {
        match self.waiting.position_of(room_id) {
            Some(position) => QueuePositionResponse::Waiting {
                state: "wait",
                list_number: position,
            },
            None => QueuePositionResponse::State {
                state: self.rooms.read().get(room_id).state,
            },
        }
    }

    /// Current and total fee for a room
    pub fn fees(&self, room_id: RoomId) -> FeesResponse {
        let total = self.room_total(room_id);
        FeesResponse {
            current_fee: total,
            total_fee: total,
        }
    }

    /// Totals plus the full journal listing for a room
    pub fn bill(&self, room_id: RoomId) -> RoomBill {
        let details = match self.journal.list_for_room(room_id.0) {
            Ok(records) => records,
            Err(e) => {
                warn!(room = room_id.0, error = %e, "journal listing failed");
                Vec::new()
            }
        };
        RoomBill {
            room_id,
            total_cost: self.room_total(room_id),
            details,
        }
    }

    pub fn serving_rooms(&self) -> Vec<RoomId> {
        self.served.members().to_vec()
    }

    pub fn waiting_rooms(&self) -> Vec<RoomId> {
        self.waiting.members().to_vec()
    }

    /// Rooms with an active service clock
    pub fn service_timed_rooms(&self) -> Vec<RoomId> {
        self.service_timer.read().rooms()
    }

    /// Rooms with an active wait clock
    pub fn wait_timed_rooms(&self) -> Vec<RoomId> {
        self.wait_timer.read().rooms()
    }

    /// Plant-wide cost total
    pub fn summary(&self) -> SummaryReport {
        let total = match self.journal.sum_all() {
            Ok(total) => total,
            Err(e) => {
                warn!(error = %e, "journal summary failed");
                0.0
            }
        };
        SummaryReport {
            total_cost: round_to(total, 2),
        }
    }

    /// Cost total over an inclusive start-time range
    pub fn summary_range(&self, start: Option<&str>, end: Option<&str>) -> SummaryReport {
        let total = match self.journal.sum_range(start, end) {
            Ok(total) => total,
            Err(e) => {
                warn!(error = %e, "journal range summary failed");
                0.0
            }
        };
        SummaryReport {
            total_cost: round_to(total, 2),
        }
    }

    /// Drop every journal record and forget open segments
    pub fn clear_records(&mut self) {
        if let Err(e) = self.journal.clear_all() {
            warn!(error = %e, "journal clear failed");
        }
        self.open_records.clear();
    }

    // ---------- helpers ----------

    fn admitted_response(&self, room_id: RoomId) -> PowerOnResponse {
        let (state, mode, target_temp) = {
            let rooms = self.rooms.read();
            let room = rooms.get(room_id);
            (room.state, room.mode, room.target_temp)
        };
        PowerOnResponse::Admitted {
            room_id,
            state,
            mode,
            target_temp,
            current_fee: 0.0,
            total_fee: self.room_total(room_id),
        }
    }

    fn room_total(&self, room_id: RoomId) -> f64 {
        match self.journal.sum_for_room(room_id.0) {
            Ok(total) => round_to(total, 2),
            Err(e) => {
                warn!(room = room_id.0, error = %e, "journal sum failed; using in-memory cost");
                let rooms = self.rooms.read();
                round_to(rooms.get(room_id).cost, 2)
            }
        }
    }

    fn state_snapshot(&self, ids: &[RoomId]) -> HashMap<RoomId, PowerState> {
        let rooms = self.rooms.read();
        ids.iter().map(|&id| (id, rooms.get(id).state)).collect()
    }

    fn now() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelac_journal::SledJournal;

    fn scheduler(served: usize, waiting: i64) -> Scheduler {
        let mut config = SystemConfig::default();
        config.served_capacity = served;
        config.waiting_capacity = waiting;
        let journal = Arc::new(SledJournal::temporary().unwrap());
        Scheduler::new(&config, journal)
    }

    #[test]
    fn power_on_with_free_slot_admits_at_defaults() {
        let mut scheduler = scheduler(3, 2);
        let response = scheduler.power_on(RoomId(1), 30.0, Mode::Cool);

        match response {
            PowerOnResponse::Admitted {
                state,
                mode,
                target_temp,
                current_fee,
                ..
            } => {
                assert_eq!(state, PowerState::Serving);
                assert_eq!(mode, Mode::Cool);
                assert_eq!(target_temp, 25.0);
                assert_eq!(current_fee, 0.0);
            }
            other => panic!("expected admission, got {:?}", other),
        }
        assert_eq!(scheduler.serving_rooms(), vec![RoomId(1)]);
        assert_eq!(scheduler.service_timed_rooms(), vec![RoomId(1)]);
    }

    #[test]
    fn power_on_twice_reports_current_state() {
        let mut scheduler = scheduler(3, 2);
        scheduler.power_on(RoomId(1), 30.0, Mode::Cool);
        let response = scheduler.power_on(RoomId(1), 30.0, Mode::Cool);
        match response {
            PowerOnResponse::State { state, .. } => assert_eq!(state, PowerState::Serving),
            other => panic!("expected state echo, got {:?}", other),
        }
    }

    #[test]
    fn speed_change_on_off_room_is_a_no_op() {
        let mut scheduler = scheduler(3, 2);
        let response = scheduler.change_speed(RoomId(1), FanSpeed::High);
        match response {
            ChangeResponse::State { state, .. } => assert_eq!(state, PowerState::Off),
            other => panic!("expected state echo, got {:?}", other),
        }
        // The fan speed must not have been touched.
        assert_eq!(scheduler.room_status(RoomId(1)).fan_speed, FanSpeed::Medium);
    }

    #[test]
    fn temperature_change_applies_while_waiting() {
        let mut scheduler = scheduler(1, 2);
        scheduler.power_on(RoomId(1), 30.0, Mode::Cool);
        scheduler.power_on(RoomId(2), 28.0, Mode::Cool); // queued

        let response = scheduler.change_temperature(RoomId(2), 22.5);
        assert!(matches!(response, ChangeResponse::Ok { .. }));
        assert_eq!(scheduler.room_status(RoomId(2)).target_temp, 22.5);
    }

    #[test]
    fn queue_position_is_one_based() {
        let mut scheduler = scheduler(1, 5);
        scheduler.power_on(RoomId(1), 30.0, Mode::Cool);
        scheduler.power_on(RoomId(2), 28.0, Mode::Cool);
        scheduler.power_on(RoomId(3), 28.0, Mode::Cool);

        match scheduler.queue_position(RoomId(2)) {
            QueuePositionResponse::Waiting { state, list_number } => {
                assert_eq!(state, "wait");
                assert_eq!(list_number, 1);
            }
            other => panic!("expected waiting position, got {:?}", other),
        }
        match scheduler.queue_position(RoomId(1)) {
            QueuePositionResponse::State { state } => assert_eq!(state, PowerState::Serving),
            other => panic!("expected state echo, got {:?}", other),
        }
    }

    #[test]
    fn power_off_closes_the_open_record() {
        let mut scheduler = scheduler(3, 2);
        scheduler.power_on(RoomId(1), 30.0, Mode::Cool);
        scheduler.tick(5);
        let response = scheduler.power_off(RoomId(1));
        assert_eq!(response.state, PowerState::Off);

        let bill = scheduler.bill(RoomId(1));
        assert!(!bill.details.is_empty());
        assert!(bill.details.iter().all(|r| r.end_time.is_some()));
        assert!(scheduler.serving_rooms().is_empty());
        assert!(scheduler.service_timed_rooms().is_empty());
    }

    #[test]
    fn mid_service_speed_change_reopens_the_segment() {
        let mut scheduler = scheduler(3, 2);
        scheduler.power_on(RoomId(1), 30.0, Mode::Cool);
        scheduler.tick(10);
        scheduler.change_speed(RoomId(1), FanSpeed::High);
        scheduler.tick(10);

        let details = scheduler.bill(RoomId(1)).details;
        let ops: Vec<&str> = details.iter().map(|r| r.operation_type.as_str()).collect();
        assert!(ops.contains(&"POWER_ON"));
        assert!(ops.contains(&"SPEED_CHANGE"));
        assert!(ops.contains(&"SPEED_ADJUST_PRIORITY"));

        // Exactly one record is still open: the SPEED_CHANGE segment.
        let open: Vec<_> = details.iter().filter(|r| r.end_time.is_none()).collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].operation_type, "SPEED_CHANGE");
        assert_eq!(open[0].fan_speed, "HIGH");
    }
}
