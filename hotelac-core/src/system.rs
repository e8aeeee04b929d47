//! System facade
//!
//! One `AcSystem` owns the whole plant. Every entry point — user
//! actions, the tick, and snapshot reads — serializes through a single
//! mutex, so exactly one caller mutates scheduler state at a time and
//! readers always see a consistent view. The request layer receives this
//! object explicitly; there is no process-global handle.

use std::sync::Arc;

use parking_lot::Mutex;

use hotelac_config::SystemConfig;
use hotelac_journal::Journal;

use crate::api::{
    ChangeResponse, FeesResponse, PowerOffResponse, PowerOnResponse, QueuePositionResponse,
    RoomBill, RoomStatus, SummaryReport,
};
use crate::room::{FanSpeed, Mode, RoomId};
use crate::scheduler::Scheduler;

/// The central air-conditioning system
pub struct AcSystem {
    scheduler: Mutex<Scheduler>,
}

impl AcSystem {
    pub fn new(config: &SystemConfig, journal: Arc<dyn Journal>) -> Self {
        Self {
            scheduler: Mutex::new(Scheduler::new(config, journal)),
        }
    }

    // ---------- user actions ----------

    pub fn power_on(&self, room_id: RoomId, current_temp: f64, mode: Mode) -> PowerOnResponse {
        self.scheduler.lock().power_on(room_id, current_temp, mode)
    }

    pub fn change_speed(&self, room_id: RoomId, new_speed: FanSpeed) -> ChangeResponse {
        self.scheduler.lock().change_speed(room_id, new_speed)
    }

    pub fn change_temperature(&self, room_id: RoomId, new_target: f64) -> ChangeResponse {
        self.scheduler.lock().change_temperature(room_id, new_target)
    }

    pub fn power_off(&self, room_id: RoomId) -> PowerOffResponse {
        self.scheduler.lock().power_off(room_id)
    }

    /// Advance simulated time; callers schedule this externally
    pub fn tick(&self, delta_seconds: u64) {
        self.scheduler.lock().tick(delta_seconds)
    }

    // ---------- observation ----------

    pub fn room_status(&self, room_id: RoomId) -> RoomStatus {
        self.scheduler.lock().room_status(room_id)
    }

    pub fn all_room_statuses(&self) -> Vec<RoomStatus> {
        self.scheduler.lock().all_room_statuses()
    }

    pub fn queue_position(&self, room_id: RoomId) -> QueuePositionResponse {
        self.scheduler.lock().queue_position(room_id)
    }

    pub fn fees(&self, room_id: RoomId) -> FeesResponse {
        self.scheduler.lock().fees(room_id)
    }

    pub fn bill(&self, room_id: RoomId) -> RoomBill {
        self.scheduler.lock().bill(room_id)
    }

    pub fn serving_rooms(&self) -> Vec<RoomId> {
        self.scheduler.lock().serving_rooms()
    }

    pub fn waiting_rooms(&self) -> Vec<RoomId> {
        self.scheduler.lock().waiting_rooms()
    }

    /// Rooms with an active service clock
    pub fn service_timed_rooms(&self) -> Vec<RoomId> {
        self.scheduler.lock().service_timed_rooms()
    }

    /// Rooms with an active wait clock
    pub fn wait_timed_rooms(&self) -> Vec<RoomId> {
        self.scheduler.lock().wait_timed_rooms()
    }

    pub fn summary(&self) -> SummaryReport {
        self.scheduler.lock().summary()
    }

    pub fn summary_range(&self, start: Option<&str>, end: Option<&str>) -> SummaryReport {
        self.scheduler.lock().summary_range(start, end)
    }

    pub fn clear_records(&self) {
        self.scheduler.lock().clear_records()
    }
}
