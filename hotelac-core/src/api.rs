//! Consumer-facing response shapes
//!
//! Every scheduler operation returns one of these JSON-shaped values.
//! The request layer serializes them as-is; mode and fan-speed names are
//! parsed into tagged variants before they reach the core, never after.

use serde::Serialize;

use hotelac_journal::DetailRecord;

use crate::room::{FanSpeed, Mode, PowerState, RoomId};

/// Outcome of `powerOn`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PowerOnResponse {
    /// The room was admitted to a serving slot
    Admitted {
        room_id: RoomId,
        state: PowerState,
        mode: Mode,
        target_temp: f64,
        current_fee: f64,
        total_fee: f64,
    },
    /// The room was queued, or the request did not apply
    State { room_id: RoomId, state: PowerState },
}

/// Outcome of `changeSpeed` / `changeTemperature`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChangeResponse {
    Ok { ok: &'static str },
    State { room_id: RoomId, state: PowerState },
}

impl ChangeResponse {
    pub fn ok() -> Self {
        ChangeResponse::Ok { ok: "SOk" }
    }
}

/// Outcome of `powerOff`
#[derive(Debug, Clone, Serialize)]
pub struct PowerOffResponse {
    pub room_id: RoomId,
    pub state: PowerState,
    pub current_fee: f64,
    pub total_fee: f64,
}

/// Waiting-queue position query
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueuePositionResponse {
    /// 1-based position in the waiting queue
    Waiting {
        state: &'static str,
        list_number: usize,
    },
    State { state: PowerState },
}

/// Fee totals query
#[derive(Debug, Clone, Serialize)]
pub struct FeesResponse {
    pub current_fee: f64,
    pub total_fee: f64,
}

/// Room status snapshot
#[derive(Debug, Clone, Serialize)]
pub struct RoomStatus {
    pub room_id: RoomId,
    pub mode: Mode,
    pub target_temp: f64,
    /// Rounded to two decimals for display
    pub current_temp: f64,
    pub fan_speed: FanSpeed,
    pub state: PowerState,
    /// Rounded to two decimals for display
    pub cost: f64,
    pub served_seconds: u64,
    pub waiting_seconds: u64,
}

/// Per-room bill: totals plus the full journal listing
#[derive(Debug, Clone, Serialize)]
pub struct RoomBill {
    pub room_id: RoomId,
    pub total_cost: f64,
    pub details: Vec<DetailRecord>,
}

/// Plant-wide cost total
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub total_cost: f64,
}
