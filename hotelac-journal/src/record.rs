//! Detail-record schema
//!
//! One record per service segment or operation event. Timestamps are
//! local-time `%Y-%m-%d %H:%M:%S` strings so that lexical order equals
//! chronological order.

use serde::{Deserialize, Serialize};

/// Unique identifier of a detail record
pub type RecordId = u64;

/// Kind of scheduler operation that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Room admitted to service directly at power-on
    PowerOn,
    /// Segment reopened after a mid-service fan speed change
    SpeedChange,
    /// Target temperature changed (zero-duration event)
    TempChange,
    /// Admission by preempting a lower-fan-speed serving room
    PriorityReplace,
    /// Admission by refilling a freed serving slot from the waiting queue
    QueueFill,
    /// Fan speed raised while serving (zero-duration event)
    SpeedAdjustPriority,
    /// Admission by time-slice rotation
    ServingResume,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            OperationType::PowerOn => "POWER_ON",
            OperationType::SpeedChange => "SPEED_CHANGE",
            OperationType::TempChange => "TEMP_CHANGE",
            OperationType::PriorityReplace => "PRIORITY_REPLACE",
            OperationType::QueueFill => "QUEUE_FILL",
            OperationType::SpeedAdjustPriority => "SPEED_ADJUST_PRIORITY",
            OperationType::ServingResume => "SERVING_RESUME",
        };
        write!(f, "{}", tag)
    }
}

/// Persisted detail record
///
/// `cost` is the charge for this segment alone; `accumulated_cost` is the
/// per-room running total up through this segment, maintained by the
/// journal writer on every cost write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Record id (monotonically increasing)
    pub id: RecordId,
    /// Room the segment belongs to
    pub room_id: u32,
    /// When the user action that led to this segment arrived
    pub request_time: String,
    /// When service for this segment began
    pub start_time: String,
    /// When service for this segment ended; `None` while the segment is open
    pub end_time: Option<String>,
    /// Operating mode ("cool" | "heat")
    pub mode: String,
    /// Target temperature at segment start
    pub target_temp: f64,
    /// Fan speed name ("LOW" | "MEDIUM" | "HIGH")
    pub fan_speed: String,
    /// Fee rate in monetary units per degree
    pub fee_rate: f64,
    /// Seconds between start and end time; 0 while open
    pub service_duration: i64,
    /// Charge for this segment
    pub cost: f64,
    /// Running per-room total up through this segment
    pub accumulated_cost: f64,
    /// Operation tag ("POWER_ON", "QUEUE_FILL", ...)
    pub operation_type: String,
}

/// Fields the scheduler supplies when opening a record
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub room_id: u32,
    pub request_time: String,
    pub mode: String,
    pub target_temp: f64,
    pub fan_speed: String,
    pub fee_rate: f64,
    pub operation_type: OperationType,
}
