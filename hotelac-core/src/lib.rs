//! Scheduling core for a hotel central air-conditioning plant
//!
//! A fixed set of rooms shares a limited number of serving slots. This
//! crate provides:
//! - The two-queue priority/time-slice scheduler
//! - The per-second thermal and billing engine
//! - The system facade that serializes user actions, ticks, and reads
//!
//! Persistence lives in `hotelac-journal`; the scheduler only consumes
//! its narrow `Journal` interface. The HTTP request layer is external:
//! it parses mode/speed names into the tagged variants defined here and
//! serializes the typed responses from [`api`].

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod api;
pub mod engine;
pub mod queue;
pub mod room;
pub mod scheduler;
pub mod system;
pub mod timer;

pub use api::{
    ChangeResponse, FeesResponse, PowerOffResponse, PowerOnResponse, QueuePositionResponse,
    RoomBill, RoomStatus, SummaryReport,
};
pub use engine::ThermalEngine;
pub use queue::{PriorityKey, RoomQueue};
pub use room::{FanSpeed, Mode, PowerState, Room, RoomId, RoomStore};
pub use scheduler::Scheduler;
pub use system::AcSystem;
pub use timer::SecondsTimer;
