//! Detail-record journal for the hotel central AC scheduler
//!
//! This crate provides the persistent billing journal the scheduler core
//! writes to:
//! - One `DetailRecord` per service segment or operation event
//! - A narrow `Journal` trait consumed by the scheduler
//! - A sled-backed implementation that survives process restart
//!
//! The journal is append-mostly: records are created when a room is
//! admitted to service (or an operation event is logged), updated with
//! cost while the segment is open, and closed with an end time when the
//! room leaves service.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod record;
pub mod store;

pub use error::{JournalError, JournalResult};
pub use record::{DetailRecord, NewRecord, OperationType, RecordId};
pub use store::{Journal, SledJournal};
