//! Per-room second counters
//!
//! Two independent instances exist: one for time-in-service, one for
//! time-in-wait. An entry exists only while the room is in the matching
//! queue; removing the entry means the room left that queue.

use std::collections::HashMap;

use crate::room::RoomId;

/// Monotonic per-room second counter
#[derive(Debug, Default)]
pub struct SecondsTimer {
    seconds: HashMap<RoomId, u64>,
}

impl SecondsTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or zero) the entry for a room
    pub fn reset(&mut self, room_id: RoomId) {
        self.seconds.insert(room_id, 0);
    }

    /// Drop the entry; the room is no longer counted
    pub fn remove(&mut self, room_id: RoomId) {
        self.seconds.remove(&room_id);
    }

    /// Advance every entry by `delta` seconds
    pub fn tick(&mut self, delta: u64) {
        for value in self.seconds.values_mut() {
            *value += delta;
        }
    }

    /// Seconds counted for a room; 0 when no entry exists
    pub fn get(&self, room_id: RoomId) -> u64 {
        self.seconds.get(&room_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, room_id: RoomId) -> bool {
        self.seconds.contains_key(&room_id)
    }

    /// Rooms that currently have an entry
    pub fn rooms(&self) -> Vec<RoomId> {
        self.seconds.keys().copied().collect()
    }
}
