//! Priority queues of room ids
//!
//! Both scheduler queues share this structure: a bounded (or unbounded)
//! ordered sequence with unique membership, kept sorted by a priority
//! callback injected once at construction. The callback maps a room id
//! to its ordering key — fan speed first, then seconds in the matching
//! timer — and the queue re-sorts on push, promote, or an explicit
//! `resort` whenever an ordering input changed elsewhere.

use std::cmp::Reverse;

use crate::room::RoomId;

/// Ordering key: higher fan speed first, longer time first on ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    pub speed: u8,
    pub seconds: u64,
}

/// Priority callback set once after construction
pub type PriorityFn = Box<dyn Fn(RoomId) -> PriorityKey + Send + Sync>;

/// Comparator-ordered queue of room ids
pub struct RoomQueue {
    capacity: Option<usize>,
    rooms: Vec<RoomId>,
    priority: PriorityFn,
}

impl RoomQueue {
    /// Queue bounded to `capacity` members
    pub fn bounded(capacity: usize, priority: PriorityFn) -> Self {
        Self {
            capacity: Some(capacity),
            rooms: Vec::new(),
            priority,
        }
    }

    /// Queue with `capacity` members, or unbounded when `None`
    pub fn with_capacity(capacity: Option<usize>, priority: PriorityFn) -> Self {
        Self {
            capacity,
            rooms: Vec::new(),
            priority,
        }
    }

    pub fn has_slot(&self) -> bool {
        self.capacity.map_or(true, |cap| self.rooms.len() < cap)
    }

    pub fn is_full(&self) -> bool {
        !self.has_slot()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Insert a room; no-op when already present or the queue is full
    pub fn push(&mut self, room_id: RoomId) {
        if self.contains(room_id) || !self.has_slot() {
            return;
        }
        self.rooms.push(room_id);
        self.resort();
    }

    /// Remove a room; returns whether it was present
    ///
    /// Removal preserves the relative order of the rest, so no re-sort.
    pub fn pop(&mut self, room_id: RoomId) -> bool {
        match self.rooms.iter().position(|&id| id == room_id) {
            Some(index) => {
                self.rooms.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, room_id: RoomId) -> bool {
        self.rooms.contains(&room_id)
    }

    /// 1-based position, `None` if absent
    pub fn position_of(&self, room_id: RoomId) -> Option<usize> {
        self.rooms.iter().position(|&id| id == room_id).map(|i| i + 1)
    }

    /// Members in priority order, highest first
    pub fn members(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Highest-priority member
    pub fn front(&self) -> Option<RoomId> {
        self.rooms.first().copied()
    }

    /// Lowest-priority member (eviction candidate)
    pub fn back(&self) -> Option<RoomId> {
        self.rooms.last().copied()
    }

    /// Move a room to the front, then restore priority order
    pub fn promote(&mut self, room_id: RoomId) {
        if self.pop(room_id) {
            self.rooms.insert(0, room_id);
            self.resort();
        }
    }

    /// Re-sort after an ordering key changed (fan speed, timer reset)
    ///
    /// The sort is stable: rooms with identical keys keep their order.
    pub fn resort(&mut self) {
        let priority = &self.priority;
        self.rooms.sort_by_key(|&id| Reverse(priority(id)));
    }

    /// Evaluate the priority callback for a room
    pub fn key_of(&self, room_id: RoomId) -> PriorityKey {
        (self.priority)(room_id)
    }
}

impl std::fmt::Debug for RoomQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomQueue")
            .field("capacity", &self.capacity)
            .field("rooms", &self.rooms)
            .finish()
    }
}
