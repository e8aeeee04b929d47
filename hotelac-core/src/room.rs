//! Rooms and the room store
//!
//! The store is a typed map; it enforces nothing. All mutation goes
//! through the scheduler and the thermal engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use hotelac_config::SystemConfig;

/// Unique identifier for a room
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operating mode, fixing the direction of serviced temperature change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cool,
    Heat,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Cool => write!(f, "cool"),
            Mode::Heat => write!(f, "heat"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cool" => Ok(Mode::Cool),
            "heat" => Ok(Mode::Heat),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Fan speed; doubles as the scheduling priority level
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum FanSpeed {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl FanSpeed {
    /// Numeric priority: high wind beats medium beats low
    pub fn priority(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanSpeed::Low => write!(f, "LOW"),
            FanSpeed::Medium => write!(f, "MEDIUM"),
            FanSpeed::High => write!(f, "HIGH"),
        }
    }
}

impl std::str::FromStr for FanSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(FanSpeed::Low),
            "MEDIUM" => Ok(FanSpeed::Medium),
            "HIGH" => Ok(FanSpeed::High),
            other => Err(format!("unknown fan speed: {}", other)),
        }
    }
}

/// Power state of a room
///
/// A room sits in the serving queue iff `Serving`, in the waiting queue
/// iff `Waiting`, and in neither queue when `Off` or `Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    Off,
    Waiting,
    Serving,
    Paused,
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerState::Off => write!(f, "off"),
            PowerState::Waiting => write!(f, "waiting"),
            PowerState::Serving => write!(f, "serving"),
            PowerState::Paused => write!(f, "paused"),
        }
    }
}

/// Authoritative per-room record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    /// Temperature the room relaxes back to while off
    pub initial_temp: f64,
    pub current_temp: f64,
    pub mode: Mode,
    pub target_temp: f64,
    pub fan_speed: FanSpeed,
    pub state: PowerState,
    /// Accumulated charge, in monetary units
    pub cost: f64,
}

impl Room {
    pub fn new(room_id: RoomId, initial_temp: f64, default_target: f64) -> Self {
        Self {
            room_id,
            initial_temp,
            current_temp: initial_temp,
            mode: Mode::Cool,
            target_temp: default_target,
            fan_speed: FanSpeed::Medium,
            state: PowerState::Off,
            cost: 0.0,
        }
    }
}

/// Typed map of rooms, created once at system init
#[derive(Debug)]
pub struct RoomStore {
    rooms: BTreeMap<RoomId, Room>,
}

impl RoomStore {
    /// Build the store from configuration, one room per id `1..=room_count`
    pub fn from_config(config: &SystemConfig) -> Self {
        let rooms = (1..=config.room_count)
            .map(|id| {
                let room_id = RoomId(id);
                (
                    room_id,
                    Room::new(
                        room_id,
                        config.initial_temp_for(id),
                        config.default_target_temp,
                    ),
                )
            })
            .collect();
        Self { rooms }
    }

    /// Look up a room; an unknown id is a programmer error
    pub fn get(&self, room_id: RoomId) -> &Room {
        self.rooms
            .get(&room_id)
            .unwrap_or_else(|| panic!("unknown room id {}", room_id))
    }

    /// Mutable lookup; an unknown id is a programmer error
    pub fn get_mut(&mut self, room_id: RoomId) -> &mut Room {
        self.rooms
            .get_mut(&room_id)
            .unwrap_or_else(|| panic!("unknown room id {}", room_id))
    }

    pub fn contains(&self, room_id: RoomId) -> bool {
        self.rooms.contains_key(&room_id)
    }

    /// All rooms, id ascending
    pub fn all(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// All room ids, ascending
    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
