//! Configuration schema and types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcConfig {
    #[serde(default)]
    pub system: SystemConfig,
}

/// Scheduler and plant sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Number of rooms managed by the plant
    #[serde(default = "default_room_count")]
    pub room_count: u32,
    /// Serving-queue capacity (simultaneously treated rooms)
    #[serde(default = "default_served_capacity")]
    pub served_capacity: usize,
    /// Waiting-queue capacity; -1 means unbounded
    #[serde(default = "default_waiting_capacity")]
    pub waiting_capacity: i64,
    /// Wait threshold for same-speed rotation, in seconds
    #[serde(default = "default_time_slice_seconds")]
    pub time_slice_seconds: u64,
    /// Target temperature applied at power-on, both modes
    #[serde(default = "default_target_temp")]
    pub default_target_temp: f64,
    /// Initial temperature for rooms absent from `initial_temps`
    #[serde(default = "default_initial_temp")]
    pub default_initial_temp: f64,
    /// Per-room initial temperatures, keyed by room id
    #[serde(default = "default_initial_temps")]
    pub initial_temps: BTreeMap<String, f64>,
    /// Directory of the sled journal database
    #[serde(default = "default_journal_path")]
    pub journal_path: String,
}

fn default_room_count() -> u32 {
    5
}

fn default_served_capacity() -> usize {
    3
}

fn default_waiting_capacity() -> i64 {
    2
}

fn default_time_slice_seconds() -> u64 {
    30
}

fn default_target_temp() -> f64 {
    25.0
}

fn default_initial_temp() -> f64 {
    25.0
}

fn default_initial_temps() -> BTreeMap<String, f64> {
    // Building survey of the five-room reference deployment.
    [(1, 32.0), (2, 28.0), (3, 30.0), (4, 29.0), (5, 35.0)]
        .into_iter()
        .map(|(room, temp)| (room.to_string(), temp))
        .collect()
}

fn default_journal_path() -> String {
    "hotel_ac_journal".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            room_count: default_room_count(),
            served_capacity: default_served_capacity(),
            waiting_capacity: default_waiting_capacity(),
            time_slice_seconds: default_time_slice_seconds(),
            default_target_temp: default_target_temp(),
            default_initial_temp: default_initial_temp(),
            initial_temps: default_initial_temps(),
            journal_path: default_journal_path(),
        }
    }
}

impl SystemConfig {
    /// Initial temperature for a room, falling back to the default
    pub fn initial_temp_for(&self, room_id: u32) -> f64 {
        self.initial_temps
            .get(&room_id.to_string())
            .copied()
            .unwrap_or(self.default_initial_temp)
    }

    /// Waiting-queue bound; `None` when configured unbounded (-1)
    pub fn waiting_capacity_limit(&self) -> Option<usize> {
        if self.waiting_capacity < 0 {
            None
        } else {
            Some(self.waiting_capacity as usize)
        }
    }
}

/// Reject configurations the scheduler cannot run with
pub fn validate_config(config: &AcConfig) -> Result<(), ConfigError> {
    let system = &config.system;
    if system.room_count == 0 {
        return Err(ConfigError::Validation("room_count must be > 0".to_string()));
    }
    if system.served_capacity == 0 {
        return Err(ConfigError::Validation(
            "served_capacity must be > 0".to_string(),
        ));
    }
    if system.waiting_capacity < -1 {
        return Err(ConfigError::Validation(
            "waiting_capacity must be >= 0, or -1 for unbounded".to_string(),
        ));
    }
    if system.time_slice_seconds == 0 {
        return Err(ConfigError::Validation(
            "time_slice_seconds must be > 0".to_string(),
        ));
    }
    if !(-50.0..=60.0).contains(&system.default_target_temp) {
        return Err(ConfigError::Validation(format!(
            "default_target_temp {} out of range",
            system.default_target_temp
        )));
    }
    Ok(())
}
