//! Environment variable override support
//!
//! Format: `HOTELAC_<KEY>` where `<KEY>` is an upper-cased `[system]`
//! field name. Examples:
//!   HOTELAC_ROOM_COUNT=8
//!   HOTELAC_TIME_SLICE_SECONDS=120
//!   HOTELAC_JOURNAL_PATH=/var/lib/hotelac/journal

use std::env;

use crate::schema::{AcConfig, ConfigError};

/// Merge `HOTELAC_*` environment variables into the configuration
pub fn apply_env_overrides(config: &mut AcConfig) -> Result<(), ConfigError> {
    if let Ok(value) = env::var("HOTELAC_ROOM_COUNT") {
        config.system.room_count = parse(&value, "HOTELAC_ROOM_COUNT")?;
    }
    if let Ok(value) = env::var("HOTELAC_SERVED_CAPACITY") {
        config.system.served_capacity = parse(&value, "HOTELAC_SERVED_CAPACITY")?;
    }
    if let Ok(value) = env::var("HOTELAC_WAITING_CAPACITY") {
        config.system.waiting_capacity = parse(&value, "HOTELAC_WAITING_CAPACITY")?;
    }
    if let Ok(value) = env::var("HOTELAC_TIME_SLICE_SECONDS") {
        config.system.time_slice_seconds = parse(&value, "HOTELAC_TIME_SLICE_SECONDS")?;
    }
    if let Ok(value) = env::var("HOTELAC_DEFAULT_TARGET_TEMP") {
        config.system.default_target_temp = parse(&value, "HOTELAC_DEFAULT_TARGET_TEMP")?;
    }
    if let Ok(value) = env::var("HOTELAC_DEFAULT_INITIAL_TEMP") {
        config.system.default_initial_temp = parse(&value, "HOTELAC_DEFAULT_INITIAL_TEMP")?;
    }
    if let Ok(value) = env::var("HOTELAC_JOURNAL_PATH") {
        config.system.journal_path = value;
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("Invalid {}: {}", key, value)))
}
