//! Configuration management for the hotel central AC scheduler
//!
//! Loading hierarchy: environment > file > defaults. The file is TOML;
//! environment overrides use the `HOTELAC_` prefix.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod env;
pub mod schema;

pub use config::{load_config, load_from_file};
pub use schema::{AcConfig, ConfigError, SystemConfig};
