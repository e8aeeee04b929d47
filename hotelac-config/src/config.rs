//! Configuration loading and management

use std::path::Path;

use crate::env::apply_env_overrides;
use crate::schema::{validate_config, AcConfig, ConfigError};

/// Load configuration from an optional file plus environment overrides
///
/// Loading hierarchy: env > file > defaults. A missing file is not an
/// error; the defaults describe the five-room reference deployment.
pub fn load_config(path: Option<&Path>) -> Result<AcConfig, ConfigError> {
    let mut config = match path {
        Some(file) if file.exists() => load_from_file(file)?,
        Some(file) => {
            return Err(ConfigError::Io(format!(
                "config file not found: {}",
                file.display()
            )))
        }
        None => {
            let default_file = Path::new("hotelac.toml");
            if default_file.exists() {
                load_from_file(default_file)?
            } else {
                AcConfig::default()
            }
        }
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<AcConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}
