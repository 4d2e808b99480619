//! Configuration Loading for the UE RRC task
//!
//! Reads the `rrc:` section of a UE YAML file into a `UeRrcConfig` and
//! checks it. Other sections of the file are ignored; a missing `rrc:` section
//! yields the defaults.
//!
//! ```yaml
//! rrc:
//!   t300_ms: 1000
//!   timer_resolution_ms: 50
//!   max_pending_uplink: 16
//!   log_level: info
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use nextgsim_common::config::UeRrcConfig;
use nextgsim_common::T300_VALUES_MS;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] nextgsim_common::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// T300 not one of the values of `UE-TimersAndConstants`
    #[error("Invalid T300: {0}ms is not one of {:?}", T300_VALUES_MS)]
    InvalidT300(u64),

    /// Timer tick of zero or coarser than T300
    #[error("Invalid timer resolution: {resolution_ms}ms (must be 1..={t300_ms}ms)")]
    InvalidTimerResolution { resolution_ms: u64, t300_ms: u64 },

    /// Pending uplink queue with no room
    #[error("Invalid max_pending_uplink: must be at least 1")]
    InvalidQueueLimit,
}

#[derive(Debug, Deserialize)]
struct UeConfigFile {
    #[serde(default)]
    rrc: UeRrcConfig,
}

/// Loads and validates the RRC configuration from a UE YAML file.
///
/// ```rust,ignore
/// use nextgsim_ue_rrc::load_rrc_config;
///
/// let config = load_rrc_config("config/ue.yaml")?;
/// println!("T300 = {}ms", config.t300_ms);
/// ```
pub fn load_rrc_config<P: AsRef<Path>>(path: P) -> Result<UeRrcConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_rrc_config_from_str(&contents)
}

/// Loads and validates the RRC configuration from a YAML string.
pub fn load_rrc_config_from_str(yaml: &str) -> Result<UeRrcConfig, ConfigError> {
    let file: UeConfigFile = serde_yaml::from_str(yaml).map_err(nextgsim_common::Error::from)?;
    validate_rrc_config(&file.rrc)?;
    Ok(file.rrc)
}

/// Validates an RRC configuration.
///
/// # Validation Rules
///
/// - `t300_ms` must be one of 100, 200, 300, 400, 600, 1000, 1500, 2000
/// - `timer_resolution_ms` must be non-zero and not larger than T300
/// - `max_pending_uplink` must be at least 1
pub fn validate_rrc_config(config: &UeRrcConfig) -> Result<(), ConfigValidationError> {
    if !T300_VALUES_MS.contains(&config.t300_ms) {
        return Err(ConfigValidationError::InvalidT300(config.t300_ms));
    }

    if config.timer_resolution_ms == 0 || config.timer_resolution_ms > config.t300_ms {
        return Err(ConfigValidationError::InvalidTimerResolution {
            resolution_ms: config.timer_resolution_ms,
            t300_ms: config.t300_ms,
        });
    }

    if config.max_pending_uplink == 0 {
        return Err(ConfigValidationError::InvalidQueueLimit);
    }

    Ok(())
}
