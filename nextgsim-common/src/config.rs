//! Configuration for the UE RRC task
//!
//! The RRC task reads its supervision timers and queue limits from a
//! `UeRrcConfig`, normally loaded from the `rrc:` section of a UE YAML file.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Default T300 (RRC establishment supervision) in milliseconds.
pub const DEFAULT_T300_MS: u64 = 1000;

/// T300 values allowed by 3GPP TS 38.331 `UE-TimersAndConstants`.
pub const T300_VALUES_MS: [u64; 8] = [100, 200, 300, 400, 600, 1000, 1500, 2000];

/// Default interval at which the RRC task checks its timers.
pub const DEFAULT_TIMER_RESOLUTION_MS: u64 = 50;

/// Default number of uplink NAS PDUs buffered while a connection is being set up.
pub const DEFAULT_MAX_PENDING_UPLINK: usize = 16;

/// UE RRC configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UeRrcConfig {
    /// T300 duration in milliseconds
    pub t300_ms: u64,
    /// Resolution of the RRC timer tick in milliseconds
    pub timer_resolution_ms: u64,
    /// Maximum uplink NAS PDUs held while in RRC Connecting
    pub max_pending_uplink: usize,
    /// Log level for the UE process
    pub log_level: LogLevel,
}

impl Default for UeRrcConfig {
    fn default() -> Self {
        Self {
            t300_ms: DEFAULT_T300_MS,
            timer_resolution_ms: DEFAULT_TIMER_RESOLUTION_MS,
            max_pending_uplink: DEFAULT_MAX_PENDING_UPLINK,
            log_level: LogLevel::default(),
        }
    }
}
