//! nextgsim UE RRC Library
//!
//! The RRC task of the nextgsim UE and the task framework it runs in:
//!
//! - Task framework for async message passing between NAS, RRC, RLS and
//!   cell search
//! - RRC state machine with T300-supervised connection establishment
//! - Routing of NAS PDUs into RRC containers and back
//! - Configuration loading for the RRC task

pub mod config_loader;
pub mod rrc;
pub mod tasks;

// Re-export RRC types
pub use rrc::{RrcState, RrcStateError, RrcStateMachine, RrcStateTransition, RrcTask, RrcTimer};

// Re-export task types
pub use tasks::{
    task_channel, ActiveCellInfo, CellCategory, CellMeasurement, CellSearchMessage,
    CellSearchToRrc, NasMessage, NasToRrc, RlfCause, RlsMessage, RlsReleaseCause, RlsToRrc,
    RrcMessage, Task, TaskHandle, TaskId, TaskMessage, TaskReceiver, UeTaskBase,
    UplinkRejectReason,
};

// Re-export config loading
pub use config_loader::{
    load_rrc_config, load_rrc_config_from_str, validate_rrc_config, ConfigError,
    ConfigValidationError,
};
