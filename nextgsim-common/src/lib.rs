//! Common types and utilities for the nextgsim UE RRC stack
//!
//! This crate provides shared types, configuration structures, and logging
//! utilities used by the RRC codec and the UE RRC task crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod octet_string;
pub mod types;

pub use config::{UeRrcConfig, DEFAULT_T300_MS, T300_VALUES_MS};
pub use error::Error;
pub use logging::{
    init_logging, init_logging_with_filter, log_protocol_message,
    log_rrc_message, Direction, HexDump, LogLevel,
};
pub use octet_string::OctetString;
pub use types::{Plmn, Tai};
