//! Integration test framework for the nextgsim UE RRC task
#![allow(missing_docs)]
//!
//! This crate provides test utilities and a harness for running the RRC task
//! against simulated NAS, RLS and cell search peers.
//!
//! # Components
//!
//! - [`rrc_harness`] - Runs a real RRC task and plays its peers
//! - [`test_fixtures`] - Configurations, NAS payloads and gNB PDUs
//! - [`test_utils`] - Utility functions for test setup and assertions
//!
//! # Test Categories
//!
//! 1. **Connection Tests** - Establishment, rejection, T300 expiry, release
//! 2. **Routing Tests** - Pass-through between NAS and cell search
//! 3. **Robustness Tests** - Malformed PDUs, foreign messages, shutdown

pub mod rrc_harness;
pub mod test_fixtures;

pub use rrc_harness::{HarnessError, PeerOutputs, RrcHarness, UplinkRrc};
pub use test_fixtures::TestRrcConfig;
pub use test_utils::{
    init_test_logging, init_test_logging_at, recv_within, wait_for_condition, TestResult,
    DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT, QUIET_PERIOD,
};
