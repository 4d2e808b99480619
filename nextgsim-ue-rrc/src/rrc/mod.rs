//! RRC (Radio Resource Control) Module for UE
//!
//! - RRC state machine (Idle, Connecting, Connected)
//! - T300 establishment supervision
//! - The RRC task routing NAS, RLS and cell search traffic
//!
//! # RRC State Machine (3GPP TS 38.331)
//!
//! ```text
//!              ┌──────────┐
//!    ┌────────►│   Idle   │◄─────────────────┐
//!    │         └────┬─────┘                  │
//!    │              │ RRCSetupRequest        │
//!    │              ▼                        │
//!    │         ┌──────────┐  RRCReject/T300  │
//!    │         │Connecting│──────────────────┤
//!    │         └────┬─────┘                  │
//!    │              │ RRCSetup               │
//!    │              ▼                        │
//!    │         ┌──────────┐                  │
//!    └─────────│Connected │──────────────────┘
//!  RRCRelease  └──────────┘  RLF / local release
//! ```
//!
//! # Reference
//!
//! - 3GPP TS 38.331 §5.3.3: RRC connection establishment
//! - 3GPP TS 38.331 §5.3.8: RRC connection release

pub mod state;
pub mod task;
pub mod timer;

pub use state::{RrcState, RrcStateError, RrcStateMachine, RrcStateTransition};
pub use task::RrcTask;
pub use timer::{RrcTimer, TIMER_T300};
