//! RRC State Machine
//!
//! UE RRC connection states as seen by the RRC task (3GPP TS 38.331 §4.2.1),
//! with the establishment procedure modelled as its own state.
//!
//! # State Transitions
//!
//! | From State | Transition | To State |
//! |------------|------------|----------|
//! | Idle | EstablishmentRequest | Connecting |
//! | Connecting | SetupComplete | Connected |
//! | Connecting | EstablishmentFailure | Idle |
//! | Connected | Release | Idle |
//! | Connecting, Connected | RadioLinkFailure | Idle |
//! | any | LocalRelease | Idle |

use std::fmt;

use thiserror::Error;

/// RRC state of the UE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum RrcState {
    /// RRC_IDLE: no RRC connection.
    #[default]
    Idle,

    /// RRCSetupRequest sent, waiting for RRCSetup under T300.
    Connecting,

    /// RRC_CONNECTED: signalling connection established, NAS can be carried.
    Connected,
}

impl RrcState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RrcState::Idle)
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, RrcState::Connecting)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, RrcState::Connected)
    }

    /// Returns true while a connection exists or is being set up.
    pub fn has_connection_context(&self) -> bool {
        matches!(self, RrcState::Connecting | RrcState::Connected)
    }
}

impl fmt::Display for RrcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RrcState::Idle => write!(f, "RRC_IDLE"),
            RrcState::Connecting => write!(f, "RRC_CONNECTING"),
            RrcState::Connected => write!(f, "RRC_CONNECTED"),
        }
    }
}

/// RRC state transition triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcStateTransition {
    /// RRCSetupRequest sent on behalf of NAS
    EstablishmentRequest,
    /// RRCSetup received
    SetupComplete,
    /// RRCReject received or T300 expired
    EstablishmentFailure,
    /// RRCRelease received from the network
    Release,
    /// Radio link failure reported by RLS
    RadioLinkFailure,
    /// NAS released the connection locally
    LocalRelease,
}

impl fmt::Display for RrcStateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RrcStateTransition::EstablishmentRequest => write!(f, "RRC Establishment Request"),
            RrcStateTransition::SetupComplete => write!(f, "RRC Setup Complete"),
            RrcStateTransition::EstablishmentFailure => write!(f, "RRC Establishment Failure"),
            RrcStateTransition::Release => write!(f, "RRC Release"),
            RrcStateTransition::RadioLinkFailure => write!(f, "Radio Link Failure"),
            RrcStateTransition::LocalRelease => write!(f, "Local Release"),
        }
    }
}

/// Error type for invalid RRC state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid RRC state transition: {attempted_transition} from state {current_state}")]
pub struct RrcStateError {
    /// The current state when the invalid transition was attempted
    pub current_state: RrcState,
    /// The transition that was attempted
    pub attempted_transition: RrcStateTransition,
}

/// RRC state machine for the UE.
///
/// ```
/// use nextgsim_ue_rrc::rrc::{RrcState, RrcStateMachine, RrcStateTransition};
///
/// let mut sm = RrcStateMachine::new();
/// sm.transition(RrcStateTransition::EstablishmentRequest).unwrap();
/// assert_eq!(sm.state(), RrcState::Connecting);
///
/// sm.transition(RrcStateTransition::SetupComplete).unwrap();
/// assert_eq!(sm.state(), RrcState::Connected);
///
/// sm.transition(RrcStateTransition::Release).unwrap();
/// assert_eq!(sm.state(), RrcState::Idle);
/// ```
#[derive(Debug, Default)]
pub struct RrcStateMachine {
    state: RrcState,
    previous_state: Option<RrcState>,
    transition_count: u64,
}

impl RrcStateMachine {
    /// Creates a new RRC state machine in the Idle state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RrcState {
        self.state
    }

    pub fn previous_state(&self) -> Option<RrcState> {
        self.previous_state
    }

    /// Number of transitions performed so far.
    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Performs a state transition, returning the new state.
    ///
    /// On error the state is left untouched.
    pub fn transition(&mut self, transition: RrcStateTransition) -> Result<RrcState, RrcStateError> {
        let new_state = self.validate_transition(transition)?;

        self.previous_state = Some(self.state);
        self.state = new_state;
        self.transition_count += 1;

        Ok(new_state)
    }

    /// Validates a transition without performing it.
    pub fn validate_transition(
        &self,
        transition: RrcStateTransition,
    ) -> Result<RrcState, RrcStateError> {
        use RrcState::*;
        use RrcStateTransition::*;

        match (self.state, transition) {
            (Idle, EstablishmentRequest) => Ok(Connecting),

            (Connecting, SetupComplete) => Ok(Connected),
            (Connecting, EstablishmentFailure) => Ok(Idle),

            (Connected, Release) => Ok(Idle),

            (Connecting | Connected, RadioLinkFailure) => Ok(Idle),
            (_, LocalRelease) => Ok(Idle),

            (state, transition) => Err(RrcStateError {
                current_state: state,
                attempted_transition: transition,
            }),
        }
    }

    pub fn can_transition(&self, transition: RrcStateTransition) -> bool {
        self.validate_transition(transition).is_ok()
    }
}

impl fmt::Display for RrcStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RrcStateMachine(state={})", self.state)
    }
}
