//! UE Task Framework
//!
//! Actor-based task model for the UE control plane. Each task runs as an
//! independent async loop and communicates with its peers only through typed
//! message queues.
//!
//! # Architecture
//!
//! The RRC task sits between three peers:
//! - **NAS Task**: originates and consumes NAS PDUs, requests connections
//! - **RLS Task**: radio link simulation, carries RRC PDUs to and from the gNB
//! - **Cell Search Task**: PLMN search and cell selection
//!
//! Every queue is unbounded and ordered. A send never suspends the sender, so
//! handlers run to completion without waiting on another task.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use nextgsim_common::{OctetString, Plmn, Tai, UeRrcConfig};
use nextgsim_rrc::{RrcChannel, RrcEstablishmentCause};

// ============================================================================
// Common Types
// ============================================================================

/// Category of a cell with respect to the selected PLMN (3GPP TS 38.304).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellCategory {
    #[default]
    None,
    /// Cell meets all criteria including selected PLMN
    SuitableCell,
    /// Cell meets criteria except PLMN (limited service)
    AcceptableCell,
}

/// Serving cell descriptor reported by cell search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveCellInfo {
    pub cell_id: i32,
    pub category: CellCategory,
    pub plmn: Plmn,
    pub tac: u32,
}

impl ActiveCellInfo {
    pub fn has_value(&self) -> bool {
        self.cell_id != 0
    }

    pub fn tai(&self) -> Tai {
        Tai::new(self.plmn, self.tac)
    }
}

/// One cell found during a PLMN search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMeasurement {
    pub cell_id: i32,
    pub plmn: Plmn,
    pub tac: u32,
    /// Signal strength in dBm
    pub dbm: i32,
}

// ============================================================================
// Task Message Envelope
// ============================================================================

/// Task message envelope wrapping typed messages with control signals.
#[derive(Debug)]
pub enum TaskMessage<T> {
    /// Regular message payload
    Message(T),
    /// Shutdown signal - task should terminate gracefully
    Shutdown,
}

impl<T> TaskMessage<T> {
    pub fn message(msg: T) -> Self {
        TaskMessage::Message(msg)
    }

    pub fn shutdown() -> Self {
        TaskMessage::Shutdown
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, TaskMessage::Shutdown)
    }

    /// Returns the message payload if present, or None for shutdown.
    pub fn into_message(self) -> Option<T> {
        match self {
            TaskMessage::Message(msg) => Some(msg),
            TaskMessage::Shutdown => None,
        }
    }
}

/// Task identifier for the UE tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// Application task
    App,
    /// NAS task (MM + SM)
    Nas,
    /// RRC task
    Rrc,
    /// RLS task
    Rls,
    /// Cell search / PLMN selection task
    CellSearch,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::App => write!(f, "App"),
            TaskId::Nas => write!(f, "NAS"),
            TaskId::Rrc => write!(f, "RRC"),
            TaskId::Rls => write!(f, "RLS"),
            TaskId::CellSearch => write!(f, "CellSearch"),
        }
    }
}

/// Receiving end of a task queue.
pub type TaskReceiver<T> = mpsc::UnboundedReceiver<TaskMessage<T>>;

// ============================================================================
// Task Trait
// ============================================================================

/// Base trait for all UE tasks.
#[async_trait::async_trait]
pub trait Task: Send + 'static {
    /// The message type this task processes.
    type Message: Send;

    /// Runs the task's main loop until `TaskMessage::Shutdown` arrives or
    /// every sender is dropped.
    async fn run(&mut self, rx: TaskReceiver<Self::Message>);
}

// ============================================================================
// RRC Task Messages
// ============================================================================

/// Messages for the RRC task, keyed by the task that sent them.
#[derive(Debug)]
pub enum RrcMessage {
    Rls(RlsToRrc),
    Nas(NasToRrc),
    CellSearch(CellSearchToRrc),
    /// Message kind the RRC task has no handler for
    Foreign {
        source: TaskId,
        kind: &'static str,
    },
}

/// RLS -> RRC
#[derive(Debug)]
pub enum RlsToRrc {
    /// Downlink RRC PDU received from the serving cell
    PduDelivery {
        channel: RrcChannel,
        pdu: OctetString,
    },
    /// Radio link failure
    RadioLinkFailure { cause: RlfCause },
}

/// NAS -> RRC
#[derive(Debug)]
pub enum NasToRrc {
    PlmnSearchRequest,
    /// First NAS PDU of a connection; triggers RRC establishment when idle
    InitialNasDelivery {
        pdu: OctetString,
        cause: RrcEstablishmentCause,
    },
    /// NAS PDU for an established connection
    UplinkNasDelivery {
        /// PDU ID echoed back on rejection
        pdu_id: u32,
        pdu: OctetString,
    },
    LocalReleaseConnection,
    CellSelectionCommand {
        cell_id: i32,
        is_suitable: bool,
    },
}

/// Cell search -> RRC
#[derive(Debug)]
pub enum CellSearchToRrc {
    PlmnSearchResponse {
        measurements: Vec<CellMeasurement>,
    },
    ServingCellChange {
        cell: ActiveCellInfo,
    },
}

/// Radio link failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlfCause {
    /// PDU ID already exists
    PduIdExists,
    /// PDU ID buffer full
    PduIdFull,
    /// Signal lost to connected cell
    SignalLostToConnectedCell,
    /// T310 expired
    T310Expiry,
}

impl fmt::Display for RlfCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RlfCause::PduIdExists => write!(f, "PDU-ID-EXISTS"),
            RlfCause::PduIdFull => write!(f, "PDU-ID-FULL"),
            RlfCause::SignalLostToConnectedCell => write!(f, "SIGNAL-LOST-TO-CONNECTED-CELL"),
            RlfCause::T310Expiry => write!(f, "T310-EXPIRY"),
        }
    }
}

// ============================================================================
// NAS Task Messages
// ============================================================================

/// Messages for the NAS task.
#[derive(Debug)]
pub enum NasMessage {
    /// Downlink NAS PDU extracted from DLInformationTransfer
    NasDelivery { pdu: OctetString },
    /// RRC connection established
    RrcConnectionSetup,
    /// RRC connection released (locally or by the network)
    RrcConnectionRelease,
    /// RRC establishment rejected or timed out
    RrcEstablishmentFailure,
    /// Radio link failure
    RadioLinkFailure,
    /// PLMN search result, forwarded from cell search
    PlmnSearchResponse { measurements: Vec<CellMeasurement> },
    /// Serving cell changed, forwarded from cell search
    ServingCellChange { cell: ActiveCellInfo },
    /// Uplink NAS PDU was not sent
    UplinkNasRejected {
        /// `None` for an initial NAS PDU
        pdu_id: Option<u32>,
        reason: UplinkRejectReason,
    },
}

/// Why an uplink NAS PDU was dropped by RRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkRejectReason {
    /// No RRC connection and none being established
    NoConnection,
    /// Too many PDUs waiting for the connection to come up
    QueueFull,
    /// The connection the PDU was waiting for could not be established
    EstablishmentFailed,
    /// NAS PDU does not fit a `dedicatedNAS-Message` container
    PayloadTooLarge,
}

impl fmt::Display for UplinkRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UplinkRejectReason::NoConnection => write!(f, "no RRC connection"),
            UplinkRejectReason::QueueFull => write!(f, "pending uplink queue full"),
            UplinkRejectReason::EstablishmentFailed => write!(f, "RRC establishment failed"),
            UplinkRejectReason::PayloadTooLarge => write!(f, "NAS PDU too large"),
        }
    }
}

// ============================================================================
// RLS Task Messages
// ============================================================================

/// Messages for the RLS task.
#[derive(Debug)]
pub enum RlsMessage {
    /// Tear down the radio link to the serving cell
    RrcConnectionRelease { cause: RlsReleaseCause },
    /// Uplink RRC PDU
    RrcPduDelivery {
        channel: RrcChannel,
        /// PDU ID for acknowledgment tracking
        pdu_id: u32,
        pdu: OctetString,
    },
}

/// Cause attached to a release sent to RLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlsReleaseCause {
    /// NAS asked for a local release
    RrcLocalRelease,
    /// Network sent RRCRelease
    RrcNormalRelease,
    /// Connection lost after a radio link failure
    RadioLinkFailure,
}

// ============================================================================
// Cell Search Task Messages
// ============================================================================

/// Messages for the cell search task.
#[derive(Debug)]
pub enum CellSearchMessage {
    PlmnSearchRequest,
    CellSelectionCommand { cell_id: i32, is_suitable: bool },
}

// ============================================================================
// Task Handle
// ============================================================================

/// Sending end of a task queue.
#[derive(Debug)]
pub struct TaskHandle<T> {
    tx: mpsc::UnboundedSender<TaskMessage<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> TaskHandle<T> {
    pub fn new(tx: mpsc::UnboundedSender<TaskMessage<T>>) -> Self {
        Self { tx }
    }

    /// Queues a message. Fails only if the receiving task has stopped.
    pub fn send(&self, msg: T) -> Result<(), mpsc::error::SendError<TaskMessage<T>>> {
        self.tx.send(TaskMessage::Message(msg))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<TaskMessage<T>>> {
        self.tx.send(TaskMessage::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Creates a task queue.
pub fn task_channel<T>() -> (TaskHandle<T>, TaskReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TaskHandle::new(tx), rx)
}

// ============================================================================
// UE Task Base
// ============================================================================

/// Handles to every task plus the shared configuration.
#[derive(Clone)]
pub struct UeTaskBase {
    pub config: Arc<UeRrcConfig>,
    pub nas_tx: TaskHandle<NasMessage>,
    pub rrc_tx: TaskHandle<RrcMessage>,
    pub rls_tx: TaskHandle<RlsMessage>,
    pub cell_search_tx: TaskHandle<CellSearchMessage>,
}

impl UeTaskBase {
    /// Creates the task queues. Returns the base and the receivers for the
    /// NAS, RRC, RLS and cell search tasks, in that order.
    #[allow(clippy::type_complexity)]
    pub fn new(
        config: UeRrcConfig,
    ) -> (
        Self,
        TaskReceiver<NasMessage>,
        TaskReceiver<RrcMessage>,
        TaskReceiver<RlsMessage>,
        TaskReceiver<CellSearchMessage>,
    ) {
        let (nas_tx, nas_rx) = task_channel();
        let (rrc_tx, rrc_rx) = task_channel();
        let (rls_tx, rls_rx) = task_channel();
        let (cell_search_tx, cell_search_rx) = task_channel();

        let base = Self {
            config: Arc::new(config),
            nas_tx,
            rrc_tx,
            rls_tx,
            cell_search_tx,
        };

        (base, nas_rx, rrc_rx, rls_rx, cell_search_rx)
    }

    /// Sends shutdown to all tasks.
    pub fn shutdown_all(&self) {
        // Ignore errors - tasks may already be shut down
        let _ = self.nas_tx.shutdown();
        let _ = self.rrc_tx.shutdown();
        let _ = self.rls_tx.shutdown();
        let _ = self.cell_search_tx.shutdown();
    }
}
