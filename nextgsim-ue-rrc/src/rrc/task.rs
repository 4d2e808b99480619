//! RRC Task Implementation for UE
//!
//! The RRC task owns the UE's RRC connection state and routes every message
//! between the NAS, RLS and cell search tasks. Handlers are synchronous: they
//! only queue messages to other tasks, so each inbound message is processed
//! to completion before the next one is taken from the queue.
//!
//! # Reference
//! - 3GPP TS 38.331: NR; RRC protocol specification

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::rrc::state::{RrcState, RrcStateMachine, RrcStateTransition};
use crate::rrc::timer::RrcTimer;
use crate::tasks::{
    ActiveCellInfo, CellSearchMessage, CellSearchToRrc, NasMessage, NasToRrc, RlfCause,
    RlsMessage, RlsReleaseCause, RlsToRrc, RrcMessage, Task, TaskMessage, TaskReceiver,
    UeTaskBase, UplinkRejectReason,
};
use nextgsim_common::{log_rrc_message, Direction, OctetString};
use nextgsim_rrc::{
    decode_dl, encode_ul, DlRrcMessage, RrcChannel, RrcCodecError, RrcEstablishmentCause,
    RrcSetupComplete, RrcSetupRequest, UeIdentity, UlRrcMessage, MAX_NAS_LENGTH,
    UE_IDENTITY_MASK,
};

/// `selectedPLMN-Identity` sent in RRCSetupComplete (first PLMN of SIB1)
const SELECTED_PLMN_IDENTITY: u8 = 1;

/// Uplink NAS PDU waiting for the connection to come up
#[derive(Debug)]
struct PendingUplink {
    /// `None` for an initial NAS PDU
    pdu_id: Option<u32>,
    pdu: OctetString,
}

/// RRC Task for managing the UE's RRC connection
pub struct RrcTask {
    task_base: UeTaskBase,
    /// RRC state machine
    state_machine: RrcStateMachine,
    /// Establishment supervision
    t300: RrcTimer,
    /// PDU ID counter for RRC messages
    pdu_id_counter: u32,
    /// Initial NAS PDU held until RRCSetup arrives
    initial_nas_pdu: Option<OctetString>,
    /// Uplink NAS PDUs received while connecting
    pending_uplink: VecDeque<PendingUplink>,
    /// Last serving cell reported by cell search
    serving_cell: ActiveCellInfo,
}

impl RrcTask {
    pub fn new(task_base: UeTaskBase) -> Self {
        let t300 = RrcTimer::t300(task_base.config.t300_ms);

        Self {
            task_base,
            state_machine: RrcStateMachine::new(),
            t300,
            pdu_id_counter: 0,
            initial_nas_pdu: None,
            pending_uplink: VecDeque::new(),
            serving_cell: ActiveCellInfo::default(),
        }
    }

    pub fn state(&self) -> RrcState {
        self.state_machine.state()
    }

    pub fn serving_cell(&self) -> &ActiveCellInfo {
        &self.serving_cell
    }

    pub fn t300(&self) -> &RrcTimer {
        &self.t300
    }

    /// Number of uplink NAS PDUs waiting for connection setup.
    pub fn pending_uplink_count(&self) -> usize {
        self.pending_uplink.len()
    }

    /// Processes one inbound message.
    pub fn handle_message(&mut self, msg: RrcMessage) {
        match msg {
            RrcMessage::Rls(msg) => self.handle_rls_message(msg),
            RrcMessage::Nas(msg) => self.handle_nas_message(msg),
            RrcMessage::CellSearch(msg) => self.handle_cell_search_message(msg),
            RrcMessage::Foreign { source, kind } => {
                warn!("Unhandled message from {} task: {}", source, kind);
            }
        }
    }

    /// Checks the RRC timers.
    pub fn on_timer_tick(&mut self) {
        if self.t300.perform_tick() {
            if self.state_machine.state().is_connecting() {
                warn!("T300 expired, RRC connection establishment failed");
                self.leave_connection(
                    RrcStateTransition::EstablishmentFailure,
                    None,
                    NasMessage::RrcEstablishmentFailure,
                );
            } else {
                debug!("T300 expired in {} state, ignoring", self.state());
            }
        }
    }

    fn handle_rls_message(&mut self, msg: RlsToRrc) {
        match msg {
            RlsToRrc::PduDelivery { channel, pdu } => self.handle_downlink_rrc(channel, pdu),
            RlsToRrc::RadioLinkFailure { cause } => self.handle_radio_link_failure(cause),
        }
    }

    fn handle_nas_message(&mut self, msg: NasToRrc) {
        match msg {
            NasToRrc::PlmnSearchRequest => {
                self.send_to_cell_search(CellSearchMessage::PlmnSearchRequest);
            }
            NasToRrc::InitialNasDelivery { pdu, cause } => self.deliver_initial_nas(pdu, cause),
            NasToRrc::UplinkNasDelivery { pdu_id, pdu } => self.deliver_uplink_nas(pdu_id, pdu),
            NasToRrc::LocalReleaseConnection => {
                info!("Local release of RRC connection in {} state", self.state());
                self.leave_connection(
                    RrcStateTransition::LocalRelease,
                    Some(RlsReleaseCause::RrcLocalRelease),
                    NasMessage::RrcConnectionRelease,
                );
            }
            NasToRrc::CellSelectionCommand {
                cell_id,
                is_suitable,
            } => {
                self.send_to_cell_search(CellSearchMessage::CellSelectionCommand {
                    cell_id,
                    is_suitable,
                });
            }
        }
    }

    fn handle_cell_search_message(&mut self, msg: CellSearchToRrc) {
        match msg {
            CellSearchToRrc::PlmnSearchResponse { measurements } => {
                debug!("PLMN search found {} cell(s)", measurements.len());
                self.send_to_nas(NasMessage::PlmnSearchResponse { measurements });
            }
            CellSearchToRrc::ServingCellChange { cell } => {
                info!(
                    "Serving cell changed: cell_id={}, tai={}, category={:?}",
                    cell.cell_id,
                    cell.tai(),
                    cell.category
                );
                self.serving_cell = cell.clone();
                self.send_to_nas(NasMessage::ServingCellChange { cell });
            }
        }
    }

    // ------------------------------------------------------------------------
    // Uplink NAS
    // ------------------------------------------------------------------------

    fn deliver_initial_nas(&mut self, pdu: OctetString, cause: RrcEstablishmentCause) {
        if pdu.len() > MAX_NAS_LENGTH {
            warn!(
                "Initial NAS PDU rejected, {} octets exceeds {}",
                pdu.len(),
                MAX_NAS_LENGTH
            );
            self.send_to_nas(NasMessage::UplinkNasRejected {
                pdu_id: None,
                reason: UplinkRejectReason::PayloadTooLarge,
            });
            return;
        }

        match self.state() {
            RrcState::Idle => self.start_connection_establishment(pdu, cause),
            RrcState::Connecting => self.queue_uplink(None, pdu),
            RrcState::Connected => self.send_ul_information_transfer(None, pdu),
        }
    }

    fn deliver_uplink_nas(&mut self, pdu_id: u32, pdu: OctetString) {
        match self.state() {
            RrcState::Idle => {
                warn!("Uplink NAS PDU {} rejected, no RRC connection", pdu_id);
                self.send_to_nas(NasMessage::UplinkNasRejected {
                    pdu_id: Some(pdu_id),
                    reason: UplinkRejectReason::NoConnection,
                });
            }
            RrcState::Connecting => self.queue_uplink(Some(pdu_id), pdu),
            RrcState::Connected => self.send_ul_information_transfer(Some(pdu_id), pdu),
        }
    }

    fn queue_uplink(&mut self, pdu_id: Option<u32>, pdu: OctetString) {
        if self.pending_uplink.len() >= self.task_base.config.max_pending_uplink {
            warn!(
                "Uplink NAS PDU {:?} rejected, {} PDUs already pending",
                pdu_id,
                self.pending_uplink.len()
            );
            self.send_to_nas(NasMessage::UplinkNasRejected {
                pdu_id,
                reason: UplinkRejectReason::QueueFull,
            });
            return;
        }

        debug!("Queueing uplink NAS PDU {:?} until RRC setup", pdu_id);
        self.pending_uplink.push_back(PendingUplink { pdu_id, pdu });
    }

    fn flush_pending_uplink(&mut self) {
        while let Some(PendingUplink { pdu_id, pdu }) = self.pending_uplink.pop_front() {
            self.send_ul_information_transfer(pdu_id, pdu);
        }
    }

    /// Sends a NAS PDU in ULInformationTransfer. Initial NAS PDUs (`pdu_id`
    /// of `None`) get a fresh PDU ID. NAS is told when the PDU cannot be sent.
    fn send_ul_information_transfer(&mut self, pdu_id: Option<u32>, pdu: OctetString) {
        let id = match pdu_id {
            Some(id) => id,
            None => self.next_pdu_id(),
        };
        let msg = UlRrcMessage::UlInformationTransfer {
            dedicated_nas_message: pdu.into_vec(),
        };

        if !self.send_uplink_rrc_with_id(id, &msg) {
            self.send_to_nas(NasMessage::UplinkNasRejected {
                pdu_id,
                reason: UplinkRejectReason::PayloadTooLarge,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Connection establishment and release
    // ------------------------------------------------------------------------

    fn start_connection_establishment(&mut self, pdu: OctetString, cause: RrcEstablishmentCause) {
        let random_id = rand::random::<u64>() & UE_IDENTITY_MASK;
        let msg = UlRrcMessage::RrcSetupRequest(RrcSetupRequest {
            ue_identity: UeIdentity::RandomValue(random_id),
            establishment_cause: cause,
        });

        if let Err(e) = self
            .state_machine
            .transition(RrcStateTransition::EstablishmentRequest)
        {
            error!("Cannot start RRC connection establishment: {}", e);
            self.send_to_nas(NasMessage::RrcEstablishmentFailure);
            return;
        }

        info!(
            "Starting RRC connection establishment, cause={}, ue_identity={:#x}",
            cause, random_id
        );

        self.initial_nas_pdu = Some(pdu);
        self.t300.start();
        if !self.send_uplink_rrc(&msg) {
            self.leave_connection(
                RrcStateTransition::EstablishmentFailure,
                None,
                NasMessage::RrcEstablishmentFailure,
            );
        }
    }

    fn handle_rrc_setup(&mut self, rrc_transaction_id: u8) {
        if !self
            .state_machine
            .can_transition(RrcStateTransition::SetupComplete)
        {
            warn!("Ignoring RRCSetup in {} state", self.state());
            return;
        }

        let nas_pdu = self.initial_nas_pdu.take().unwrap_or_default();
        let msg = UlRrcMessage::RrcSetupComplete(RrcSetupComplete {
            rrc_transaction_id,
            selected_plmn_identity: SELECTED_PLMN_IDENTITY,
            dedicated_nas_message: nas_pdu.into_vec(),
        });

        // The gNB already holds a context after RRCSetup
        let Some(pdu) = encode_uplink(&msg) else {
            self.leave_connection(
                RrcStateTransition::EstablishmentFailure,
                Some(RlsReleaseCause::RrcLocalRelease),
                NasMessage::RrcEstablishmentFailure,
            );
            return;
        };

        if let Err(e) = self
            .state_machine
            .transition(RrcStateTransition::SetupComplete)
        {
            warn!("Ignoring RRCSetup: {}", e);
            return;
        }
        self.t300.stop();

        let pdu_id = self.next_pdu_id();
        self.deliver_uplink_rrc(pdu_id, &msg, pdu);

        info!("RRC connection established");
        self.send_to_nas(NasMessage::RrcConnectionSetup);
        self.flush_pending_uplink();
    }

    fn handle_rrc_reject(&mut self, wait_time: Option<u8>) {
        if !self.state().is_connecting() {
            warn!("Ignoring RRCReject in {} state", self.state());
            return;
        }

        warn!("RRC connection rejected, wait_time={:?}s", wait_time);
        self.leave_connection(
            RrcStateTransition::EstablishmentFailure,
            None,
            NasMessage::RrcEstablishmentFailure,
        );
    }

    fn handle_radio_link_failure(&mut self, cause: RlfCause) {
        warn!("Radio link failure: {}", cause);

        if self.state().has_connection_context() {
            self.leave_connection(
                RrcStateTransition::RadioLinkFailure,
                Some(RlsReleaseCause::RadioLinkFailure),
                NasMessage::RadioLinkFailure,
            );
        } else {
            self.send_to_nas(NasMessage::RadioLinkFailure);
        }
    }

    /// Moves to Idle. The state changes first, then RLS is told to release
    /// (when a cause is given), then NAS gets `nas_msg`. PDUs still waiting for
    /// the connection are rejected last.
    fn leave_connection(
        &mut self,
        transition: RrcStateTransition,
        rls_cause: Option<RlsReleaseCause>,
        nas_msg: NasMessage,
    ) {
        if let Err(e) = self.state_machine.transition(transition) {
            warn!("{}", e);
            return;
        }

        self.t300.stop();
        self.initial_nas_pdu = None;
        let dropped: Vec<_> = self.pending_uplink.drain(..).collect();

        if let Some(cause) = rls_cause {
            self.send_to_rls(RlsMessage::RrcConnectionRelease { cause });
        }
        self.send_to_nas(nas_msg);

        for PendingUplink { pdu_id, .. } in dropped {
            self.send_to_nas(NasMessage::UplinkNasRejected {
                pdu_id,
                reason: UplinkRejectReason::EstablishmentFailed,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Downlink RRC
    // ------------------------------------------------------------------------

    fn handle_downlink_rrc(&mut self, channel: RrcChannel, pdu: OctetString) {
        if pdu.is_empty() {
            warn!("Empty downlink RRC PDU on {}", channel);
            return;
        }

        let msg = match decode_dl(channel, pdu.data()) {
            Ok(msg) => msg,
            Err(RrcCodecError::UnsupportedChannel(channel)) => {
                debug!("Ignoring {} PDU, len={}", channel, pdu.len());
                return;
            }
            Err(e) => {
                warn!("Discarding downlink RRC PDU on {}: {}", channel, e);
                return;
            }
        };

        log_rrc_message(Direction::Rx, msg.name(), pdu.data());

        match msg {
            DlRrcMessage::RrcSetup { rrc_transaction_id } => {
                self.handle_rrc_setup(rrc_transaction_id);
            }
            DlRrcMessage::RrcReject { wait_time } => self.handle_rrc_reject(wait_time),
            dcch_msg => self.handle_dl_dcch_message(dcch_msg),
        }
    }

    fn handle_dl_dcch_message(&mut self, msg: DlRrcMessage) {
        if !self.state().is_connected() {
            warn!("Ignoring {} in {} state", msg.name(), self.state());
            return;
        }

        match msg {
            DlRrcMessage::DlInformationTransfer {
                dedicated_nas_message: Some(nas),
                ..
            } => {
                self.send_to_nas(NasMessage::NasDelivery {
                    pdu: OctetString::from_vec(nas),
                });
            }
            DlRrcMessage::DlInformationTransfer { .. } => {
                debug!("DLInformationTransfer without NAS PDU");
            }
            DlRrcMessage::RrcRelease { .. } => {
                info!("RRC connection released by the network");
                self.leave_connection(
                    RrcStateTransition::Release,
                    Some(RlsReleaseCause::RrcNormalRelease),
                    NasMessage::RrcConnectionRelease,
                );
            }
            DlRrcMessage::RrcReconfiguration { rrc_transaction_id } => {
                debug!("RRC Reconfiguration - sending RRC Reconfiguration Complete");
                self.send_uplink_rrc(&UlRrcMessage::RrcReconfigurationComplete {
                    rrc_transaction_id,
                });
            }
            DlRrcMessage::RrcSetup { .. } | DlRrcMessage::RrcReject { .. } => {
                debug!("Unexpected {} on DL-DCCH", msg.name());
            }
        }
    }

    // ------------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------------

    /// Get the next PDU ID for RRC message tracking
    fn next_pdu_id(&mut self) -> u32 {
        self.pdu_id_counter = self.pdu_id_counter.wrapping_add(1);
        if self.pdu_id_counter == 0 {
            self.pdu_id_counter = 1;
        }
        self.pdu_id_counter
    }

    /// Encodes and sends an uplink RRC message. Returns false if it could not
    /// be encoded.
    fn send_uplink_rrc(&mut self, msg: &UlRrcMessage) -> bool {
        let pdu_id = self.next_pdu_id();
        self.send_uplink_rrc_with_id(pdu_id, msg)
    }

    fn send_uplink_rrc_with_id(&self, pdu_id: u32, msg: &UlRrcMessage) -> bool {
        match encode_uplink(msg) {
            Some(pdu) => {
                self.deliver_uplink_rrc(pdu_id, msg, pdu);
                true
            }
            None => false,
        }
    }

    fn deliver_uplink_rrc(&self, pdu_id: u32, msg: &UlRrcMessage, pdu: OctetString) {
        log_rrc_message(Direction::Tx, msg.name(), pdu.data());
        self.send_to_rls(RlsMessage::RrcPduDelivery {
            channel: msg.channel(),
            pdu_id,
            pdu,
        });
    }

    fn send_to_rls(&self, msg: RlsMessage) {
        if let Err(e) = self.task_base.rls_tx.send(msg) {
            error!("Failed to send message to RLS: {}", e);
        }
    }

    fn send_to_nas(&self, msg: NasMessage) {
        if let Err(e) = self.task_base.nas_tx.send(msg) {
            error!("Failed to send message to NAS: {}", e);
        }
    }

    fn send_to_cell_search(&self, msg: CellSearchMessage) {
        if let Err(e) = self.task_base.cell_search_tx.send(msg) {
            error!("Failed to send message to cell search: {}", e);
        }
    }
}

fn encode_uplink(msg: &UlRrcMessage) -> Option<OctetString> {
    match encode_ul(msg) {
        Ok(bytes) => Some(OctetString::from(bytes)),
        Err(e) => {
            error!("Failed to encode {}: {}", msg.name(), e);
            None
        }
    }
}

#[async_trait::async_trait]
impl Task for RrcTask {
    type Message = RrcMessage;

    async fn run(&mut self, mut rx: TaskReceiver<Self::Message>) {
        info!("RRC task started");

        let resolution = self.task_base.config.timer_resolution_ms.max(1);
        let mut timer_tick = interval(Duration::from_millis(resolution));
        timer_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(TaskMessage::Message(rrc_msg)) => self.handle_message(rrc_msg),
                    Some(TaskMessage::Shutdown) => {
                        info!("RRC task received shutdown signal");
                        break;
                    }
                    None => {
                        info!("RRC task queue closed");
                        break;
                    }
                },
                _ = timer_tick.tick() => self.on_timer_tick(),
            }
        }

        info!("RRC task stopped in {} state", self.state());
    }
}
