//! RRC task harness for integration testing
//!
//! Runs a real `RrcTask` on the tokio runtime and plays its three peers: NAS,
//! RLS (with a simulated gNB behind it) and cell search. Everything the task
//! sends to a peer ends up in that peer's receiver held by the harness.

use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::test_utils::{
    init_test_logging_at, recv_within, DEFAULT_TEST_TIMEOUT, QUIET_PERIOD,
};
use nextgsim_common::{OctetString, UeRrcConfig};
use nextgsim_rrc::{decode_ul, RrcChannel, RrcCodecError, UlRrcMessage};
use nextgsim_ue_rrc::{
    CellSearchMessage, CellSearchToRrc, NasMessage, NasToRrc, RlsMessage, RlsToRrc, RrcMessage,
    RrcTask, Task, TaskMessage, TaskReceiver, UeTaskBase,
};

/// Harness errors
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("RRC task queue is closed")]
    TaskStopped,
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("Expected an RRC PDU from RLS queue, got {0}")]
    UnexpectedRlsMessage(String),
    #[error("Uplink RRC PDU does not decode: {0}")]
    Codec(#[from] RrcCodecError),
    #[error("RRC task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Uplink RRC PDU as seen by the simulated gNB
#[derive(Debug, Clone)]
pub struct UplinkRrc {
    pub channel: RrcChannel,
    pub pdu_id: u32,
    pub message: UlRrcMessage,
}

/// Everything the task sent to its peers during a quiet period
#[derive(Debug, Default)]
pub struct PeerOutputs {
    pub nas: Vec<NasMessage>,
    pub rls: Vec<RlsMessage>,
    pub cell_search: Vec<CellSearchMessage>,
}

impl PeerOutputs {
    pub fn is_empty(&self) -> bool {
        self.nas.is_empty() && self.rls.is_empty() && self.cell_search.is_empty()
    }
}

/// A running RRC task together with its peer queues
pub struct RrcHarness {
    base: UeTaskBase,
    nas_rx: TaskReceiver<NasMessage>,
    rls_rx: TaskReceiver<RlsMessage>,
    cell_search_rx: TaskReceiver<CellSearchMessage>,
    task: JoinHandle<RrcTask>,
}

impl RrcHarness {
    /// Spawns an RRC task with the given configuration, logging at the
    /// configured level.
    pub fn start(config: UeRrcConfig) -> Self {
        init_test_logging_at(config.log_level);
        let (base, nas_rx, rrc_rx, rls_rx, cell_search_rx) = UeTaskBase::new(config);

        let mut rrc = RrcTask::new(base.clone());
        let task = tokio::spawn(async move {
            rrc.run(rrc_rx).await;
            rrc
        });

        tracing::info!("RRC harness started");
        Self {
            base,
            nas_rx,
            rls_rx,
            cell_search_rx,
            task,
        }
    }

    /// Queues a raw message for the RRC task.
    pub fn send(&self, msg: RrcMessage) -> Result<(), HarnessError> {
        self.base
            .rrc_tx
            .send(msg)
            .map_err(|_| HarnessError::TaskStopped)
    }

    pub fn from_nas(&self, msg: NasToRrc) -> Result<(), HarnessError> {
        self.send(RrcMessage::Nas(msg))
    }

    pub fn from_rls(&self, msg: RlsToRrc) -> Result<(), HarnessError> {
        self.send(RrcMessage::Rls(msg))
    }

    pub fn from_cell_search(&self, msg: CellSearchToRrc) -> Result<(), HarnessError> {
        self.send(RrcMessage::CellSearch(msg))
    }

    /// Simulates the gNB sending a downlink RRC PDU through RLS.
    pub fn simulate_downlink(
        &self,
        channel: RrcChannel,
        pdu: OctetString,
    ) -> Result<(), HarnessError> {
        self.from_rls(RlsToRrc::PduDelivery { channel, pdu })
    }

    /// Whether the RRC task loop has returned.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn next_nas(&mut self) -> Result<NasMessage, HarnessError> {
        self.next_nas_within(DEFAULT_TEST_TIMEOUT).await
    }

    pub async fn next_nas_within(&mut self, wait: Duration) -> Result<NasMessage, HarnessError> {
        recv_within(&mut self.nas_rx, wait)
            .await
            .ok_or(HarnessError::Timeout("NAS message"))
    }

    pub async fn next_rls(&mut self) -> Result<RlsMessage, HarnessError> {
        recv_within(&mut self.rls_rx, DEFAULT_TEST_TIMEOUT)
            .await
            .ok_or(HarnessError::Timeout("RLS message"))
    }

    pub async fn next_cell_search(&mut self) -> Result<CellSearchMessage, HarnessError> {
        recv_within(&mut self.cell_search_rx, DEFAULT_TEST_TIMEOUT)
            .await
            .ok_or(HarnessError::Timeout("cell search message"))
    }

    /// Waits for the next uplink RRC PDU and decodes it as the gNB would.
    pub async fn next_uplink_rrc(&mut self) -> Result<UplinkRrc, HarnessError> {
        match self.next_rls().await? {
            RlsMessage::RrcPduDelivery {
                channel,
                pdu_id,
                pdu,
            } => {
                let message = decode_ul(channel, pdu.data())?;
                Ok(UplinkRrc {
                    channel,
                    pdu_id,
                    message,
                })
            }
            other => Err(HarnessError::UnexpectedRlsMessage(format!("{other:?}"))),
        }
    }

    /// Lets the task run for a quiet period and collects everything it sent.
    pub async fn settle(&mut self) -> PeerOutputs {
        sleep(QUIET_PERIOD).await;

        let mut outputs = PeerOutputs::default();
        drain_into(&mut self.nas_rx, &mut outputs.nas);
        drain_into(&mut self.rls_rx, &mut outputs.rls);
        drain_into(&mut self.cell_search_rx, &mut outputs.cell_search);
        outputs
    }

    /// Sends shutdown without waiting for the task to finish.
    pub fn request_shutdown(&self) -> Result<(), HarnessError> {
        self.base
            .rrc_tx
            .shutdown()
            .map_err(|_| HarnessError::TaskStopped)
    }

    /// Waits for the task loop to return and hands the task back.
    pub async fn join(self) -> Result<RrcTask, HarnessError> {
        let rrc = self.task.await?;
        tracing::info!("RRC harness stopped");
        Ok(rrc)
    }

    /// Sends shutdown and returns the task for inspection.
    pub async fn stop(self) -> Result<RrcTask, HarnessError> {
        self.request_shutdown()?;
        self.join().await
    }
}

fn drain_into<T>(rx: &mut TaskReceiver<T>, out: &mut Vec<T>) {
    while let Ok(msg) = rx.try_recv() {
        if let TaskMessage::Message(msg) = msg {
            out.push(msg);
        }
    }
}
