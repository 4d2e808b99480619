//! Test fixtures and configuration helpers
//!
//! Pre-built configurations, NAS payloads and downlink PDUs as a simulated
//! gNB would send them.

use nextgsim_common::{LogLevel, OctetString, Plmn, UeRrcConfig};
use nextgsim_rrc::{encode_dl, DlRrcMessage};
use nextgsim_ue_rrc::{ActiveCellInfo, CellCategory, CellMeasurement};

/// Registration Request as sent in RRCSetupComplete
pub const REGISTRATION_REQUEST: &[u8] = &[0x7e, 0x00, 0x41, 0x79, 0x00, 0x0d, 0x01];

/// Authentication Response carried in ULInformationTransfer
pub const AUTHENTICATION_RESPONSE: &[u8] = &[0x7e, 0x00, 0x57, 0x2d, 0x10];

/// Authentication Request carried in DLInformationTransfer
pub const AUTHENTICATION_REQUEST: &[u8] = &[0x7e, 0x00, 0x56, 0x00, 0x02, 0x00, 0x00];

/// Test configuration builder for the RRC task
#[derive(Debug, Clone)]
pub struct TestRrcConfig {
    config: UeRrcConfig,
}

impl Default for TestRrcConfig {
    fn default() -> Self {
        Self {
            config: UeRrcConfig {
                timer_resolution_ms: 10,
                ..Default::default()
            },
        }
    }
}

impl TestRrcConfig {
    pub fn with_t300(mut self, t300_ms: u64) -> Self {
        self.config.t300_ms = t300_ms;
        self
    }

    pub fn with_max_pending_uplink(mut self, max: usize) -> Self {
        self.config.max_pending_uplink = max;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn build(self) -> UeRrcConfig {
        self.config
    }
}

/// Home PLMN used by the fixtures
pub fn test_plmn() -> Plmn {
    Plmn::new(1, 1, false)
}

/// A suitable serving cell with the given id
pub fn serving_cell(cell_id: i32) -> ActiveCellInfo {
    ActiveCellInfo {
        cell_id,
        category: CellCategory::SuitableCell,
        plmn: test_plmn(),
        tac: 1,
    }
}

/// Two cells as returned by a PLMN search
pub fn plmn_search_result() -> Vec<CellMeasurement> {
    vec![
        CellMeasurement {
            cell_id: 1,
            plmn: test_plmn(),
            tac: 1,
            dbm: -80,
        },
        CellMeasurement {
            cell_id: 2,
            plmn: Plmn::new(310, 410, true),
            tac: 7,
            dbm: -95,
        },
    ]
}

fn encode(msg: DlRrcMessage) -> OctetString {
    match encode_dl(&msg) {
        Ok(bytes) => OctetString::from(bytes),
        Err(e) => panic!("fixture {} failed to encode: {e}", msg.name()),
    }
}

/// RRCSetup on DL-CCCH
pub fn rrc_setup_pdu(rrc_transaction_id: u8) -> OctetString {
    encode(DlRrcMessage::RrcSetup { rrc_transaction_id })
}

/// RRCReject on DL-CCCH
pub fn rrc_reject_pdu() -> OctetString {
    encode(DlRrcMessage::RrcReject { wait_time: Some(1) })
}

/// RRCRelease on DL-DCCH
pub fn rrc_release_pdu() -> OctetString {
    encode(DlRrcMessage::RrcRelease {
        rrc_transaction_id: 0,
    })
}

/// DLInformationTransfer carrying `nas` on DL-DCCH
pub fn dl_information_transfer_pdu(nas: &[u8]) -> OctetString {
    encode(DlRrcMessage::DlInformationTransfer {
        rrc_transaction_id: 0,
        dedicated_nas_message: Some(nas.to_vec()),
    })
}
