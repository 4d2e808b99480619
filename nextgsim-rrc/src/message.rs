//! RRC logical channels and message descriptors
//!
//! Only the messages the UE actually exchanges during connection
//! establishment, NAS transport and release are modelled. Field names follow
//! 3GPP TS 38.331.

use std::fmt;

/// Largest value of `RRC-TransactionIdentifier` (2 bits).
pub const MAX_RRC_TRANSACTION_ID: u8 = 3;

/// Mask for the 39-bit `InitialUE-Identity` values.
pub const UE_IDENTITY_MASK: u64 = (1 << 39) - 1;

/// RRC logical channel a PDU is carried on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RrcChannel {
    /// Broadcast control channel (MIB)
    BcchBch = 0,
    /// Broadcast control channel (SIBs)
    BcchDlSch = 1,
    /// Downlink common control channel
    DlCcch = 2,
    /// Downlink dedicated control channel
    DlDcch = 3,
    /// Paging control channel
    Pcch = 4,
    /// Uplink common control channel
    UlCcch = 5,
    /// Uplink common control channel (64-bit RRCResumeRequest1 variant)
    UlCcch1 = 6,
    /// Uplink dedicated control channel
    UlDcch = 7,
}

impl RrcChannel {
    /// Creates an RrcChannel from its RLS payload value
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::BcchBch),
            1 => Some(Self::BcchDlSch),
            2 => Some(Self::DlCcch),
            3 => Some(Self::DlDcch),
            4 => Some(Self::Pcch),
            5 => Some(Self::UlCcch),
            6 => Some(Self::UlCcch1),
            7 => Some(Self::UlDcch),
            _ => None,
        }
    }

    /// Returns true for channels carried from the network to the UE.
    pub fn is_downlink(self) -> bool {
        matches!(
            self,
            Self::BcchBch | Self::BcchDlSch | Self::DlCcch | Self::DlDcch | Self::Pcch
        )
    }
}

impl fmt::Display for RrcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BcchBch => "BCCH-BCH",
            Self::BcchDlSch => "BCCH-DL-SCH",
            Self::DlCcch => "DL-CCCH",
            Self::DlDcch => "DL-DCCH",
            Self::Pcch => "PCCH",
            Self::UlCcch => "UL-CCCH",
            Self::UlCcch1 => "UL-CCCH1",
            Self::UlDcch => "UL-DCCH",
        };
        f.write_str(name)
    }
}

/// `EstablishmentCause` of RRCSetupRequest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RrcEstablishmentCause {
    Emergency = 0,
    HighPriorityAccess = 1,
    MtAccess = 2,
    MoSignalling = 3,
    MoData = 4,
    MoVoiceCall = 5,
    MoVideoCall = 6,
    MoSms = 7,
    MpsPriorityAccess = 8,
    McsPriorityAccess = 9,
}

impl RrcEstablishmentCause {
    /// Creates a cause from its enumerated value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Emergency),
            1 => Some(Self::HighPriorityAccess),
            2 => Some(Self::MtAccess),
            3 => Some(Self::MoSignalling),
            4 => Some(Self::MoData),
            5 => Some(Self::MoVoiceCall),
            6 => Some(Self::MoVideoCall),
            7 => Some(Self::MoSms),
            8 => Some(Self::MpsPriorityAccess),
            9 => Some(Self::McsPriorityAccess),
            _ => None,
        }
    }
}

impl fmt::Display for RrcEstablishmentCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Emergency => "emergency",
            Self::HighPriorityAccess => "highPriorityAccess",
            Self::MtAccess => "mt-Access",
            Self::MoSignalling => "mo-Signalling",
            Self::MoData => "mo-Data",
            Self::MoVoiceCall => "mo-VoiceCall",
            Self::MoVideoCall => "mo-VideoCall",
            Self::MoSms => "mo-SMS",
            Self::MpsPriorityAccess => "mps-PriorityAccess",
            Self::McsPriorityAccess => "mcs-PriorityAccess",
        };
        f.write_str(name)
    }
}

/// `InitialUE-Identity` of RRCSetupRequest (39 bits either way)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UeIdentity {
    /// Rightmost 39 bits of the 5G-S-TMSI
    Ng5gSTmsiPart1(u64),
    /// Random value drawn when no 5G-S-TMSI is available
    RandomValue(u64),
}

impl UeIdentity {
    /// The 39-bit identity value.
    pub fn value(&self) -> u64 {
        match self {
            Self::Ng5gSTmsiPart1(v) | Self::RandomValue(v) => *v,
        }
    }
}

/// RRCSetupRequest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrcSetupRequest {
    pub ue_identity: UeIdentity,
    pub establishment_cause: RrcEstablishmentCause,
}

/// RRCSetupComplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrcSetupComplete {
    pub rrc_transaction_id: u8,
    /// 1-based index into the PLMN list broadcast in SIB1
    pub selected_plmn_identity: u8,
    pub dedicated_nas_message: Vec<u8>,
}

/// Uplink RRC messages sent by the UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UlRrcMessage {
    /// UL-CCCH
    RrcSetupRequest(RrcSetupRequest),
    /// UL-DCCH
    RrcSetupComplete(RrcSetupComplete),
    /// UL-DCCH
    RrcReconfigurationComplete { rrc_transaction_id: u8 },
    /// UL-DCCH
    UlInformationTransfer { dedicated_nas_message: Vec<u8> },
}

impl UlRrcMessage {
    /// Logical channel this message travels on.
    pub fn channel(&self) -> RrcChannel {
        match self {
            Self::RrcSetupRequest(_) => RrcChannel::UlCcch,
            _ => RrcChannel::UlDcch,
        }
    }

    /// Message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RrcSetupRequest(_) => "RRCSetupRequest",
            Self::RrcSetupComplete(_) => "RRCSetupComplete",
            Self::RrcReconfigurationComplete { .. } => "RRCReconfigurationComplete",
            Self::UlInformationTransfer { .. } => "ULInformationTransfer",
        }
    }
}

/// Downlink RRC messages received by the UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DlRrcMessage {
    /// DL-CCCH
    RrcSetup { rrc_transaction_id: u8 },
    /// DL-CCCH; wait time in seconds (1..=16) when present
    RrcReject { wait_time: Option<u8> },
    /// DL-DCCH
    RrcReconfiguration { rrc_transaction_id: u8 },
    /// DL-DCCH
    RrcRelease { rrc_transaction_id: u8 },
    /// DL-DCCH
    DlInformationTransfer {
        rrc_transaction_id: u8,
        dedicated_nas_message: Option<Vec<u8>>,
    },
}

impl DlRrcMessage {
    /// Logical channel this message travels on.
    pub fn channel(&self) -> RrcChannel {
        match self {
            Self::RrcSetup { .. } | Self::RrcReject { .. } => RrcChannel::DlCcch,
            _ => RrcChannel::DlDcch,
        }
    }

    /// Message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RrcSetup { .. } => "RRCSetup",
            Self::RrcReject { .. } => "RRCReject",
            Self::RrcReconfiguration { .. } => "RRCReconfiguration",
            Self::RrcRelease { .. } => "RRCRelease",
            Self::DlInformationTransfer { .. } => "DLInformationTransfer",
        }
    }
}
