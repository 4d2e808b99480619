//! RRC PDU encoding/decoding
//!
//! Each PDU starts with one octet holding the `c1` choice index of the
//! message on its logical channel (TS 38.331 numbering), followed by the
//! message fields in network byte order. NAS containers are prefixed with a
//! 16-bit length.
//!
//! | Channel | Index | Message | Body |
//! |---|---|---|---|
//! | UL-CCCH | 0 | RRCSetupRequest | identity kind (1), identity (5), cause (1) |
//! | UL-DCCH | 1 | RRCReconfigurationComplete | txid (1) |
//! | UL-DCCH | 2 | RRCSetupComplete | txid (1), PLMN index (1), NAS |
//! | UL-DCCH | 7 | ULInformationTransfer | NAS |
//! | DL-CCCH | 0 | RRCReject | wait time (1, 0 = absent) |
//! | DL-CCCH | 1 | RRCSetup | txid (1) |
//! | DL-DCCH | 0 | RRCReconfiguration | txid (1) |
//! | DL-DCCH | 2 | RRCRelease | txid (1) |
//! | DL-DCCH | 5 | DLInformationTransfer | txid (1), NAS present (1), NAS |

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::message::{
    DlRrcMessage, RrcChannel, RrcEstablishmentCause, RrcSetupComplete, RrcSetupRequest,
    UeIdentity, UlRrcMessage, MAX_RRC_TRANSACTION_ID, UE_IDENTITY_MASK,
};

/// Maximum NAS container length
pub const MAX_NAS_LENGTH: usize = u16::MAX as usize;

/// Maximum number of PLMNs in SIB1, bounding `selectedPLMN-Identity`
const MAX_PLMN: u8 = 12;

/// Octets used for a 39-bit UE identity
const UE_IDENTITY_LEN: usize = 5;

mod c1 {
    pub mod ul_ccch {
        pub const RRC_SETUP_REQUEST: u8 = 0;
    }
    pub mod ul_dcch {
        pub const RRC_RECONFIGURATION_COMPLETE: u8 = 1;
        pub const RRC_SETUP_COMPLETE: u8 = 2;
        pub const UL_INFORMATION_TRANSFER: u8 = 7;
    }
    pub mod dl_ccch {
        pub const RRC_REJECT: u8 = 0;
        pub const RRC_SETUP: u8 = 1;
    }
    pub mod dl_dcch {
        pub const RRC_RECONFIGURATION: u8 = 0;
        pub const RRC_RELEASE: u8 = 2;
        pub const DL_INFORMATION_TRANSFER: u8 = 5;
    }
}

const IDENTITY_NG_5G_S_TMSI_PART1: u8 = 0;
const IDENTITY_RANDOM_VALUE: u8 = 1;

/// Errors that can occur during RRC PDU encoding/decoding
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RrcCodecError {
    /// Buffer too short
    #[error("buffer too short: need {needed} bytes, have {available}")]
    BufferTooShort {
        /// Number of bytes needed
        needed: usize,
        /// Number of bytes available
        available: usize,
    },

    /// Unknown c1 choice index for the channel
    #[error("unknown {channel} message type: {value}")]
    UnknownMessageType {
        /// Channel the PDU arrived on
        channel: RrcChannel,
        /// Choice index found
        value: u8,
    },

    /// Channel carries traffic in the other direction
    #[error("{0} does not carry messages in this direction")]
    WrongDirection(RrcChannel),

    /// Channel is not handled by this codec
    #[error("{0} messages are not supported")]
    UnsupportedChannel(RrcChannel),

    /// A field is outside its allowed range
    #[error("invalid field value: {0}")]
    InvalidFieldValue(String),

    /// NAS container too large
    #[error("NAS container length {0} exceeds maximum allowed {}", MAX_NAS_LENGTH)]
    NasTooLarge(usize),

    /// Octets left over after the message
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
}

/// Result type for RRC codec operations
pub type Result<T> = std::result::Result<T, RrcCodecError>;

/// Encodes an uplink RRC message
pub fn encode_ul(msg: &UlRrcMessage) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(64);

    match msg {
        UlRrcMessage::RrcSetupRequest(m) => {
            let (kind, value) = match m.ue_identity {
                UeIdentity::Ng5gSTmsiPart1(v) => (IDENTITY_NG_5G_S_TMSI_PART1, v),
                UeIdentity::RandomValue(v) => (IDENTITY_RANDOM_VALUE, v),
            };
            if value > UE_IDENTITY_MASK {
                return Err(RrcCodecError::InvalidFieldValue(format!(
                    "UE identity 0x{value:X} exceeds 39 bits"
                )));
            }
            buf.put_u8(c1::ul_ccch::RRC_SETUP_REQUEST);
            buf.put_u8(kind);
            buf.put_uint(value, UE_IDENTITY_LEN);
            buf.put_u8(m.establishment_cause as u8);
        }
        UlRrcMessage::RrcSetupComplete(m) => {
            check_transaction_id(m.rrc_transaction_id)?;
            check_plmn_index(m.selected_plmn_identity)?;
            buf.put_u8(c1::ul_dcch::RRC_SETUP_COMPLETE);
            buf.put_u8(m.rrc_transaction_id);
            buf.put_u8(m.selected_plmn_identity);
            put_nas(&mut buf, &m.dedicated_nas_message)?;
        }
        UlRrcMessage::RrcReconfigurationComplete { rrc_transaction_id } => {
            check_transaction_id(*rrc_transaction_id)?;
            buf.put_u8(c1::ul_dcch::RRC_RECONFIGURATION_COMPLETE);
            buf.put_u8(*rrc_transaction_id);
        }
        UlRrcMessage::UlInformationTransfer {
            dedicated_nas_message,
        } => {
            buf.put_u8(c1::ul_dcch::UL_INFORMATION_TRANSFER);
            put_nas(&mut buf, dedicated_nas_message)?;
        }
    }

    Ok(buf.freeze())
}

/// Decodes an uplink RRC PDU received on `channel`
pub fn decode_ul(channel: RrcChannel, data: &[u8]) -> Result<UlRrcMessage> {
    if channel.is_downlink() {
        return Err(RrcCodecError::WrongDirection(channel));
    }

    let mut buf = data;
    let index = get_u8(&mut buf)?;

    let msg = match (channel, index) {
        (RrcChannel::UlCcch, c1::ul_ccch::RRC_SETUP_REQUEST) => {
            ensure(buf, 2 + UE_IDENTITY_LEN)?;
            let kind = buf.get_u8();
            let value = buf.get_uint(UE_IDENTITY_LEN);
            let ue_identity = match kind {
                IDENTITY_NG_5G_S_TMSI_PART1 => UeIdentity::Ng5gSTmsiPart1(value),
                IDENTITY_RANDOM_VALUE => UeIdentity::RandomValue(value),
                other => {
                    return Err(RrcCodecError::InvalidFieldValue(format!(
                        "UE identity kind {other}"
                    )))
                }
            };
            if value > UE_IDENTITY_MASK {
                return Err(RrcCodecError::InvalidFieldValue(format!(
                    "UE identity 0x{value:X} exceeds 39 bits"
                )));
            }
            let cause_value = buf.get_u8();
            let establishment_cause =
                RrcEstablishmentCause::from_u8(cause_value).ok_or_else(|| {
                    RrcCodecError::InvalidFieldValue(format!(
                        "establishment cause {cause_value}"
                    ))
                })?;
            UlRrcMessage::RrcSetupRequest(RrcSetupRequest {
                ue_identity,
                establishment_cause,
            })
        }
        (RrcChannel::UlDcch, c1::ul_dcch::RRC_SETUP_COMPLETE) => {
            let rrc_transaction_id = get_transaction_id(&mut buf)?;
            let selected_plmn_identity = get_u8(&mut buf)?;
            check_plmn_index(selected_plmn_identity)?;
            let dedicated_nas_message = get_nas(&mut buf)?;
            UlRrcMessage::RrcSetupComplete(RrcSetupComplete {
                rrc_transaction_id,
                selected_plmn_identity,
                dedicated_nas_message,
            })
        }
        (RrcChannel::UlDcch, c1::ul_dcch::RRC_RECONFIGURATION_COMPLETE) => {
            UlRrcMessage::RrcReconfigurationComplete {
                rrc_transaction_id: get_transaction_id(&mut buf)?,
            }
        }
        (RrcChannel::UlDcch, c1::ul_dcch::UL_INFORMATION_TRANSFER) => {
            UlRrcMessage::UlInformationTransfer {
                dedicated_nas_message: get_nas(&mut buf)?,
            }
        }
        (RrcChannel::UlCcch1, _) => return Err(RrcCodecError::UnsupportedChannel(channel)),
        (_, value) => return Err(RrcCodecError::UnknownMessageType { channel, value }),
    };

    ensure_consumed(buf)?;
    Ok(msg)
}

/// Encodes a downlink RRC message
pub fn encode_dl(msg: &DlRrcMessage) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(64);

    match msg {
        DlRrcMessage::RrcSetup { rrc_transaction_id } => {
            check_transaction_id(*rrc_transaction_id)?;
            buf.put_u8(c1::dl_ccch::RRC_SETUP);
            buf.put_u8(*rrc_transaction_id);
        }
        DlRrcMessage::RrcReject { wait_time } => {
            let wait_time = wait_time.unwrap_or(0);
            if wait_time > 16 {
                return Err(RrcCodecError::InvalidFieldValue(format!(
                    "wait time {wait_time}"
                )));
            }
            buf.put_u8(c1::dl_ccch::RRC_REJECT);
            buf.put_u8(wait_time);
        }
        DlRrcMessage::RrcReconfiguration { rrc_transaction_id } => {
            check_transaction_id(*rrc_transaction_id)?;
            buf.put_u8(c1::dl_dcch::RRC_RECONFIGURATION);
            buf.put_u8(*rrc_transaction_id);
        }
        DlRrcMessage::RrcRelease { rrc_transaction_id } => {
            check_transaction_id(*rrc_transaction_id)?;
            buf.put_u8(c1::dl_dcch::RRC_RELEASE);
            buf.put_u8(*rrc_transaction_id);
        }
        DlRrcMessage::DlInformationTransfer {
            rrc_transaction_id,
            dedicated_nas_message,
        } => {
            check_transaction_id(*rrc_transaction_id)?;
            buf.put_u8(c1::dl_dcch::DL_INFORMATION_TRANSFER);
            buf.put_u8(*rrc_transaction_id);
            match dedicated_nas_message {
                Some(nas) => {
                    buf.put_u8(1);
                    put_nas(&mut buf, nas)?;
                }
                None => buf.put_u8(0),
            }
        }
    }

    Ok(buf.freeze())
}

/// Decodes a downlink RRC PDU received on `channel`
pub fn decode_dl(channel: RrcChannel, data: &[u8]) -> Result<DlRrcMessage> {
    match channel {
        RrcChannel::DlCcch | RrcChannel::DlDcch => {}
        RrcChannel::BcchBch | RrcChannel::BcchDlSch | RrcChannel::Pcch => {
            return Err(RrcCodecError::UnsupportedChannel(channel))
        }
        _ => return Err(RrcCodecError::WrongDirection(channel)),
    }

    let mut buf = data;
    let index = get_u8(&mut buf)?;

    let msg = match (channel, index) {
        (RrcChannel::DlCcch, c1::dl_ccch::RRC_SETUP) => DlRrcMessage::RrcSetup {
            rrc_transaction_id: get_transaction_id(&mut buf)?,
        },
        (RrcChannel::DlCcch, c1::dl_ccch::RRC_REJECT) => {
            let wait_time = match get_u8(&mut buf)? {
                0 => None,
                t @ 1..=16 => Some(t),
                t => {
                    return Err(RrcCodecError::InvalidFieldValue(format!("wait time {t}")))
                }
            };
            DlRrcMessage::RrcReject { wait_time }
        }
        (RrcChannel::DlDcch, c1::dl_dcch::RRC_RECONFIGURATION) => {
            DlRrcMessage::RrcReconfiguration {
                rrc_transaction_id: get_transaction_id(&mut buf)?,
            }
        }
        (RrcChannel::DlDcch, c1::dl_dcch::RRC_RELEASE) => DlRrcMessage::RrcRelease {
            rrc_transaction_id: get_transaction_id(&mut buf)?,
        },
        (RrcChannel::DlDcch, c1::dl_dcch::DL_INFORMATION_TRANSFER) => {
            let rrc_transaction_id = get_transaction_id(&mut buf)?;
            let dedicated_nas_message = match get_u8(&mut buf)? {
                0 => None,
                1 => Some(get_nas(&mut buf)?),
                flag => {
                    return Err(RrcCodecError::InvalidFieldValue(format!(
                        "NAS presence flag {flag}"
                    )))
                }
            };
            DlRrcMessage::DlInformationTransfer {
                rrc_transaction_id,
                dedicated_nas_message,
            }
        }
        (_, value) => return Err(RrcCodecError::UnknownMessageType { channel, value }),
    };

    ensure_consumed(buf)?;
    Ok(msg)
}

fn ensure(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(RrcCodecError::BufferTooShort {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

fn ensure_consumed(buf: &[u8]) -> Result<()> {
    if !buf.is_empty() {
        return Err(RrcCodecError::TrailingBytes(buf.len()));
    }
    Ok(())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_transaction_id(buf: &mut &[u8]) -> Result<u8> {
    let id = get_u8(buf)?;
    check_transaction_id(id)?;
    Ok(id)
}

fn check_transaction_id(id: u8) -> Result<()> {
    if id > MAX_RRC_TRANSACTION_ID {
        return Err(RrcCodecError::InvalidFieldValue(format!(
            "RRC transaction id {id}"
        )));
    }
    Ok(())
}

fn check_plmn_index(index: u8) -> Result<()> {
    if index == 0 || index > MAX_PLMN {
        return Err(RrcCodecError::InvalidFieldValue(format!(
            "selected PLMN index {index}"
        )));
    }
    Ok(())
}

fn put_nas(buf: &mut BytesMut, nas: &[u8]) -> Result<()> {
    if nas.len() > MAX_NAS_LENGTH {
        return Err(RrcCodecError::NasTooLarge(nas.len()));
    }
    buf.put_u16(nas.len() as u16);
    buf.extend_from_slice(nas);
    Ok(())
}

fn get_nas(buf: &mut &[u8]) -> Result<Vec<u8>> {
    ensure(buf, 2)?;
    let len = buf.get_u16() as usize;
    ensure(buf, len)?;
    let nas = buf[..len].to_vec();
    buf.advance(len);
    Ok(nas)
}
