//! RRC (Radio Resource Control) PDU library
//!
//! Message descriptors for the RRC PDUs exchanged between the UE and a
//! simulated gNB, and a compact octet codec for them.
//!
//! # Modules
//!
//! - `message` - Logical channels and uplink/downlink message types
//! - `codec` - Encoding/decoding of RRC PDUs per logical channel

pub mod codec;
pub mod message;

pub use codec::{decode_dl, decode_ul, encode_dl, encode_ul, RrcCodecError, MAX_NAS_LENGTH};
pub use message::{
    DlRrcMessage, RrcChannel, RrcEstablishmentCause, RrcSetupComplete, RrcSetupRequest,
    UeIdentity, UlRrcMessage, MAX_RRC_TRANSACTION_ID, UE_IDENTITY_MASK,
};
