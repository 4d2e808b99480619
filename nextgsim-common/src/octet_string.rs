//! `OctetString` type for NAS and RRC payloads carried between tasks.

use std::fmt;

use bytes::Bytes;

/// A variable-length sequence of octets (bytes).
///
/// Payloads handed between the NAS, RRC and RLS tasks travel as `OctetString`
/// so that ownership moves with the message and debug output stays readable.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString {
    data: Vec<u8>,
}

impl OctetString {
    /// Creates a new empty `OctetString`.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an `OctetString` from a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Creates an `OctetString` from a byte slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Returns the underlying bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the string and returns the owned bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Lowercase hex representation without separators.
    pub fn to_hex_string(&self) -> String {
        hex::encode(&self.data)
    }
}

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OctetString({})", self.to_hex_string())
    }
}

impl fmt::Display for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl From<&[u8]> for OctetString {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

impl From<Bytes> for OctetString {
    fn from(data: Bytes) -> Self {
        Self::from_vec(data.to_vec())
    }
}

impl From<OctetString> for Bytes {
    fn from(value: OctetString) -> Self {
        Bytes::from(value.data)
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
