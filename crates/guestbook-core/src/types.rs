//! Addresses and entries
//!
//! A signer is identified by a 20-byte account address rendered as `0x`-prefixed hex.
//! Entries are immutable once created: fields are private and only read accessors exist.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Account identity of a guestbook signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignerAddress([u8; ADDRESS_LEN]);

impl SignerAddress {
    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Deterministic address for tests and local tooling, all bytes set to `seed`
    pub const fn repeat(seed: u8) -> Self {
        Self([seed; ADDRESS_LEN])
    }
}

impl fmt::Display for SignerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error returned when an address string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// Missing `0x` prefix
    #[error("address must start with 0x")]
    MissingPrefix,
    /// Wrong number of hex digits
    #[error("address must be {expected} hex digits, got {actual}")]
    InvalidLength {
        /// Required digit count
        expected: usize,
        /// Digits supplied
        actual: usize,
    },
    /// Non-hex characters
    #[error("address is not valid hex: {0}")]
    InvalidHex(String),
}

impl FromStr for SignerAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressParseError::MissingPrefix)?;

        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressParseError::InvalidLength {
                expected: ADDRESS_LEN * 2,
                actual: digits.len(),
            });
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for SignerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SignerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One signed guestbook message
///
/// `timestamp` is seconds since the Unix epoch, assigned by the host when the entry
/// was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    signer: SignerAddress,
    message: String,
    timestamp: u64,
}

impl Entry {
    pub(crate) fn new(signer: SignerAddress, message: String, timestamp: u64) -> Self {
        Self {
            signer,
            message,
            timestamp,
        }
    }

    /// Account that signed
    pub fn signer(&self) -> SignerAddress {
        self.signer
    }

    /// Signed text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creation time in seconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
