// Identity status enumeration
// Classification returned by identity checks, never stored directly

use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use serde::{Deserialize, Serialize};

/// Identity status - the result of classifying a token account's identity
/// record against a clock value.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum IdentityStatus {
    /// At least one issuer attestation is active and unexpired
    Valid = 0,

    /// A record exists but no attestation is live (expired or revoked)
    Expired = 1,

    /// No identity record is registered for the token account
    #[default]
    NotFound = 2,

    /// The identity has been recovered; the state is terminal
    Recovered = 3,
}

impl IdentityStatus {
    /// Only a Valid identity may move funds through the gate
    #[inline]
    pub fn allows_transfers(&self) -> bool {
        matches!(self, IdentityStatus::Valid)
    }

    /// Recovered identities never leave that state
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, IdentityStatus::Recovered)
    }

    /// Get human-readable status name
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityStatus::Valid => "Valid",
            IdentityStatus::Expired => "Expired",
            IdentityStatus::NotFound => "NotFound",
            IdentityStatus::Recovered => "Recovered",
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(IdentityStatus::Valid),
            1 => Some(IdentityStatus::Expired),
            2 => Some(IdentityStatus::NotFound),
            3 => Some(IdentityStatus::Recovered),
            _ => None,
        }
    }

    /// Convert to u8 for serialization
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serializer for IdentityStatus {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let value = u8::read(reader)?;
        IdentityStatus::from_u8(value).ok_or(ReaderError::InvalidValue)
    }

    fn write(&self, writer: &mut Writer) {
        self.to_u8().write(writer);
    }

    fn size(&self) -> usize {
        1
    }
}
