use crate::config::APPROVAL_VALIDITY_MILLIS;
use crate::crypto::PublicKey;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampMillis;
use serde::{Deserialize, Serialize};

/// A pending transfer authorization.
///
/// Each guarded owner has a single slot; a new authorization overwrites the
/// previous one. The slot binds the exact transfer tuple, so it releases one
/// matching transfer and nothing else.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionApproval {
    /// Source token account of the authorized transfer
    pub source: PublicKey,

    /// Destination token account of the authorized transfer
    pub destination: PublicKey,

    /// Exact amount authorized
    pub amount: u64,

    /// When the authorization was granted
    pub timestamp: TimestampMillis,

    /// Approver that granted it
    pub approver: PublicKey,

    /// Cleared once a transfer consumes the authorization
    pub active: bool,
}

impl TransactionApproval {
    pub fn new(
        source: PublicKey,
        destination: PublicKey,
        amount: u64,
        timestamp: TimestampMillis,
        approver: PublicKey,
    ) -> Self {
        Self {
            source,
            destination,
            amount,
            timestamp,
            approver,
            active: true,
        }
    }

    /// Whether this authorization covers the given transfer tuple
    pub fn matches(&self, source: &PublicKey, destination: &PublicKey, amount: u64) -> bool {
        self.source == *source && self.destination == *destination && self.amount == amount
    }

    /// Whether the authorization window has elapsed
    pub fn is_expired(&self, current_time: TimestampMillis) -> bool {
        self.timestamp.saturating_add(APPROVAL_VALIDITY_MILLIS) < current_time
    }

    /// Usable means active, matching and fresh; checked atomically at
    /// transfer time
    pub fn is_usable(
        &self,
        source: &PublicKey,
        destination: &PublicKey,
        amount: u64,
        current_time: TimestampMillis,
    ) -> bool {
        self.active && self.matches(source, destination, amount) && !self.is_expired(current_time)
    }

    /// Mark the authorization spent
    pub fn consume(&mut self) {
        self.active = false;
    }
}

impl Serializer for TransactionApproval {
    fn write(&self, writer: &mut Writer) {
        self.source.write(writer);
        self.destination.write(writer);
        writer.write_u64(&self.amount);
        writer.write_u64(&self.timestamp);
        self.approver.write(writer);
        writer.write_bool(self.active);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            source: PublicKey::read(reader)?,
            destination: PublicKey::read(reader)?,
            amount: reader.read_u64()?,
            timestamp: reader.read_u64()?,
            approver: PublicKey::read(reader)?,
            active: reader.read_bool()?,
        })
    }

    fn size(&self) -> usize {
        32 + 32 + 8 + 8 + 32 + 1
    }
}
