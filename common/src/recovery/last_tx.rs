// Last-Transaction Ledger entry
//
// One entry per owner. The sequence increases on every successful gated
// transfer and at recovery initiation; recovery approvals sign over the
// current value, so any later activity invalidates previously gathered
// signatures.

use crate::crypto::PublicKey;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampMillis;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LastTx {
    /// Owner the entry tracks
    pub owner: PublicKey,

    /// Monotonically increasing activity counter
    pub sequence: u64,

    /// Timestamp of the last bump
    pub updated_at: TimestampMillis,
}

impl LastTx {
    pub fn new(owner: PublicKey, now: TimestampMillis) -> Self {
        Self {
            owner,
            sequence: 0,
            updated_at: now,
        }
    }

    /// Advance the counter. Never goes backwards.
    pub fn bump(&mut self, now: TimestampMillis) {
        self.sequence = self.sequence.saturating_add(1);
        self.updated_at = now;
    }
}

impl Serializer for LastTx {
    fn write(&self, writer: &mut Writer) {
        self.owner.write(writer);
        writer.write_u64(&self.sequence);
        writer.write_u64(&self.updated_at);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            owner: PublicKey::read(reader)?,
            sequence: reader.read_u64()?,
            updated_at: reader.read_u64()?,
        })
    }

    fn size(&self) -> usize {
        self.owner.size() + 8 + 8
    }
}
