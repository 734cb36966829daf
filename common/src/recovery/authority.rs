// Recovery authority set
// Registered once per owner and immutable afterwards: there is no update
// path, matching the terminal nature of recovery itself.

use crate::config::{MAX_RECOVERY_AUTHORITIES, MIN_RECOVERY_AUTHORITIES};
use crate::crypto::PublicKey;
use crate::recovery::RecoveryError;
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampMillis;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryAuthority {
    /// Owner whose accounts the set can recover
    pub owner: PublicKey,

    /// Authority keys allowed to cosign a recovery
    pub authorities: Vec<PublicKey>,

    /// Number of distinct valid cosigners required (M-of-N)
    pub threshold: u8,

    /// Registration timestamp
    pub created_at: TimestampMillis,
}

impl RecoveryAuthority {
    pub fn new(
        owner: PublicKey,
        authorities: Vec<PublicKey>,
        threshold: u8,
        created_at: TimestampMillis,
    ) -> Self {
        Self {
            owner,
            authorities,
            threshold,
            created_at,
        }
    }

    /// Validate the set configuration: non-empty, duplicate-free, within
    /// bounds, and 1 <= threshold <= len.
    pub fn validate(&self) -> Result<(), RecoveryError> {
        let count = self.authorities.len();

        if count < MIN_RECOVERY_AUTHORITIES {
            return Err(RecoveryError::EmptyAuthorities);
        }

        if count > MAX_RECOVERY_AUTHORITIES {
            return Err(RecoveryError::TooManyAuthorities {
                count,
                max: MAX_RECOVERY_AUTHORITIES,
            });
        }

        let mut seen: HashSet<&PublicKey> = HashSet::with_capacity(count);
        for authority in &self.authorities {
            if !seen.insert(authority) {
                return Err(RecoveryError::DuplicateAuthority(*authority));
            }
        }

        if self.threshold < 1 || self.threshold as usize > count {
            return Err(RecoveryError::InvalidThreshold {
                threshold: self.threshold,
                authorities: count,
            });
        }

        Ok(())
    }

    #[inline]
    pub fn is_authority(&self, key: &PublicKey) -> bool {
        self.authorities.iter().any(|a| a == key)
    }

    #[inline]
    pub fn authority_count(&self) -> usize {
        self.authorities.len()
    }
}

impl Serializer for RecoveryAuthority {
    fn write(&self, writer: &mut Writer) {
        self.owner.write(writer);

        writer.write_u8(self.authorities.len() as u8);
        for authority in &self.authorities {
            authority.write(writer);
        }

        writer.write_u8(self.threshold);
        writer.write_u64(&self.created_at);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let owner = PublicKey::read(reader)?;

        let count = reader.read_u8()? as usize;
        if count > MAX_RECOVERY_AUTHORITIES {
            return Err(ReaderError::InvalidSize);
        }
        let mut authorities = Vec::with_capacity(count);
        for _ in 0..count {
            authorities.push(PublicKey::read(reader)?);
        }

        Ok(Self {
            owner,
            authorities,
            threshold: reader.read_u8()?,
            created_at: reader.read_u64()?,
        })
    }

    fn size(&self) -> usize {
        self.owner.size()
            + 1
            + self.authorities.iter().map(Serializer::size).sum::<usize>()
            + 1
            + 8
    }
}
