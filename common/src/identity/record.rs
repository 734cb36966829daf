// IdentityRecord - on-chain identity data for a token account
//
// A record is created by a trusted issuer and carries one attestation per
// issuer key. The recovered_token_addresses sequence is empty for live
// identities; once recovery executes, the replacement account is inserted at
// index 0 and the record is terminally Recovered.

use crate::config::MAX_ISSUER_ATTESTATIONS;
use crate::crypto::PublicKey;
use crate::identity::{IdentityError, IdentityResult, IdentityStatus};
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampMillis;
use serde::{Deserialize, Serialize};

/// A single issuer's attestation over an identity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssuerAttestation {
    /// Issuer key that vouched for the identity
    pub issuer: PublicKey,

    /// Timestamp of the last issuer action on this attestation
    pub last_modified: TimestampMillis,

    /// Absolute expiry; `expires_at <= now` means expired.
    /// Zero or any past value yields an attestation born expired.
    pub expires_at: TimestampMillis,

    /// Cleared when the issuer revokes the attestation
    pub active: bool,
}

impl IssuerAttestation {
    pub fn new(issuer: PublicKey, expires_at: TimestampMillis, now: TimestampMillis) -> Self {
        Self {
            issuer,
            last_modified: now,
            expires_at,
            active: true,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: TimestampMillis) -> bool {
        self.expires_at <= now
    }

    /// Active and unexpired
    #[inline]
    pub fn is_live(&self, now: TimestampMillis) -> bool {
        self.active && !self.is_expired(now)
    }

    /// Refresh the expiry window and reactivate
    pub fn renew(&mut self, expires_at: TimestampMillis, now: TimestampMillis) {
        self.expires_at = expires_at;
        self.last_modified = now;
        self.active = true;
    }

    /// Deactivate without touching the expiry window
    pub fn revoke(&mut self, now: TimestampMillis) {
        self.active = false;
        self.last_modified = now;
    }
}

impl Serializer for IssuerAttestation {
    fn write(&self, writer: &mut Writer) {
        self.issuer.write(writer);
        writer.write_u64(&self.last_modified);
        writer.write_u64(&self.expires_at);
        writer.write_bool(self.active);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            issuer: PublicKey::read(reader)?,
            last_modified: reader.read_u64()?,
            expires_at: reader.read_u64()?,
            active: reader.read_bool()?,
        })
    }

    fn size(&self) -> usize {
        self.issuer.size() + 8 + 8 + 1
    }
}

/// Identity record registered for a token account.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    /// Wallet that owns the token account
    pub owner: PublicKey,

    /// Token account the identity is bound to
    pub token_account: PublicKey,

    /// One attestation per issuer key
    pub attestations: Vec<IssuerAttestation>,

    /// Recovery destinations, most recent first. Non-empty means Recovered.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub recovered_token_addresses: Vec<PublicKey>,
}

impl IdentityRecord {
    /// Create a record with a single initial attestation.
    pub fn new(
        owner: PublicKey,
        token_account: PublicKey,
        issuer: PublicKey,
        expires_at: TimestampMillis,
        now: TimestampMillis,
    ) -> Self {
        Self {
            owner,
            token_account,
            attestations: vec![IssuerAttestation::new(issuer, expires_at, now)],
            recovered_token_addresses: Vec::new(),
        }
    }

    /// Classify the record. Recovered wins over everything else.
    pub fn status(&self, now: TimestampMillis) -> IdentityStatus {
        if self.is_recovered() {
            IdentityStatus::Recovered
        } else if self.attestations.iter().any(|a| a.is_live(now)) {
            IdentityStatus::Valid
        } else {
            IdentityStatus::Expired
        }
    }

    #[inline]
    pub fn is_valid(&self, now: TimestampMillis) -> bool {
        self.status(now) == IdentityStatus::Valid
    }

    #[inline]
    pub fn is_recovered(&self) -> bool {
        !self.recovered_token_addresses.is_empty()
    }

    /// Most recent recovery destination, if any.
    #[inline]
    pub fn recovery_destination(&self) -> Option<&PublicKey> {
        self.recovered_token_addresses.first()
    }

    pub fn attestation(&self, issuer: &PublicKey) -> Option<&IssuerAttestation> {
        self.attestations.iter().find(|a| a.issuer == *issuer)
    }

    pub fn attestation_mut(&mut self, issuer: &PublicKey) -> Option<&mut IssuerAttestation> {
        self.attestations.iter_mut().find(|a| a.issuer == *issuer)
    }

    /// Append an attestation from a new issuer key.
    pub fn add_attestation(
        &mut self,
        issuer: PublicKey,
        expires_at: TimestampMillis,
        now: TimestampMillis,
    ) -> IdentityResult<()> {
        if self.attestation(&issuer).is_some() {
            return Err(IdentityError::AlreadyExists);
        }
        if self.attestations.len() >= MAX_ISSUER_ATTESTATIONS {
            return Err(IdentityError::AttestationLimitReached {
                max: MAX_ISSUER_ATTESTATIONS,
            });
        }

        self.attestations
            .push(IssuerAttestation::new(issuer, expires_at, now));
        Ok(())
    }

    /// Record a recovery destination; index 0 stays the most recent.
    pub fn record_recovery(&mut self, new_token_account: PublicKey) {
        self.recovered_token_addresses.insert(0, new_token_account);
    }
}

impl Serializer for IdentityRecord {
    fn write(&self, writer: &mut Writer) {
        self.owner.write(writer);
        self.token_account.write(writer);

        writer.write_u8(self.attestations.len() as u8);
        for attestation in &self.attestations {
            attestation.write(writer);
        }

        writer.write_u8(self.recovered_token_addresses.len() as u8);
        for address in &self.recovered_token_addresses {
            address.write(writer);
        }
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let owner = PublicKey::read(reader)?;
        let token_account = PublicKey::read(reader)?;

        let count = reader.read_u8()? as usize;
        if count > MAX_ISSUER_ATTESTATIONS {
            return Err(ReaderError::InvalidSize);
        }
        let mut attestations = Vec::with_capacity(count);
        for _ in 0..count {
            attestations.push(IssuerAttestation::read(reader)?);
        }

        let count = reader.read_u8()? as usize;
        let mut recovered_token_addresses = Vec::with_capacity(count);
        for _ in 0..count {
            recovered_token_addresses.push(PublicKey::read(reader)?);
        }

        Ok(Self {
            owner,
            token_account,
            attestations,
            recovered_token_addresses,
        })
    }

    fn size(&self) -> usize {
        self.owner.size()
            + self.token_account.size()
            + 1
            + self.attestations.iter().map(Serializer::size).sum::<usize>()
            + 1
            + self
                .recovered_token_addresses
                .iter()
                .map(Serializer::size)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> PublicKey {
        PublicKey::from_bytes([byte; 32])
    }

    fn record(expires_at: TimestampMillis, now: TimestampMillis) -> IdentityRecord {
        IdentityRecord::new(key(1), key(2), key(3), expires_at, now)
    }

    #[test]
    fn test_new_record_is_valid() {
        let record = record(10_000, 1_000);
        assert_eq!(record.status(5_000), IdentityStatus::Valid);
        assert!(record.is_valid(5_000));
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let record = record(10_000, 1_000);
        // expires_at <= now counts as expired
        assert_eq!(record.status(10_000), IdentityStatus::Expired);
        assert_eq!(record.status(9_999), IdentityStatus::Valid);
    }

    #[test]
    fn test_zero_expiry_is_born_expired() {
        let record = record(0, 0);
        assert_eq!(record.status(0), IdentityStatus::Expired);
        assert_eq!(record.status(1_000), IdentityStatus::Expired);
    }

    #[test]
    fn test_revoked_record_classifies_expired() {
        let mut record = record(10_000, 1_000);
        record
            .attestation_mut(&key(3))
            .unwrap()
            .revoke(2_000);
        assert_eq!(record.status(5_000), IdentityStatus::Expired);
    }

    #[test]
    fn test_renew_restores_validity() {
        let mut record = record(10_000, 1_000);
        record.attestation_mut(&key(3)).unwrap().revoke(2_000);
        record
            .attestation_mut(&key(3))
            .unwrap()
            .renew(50_000, 3_000);
        assert_eq!(record.status(20_000), IdentityStatus::Valid);
    }

    #[test]
    fn test_any_live_attestation_is_enough() {
        let mut record = record(5_000, 1_000);
        record.add_attestation(key(4), 100_000, 1_000).unwrap();
        // First attestation expired, second still live
        assert_eq!(record.status(60_000), IdentityStatus::Expired);
        assert_eq!(record.status(50_000), IdentityStatus::Valid);
    }

    #[test]
    fn test_duplicate_attestation_rejected() {
        let mut record = record(10_000, 1_000);
        assert_eq!(
            record.add_attestation(key(3), 20_000, 2_000),
            Err(IdentityError::AlreadyExists)
        );
    }

    #[test]
    fn test_attestation_limit() {
        let mut record = record(10_000, 1_000);
        for i in 0..MAX_ISSUER_ATTESTATIONS as u8 - 1 {
            record.add_attestation(key(100 + i), 10_000, 1_000).unwrap();
        }
        assert!(matches!(
            record.add_attestation(key(200), 10_000, 1_000),
            Err(IdentityError::AttestationLimitReached { .. })
        ));
    }

    #[test]
    fn test_recovered_wins_over_valid() {
        let mut record = record(u64::MAX, 1_000);
        record.record_recovery(key(9));
        assert_eq!(record.status(2_000), IdentityStatus::Recovered);
        assert!(!record.is_valid(2_000));
    }

    #[test]
    fn test_recovery_destination_ordering() {
        let mut record = record(10_000, 1_000);
        record.record_recovery(key(8));
        record.record_recovery(key(9));
        // Most recent first
        assert_eq!(record.recovery_destination(), Some(&key(9)));
        assert_eq!(record.recovered_token_addresses, vec![key(9), key(8)]);
    }

    #[test]
    fn test_serializer_roundtrip() {
        let mut record = record(10_000, 1_000);
        record.add_attestation(key(4), 20_000, 1_500).unwrap();
        record.record_recovery(key(9));

        let bytes = record.to_bytes();
        let decoded = <IdentityRecord as Serializer>::from_bytes(&bytes).unwrap();
        assert_eq!(record, decoded);
        assert_eq!(record.size(), bytes.len());
    }

    #[test]
    fn test_json_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let record = record(10_000, 1_000);
        let json = serde_json::to_string(&record)?;
        assert!(json.contains("tokenAccount"));

        let decoded: IdentityRecord = serde_json::from_str(&json)?;
        assert_eq!(record, decoded);
        Ok(())
    }
}
