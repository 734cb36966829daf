// Warden Registry State
// Overlay-buffered storage for protocol records. Operations accumulate
// writes in a StateOverlay; on success the overlay is applied to the
// canonical RegistryStore, on failure it is dropped. Reads resolve through
// the overlay first so an operation observes its own writes.

use crate::crypto::{derive_record_address, Hash, PublicKey};
use crate::identity::IdentityRecord;
use crate::recovery::{LastTx, RecoveryAuthority};
use crate::two_auth::{TransactionApproval, TwoAuthParameters};
use std::collections::HashMap;

/// Key types for registry storage
///
/// Each variant is one record purpose keyed by the public key that owns it.
/// Identity and two-auth records hang off the token account, the rest off
/// the wallet owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Identity record for a token account
    Identity(PublicKey),
    /// Last-transaction marker for an owner
    LastTx(PublicKey),
    /// Recovery authority set for an owner
    RecoveryAuthority(PublicKey),
    /// Two-auth policy for a token account
    TwoAuth(PublicKey),
    /// Pending transfer authorization slot for an owner
    TransactionApproval(PublicKey),
}

impl RecordKey {
    /// Purpose tag mixed into the derived address
    pub fn purpose(&self) -> &'static str {
        match self {
            Self::Identity(_) => "identity",
            Self::LastTx(_) => "last_tx",
            Self::RecoveryAuthority(_) => "recovery_authority",
            Self::TwoAuth(_) => "two_auth",
            Self::TransactionApproval(_) => "transaction_approval",
        }
    }

    fn subject(&self) -> &PublicKey {
        match self {
            Self::Identity(key)
            | Self::LastTx(key)
            | Self::RecoveryAuthority(key)
            | Self::TwoAuth(key)
            | Self::TransactionApproval(key) => key,
        }
    }

    /// Deterministic record address: same purpose and subject always map to
    /// the same location
    pub fn address(&self) -> Hash {
        derive_record_address(self.purpose().as_bytes(), self.subject())
    }
}

/// Value types for registry storage
///
/// The `Deleted` variant marks a key as deleted (tombstone).
#[derive(Debug, Clone)]
pub enum RecordValue {
    Identity(IdentityRecord),
    LastTx(LastTx),
    RecoveryAuthority(RecoveryAuthority),
    TwoAuth(TwoAuthParameters),
    TransactionApproval(TransactionApproval),
    /// Marks a key as deleted
    Deleted,
}

impl RecordValue {
    pub fn as_identity(&self) -> Option<&IdentityRecord> {
        match self {
            Self::Identity(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_last_tx(&self) -> Option<&LastTx> {
        match self {
            Self::LastTx(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_recovery_authority(&self) -> Option<&RecoveryAuthority> {
        match self {
            Self::RecoveryAuthority(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_two_auth(&self) -> Option<&TwoAuthParameters> {
        match self {
            Self::TwoAuth(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_transaction_approval(&self) -> Option<&TransactionApproval> {
        match self {
            Self::TransactionApproval(record) => Some(record),
            _ => None,
        }
    }
}

/// Overlay cache for protocol operations
///
/// Accumulates writes during an operation. On success, changes are applied
/// to the store. On failure, they are dropped.
#[derive(Debug, Clone, Default)]
pub struct StateOverlay {
    /// Changes to be applied (key -> value)
    pub changes: HashMap<RecordKey, RecordValue>,
}

impl StateOverlay {
    pub fn new() -> Self {
        Self {
            changes: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Get a value from the overlay (returns None if not in overlay)
    pub fn get(&self, key: &RecordKey) -> Option<&RecordValue> {
        self.changes.get(key)
    }

    /// Set a value in the overlay
    pub fn set(&mut self, key: RecordKey, value: RecordValue) {
        self.changes.insert(key, value);
    }

    /// Mark a key as deleted in the overlay
    pub fn delete(&mut self, key: RecordKey) {
        self.changes.insert(key, RecordValue::Deleted);
    }

    /// Check if a key is marked as deleted
    pub fn is_deleted(&self, key: &RecordKey) -> bool {
        matches!(self.get(key), Some(RecordValue::Deleted))
    }

    /// Clear all changes from the overlay
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Merge another overlay into this one (other's changes take precedence)
    pub fn merge(&mut self, other: StateOverlay) {
        for (key, value) in other.changes {
            self.changes.insert(key, value);
        }
    }
}

/// Canonical record store
#[derive(Debug, Clone, Default)]
pub struct RegistryStore {
    records: HashMap<RecordKey, RecordValue>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    pub fn get(&self, key: &RecordKey) -> Option<&RecordValue> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate all stored records
    pub fn records(&self) -> impl Iterator<Item = (&RecordKey, &RecordValue)> {
        self.records.iter()
    }

    /// Read through an overlay: overlay writes shadow the store and
    /// tombstones hide it
    pub fn resolve<'a>(
        &'a self,
        overlay: &'a StateOverlay,
        key: &RecordKey,
    ) -> Option<&'a RecordValue> {
        match overlay.get(key) {
            Some(RecordValue::Deleted) => None,
            Some(value) => Some(value),
            None => self.records.get(key),
        }
    }

    /// Apply an overlay's changes. Tombstones remove records, everything
    /// else overwrites.
    pub fn apply(&mut self, overlay: StateOverlay) {
        for (key, value) in overlay.changes {
            match value {
                RecordValue::Deleted => {
                    self.records.remove(&key);
                }
                value => {
                    self.records.insert(key, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(tag: u8) -> PublicKey {
        PublicKey::from_bytes([tag; 32])
    }

    fn last_tx_value(sequence: u64) -> RecordValue {
        let mut record = LastTx::new(key(1), 1_000);
        for _ in 0..sequence {
            record.bump(1_000);
        }
        RecordValue::LastTx(record)
    }

    #[test]
    fn test_overlay_shadows_store() {
        let mut store = RegistryStore::new();
        let mut base = StateOverlay::new();
        base.set(RecordKey::LastTx(key(1)), last_tx_value(0));
        store.apply(base);

        let mut overlay = StateOverlay::new();
        overlay.set(RecordKey::LastTx(key(1)), last_tx_value(5));

        let resolved = store
            .resolve(&overlay, &RecordKey::LastTx(key(1)))
            .and_then(RecordValue::as_last_tx)
            .unwrap();
        assert_eq!(resolved.sequence, 5);
    }

    #[test]
    fn test_tombstone_hides_store_record() {
        let mut store = RegistryStore::new();
        let mut base = StateOverlay::new();
        base.set(RecordKey::LastTx(key(1)), last_tx_value(0));
        store.apply(base);

        let mut overlay = StateOverlay::new();
        overlay.delete(RecordKey::LastTx(key(1)));

        assert!(overlay.is_deleted(&RecordKey::LastTx(key(1))));
        assert!(store
            .resolve(&overlay, &RecordKey::LastTx(key(1)))
            .is_none());
        // The store itself is untouched until the overlay is applied
        assert!(store.contains(&RecordKey::LastTx(key(1))));
    }

    #[test]
    fn test_apply_removes_tombstoned_records() {
        let mut store = RegistryStore::new();
        let mut base = StateOverlay::new();
        base.set(RecordKey::LastTx(key(1)), last_tx_value(0));
        base.set(RecordKey::LastTx(key(2)), last_tx_value(0));
        store.apply(base);

        let mut overlay = StateOverlay::new();
        overlay.delete(RecordKey::LastTx(key(1)));
        store.apply(overlay);

        assert!(!store.contains(&RecordKey::LastTx(key(1))));
        assert!(store.contains(&RecordKey::LastTx(key(2))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_merge_precedence() {
        let mut first = StateOverlay::new();
        first.set(RecordKey::LastTx(key(1)), last_tx_value(1));

        let mut second = StateOverlay::new();
        second.set(RecordKey::LastTx(key(1)), last_tx_value(2));

        first.merge(second);
        let merged = first
            .get(&RecordKey::LastTx(key(1)))
            .and_then(RecordValue::as_last_tx)
            .unwrap();
        assert_eq!(merged.sequence, 2);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_record_addresses_are_purpose_separated() {
        let identity = RecordKey::Identity(key(1));
        let two_auth = RecordKey::TwoAuth(key(1));
        let other_identity = RecordKey::Identity(key(2));

        assert_ne!(identity.address(), two_auth.address());
        assert_ne!(identity.address(), other_identity.address());
        // Stable across derivations
        assert_eq!(identity.address(), RecordKey::Identity(key(1)).address());
    }
}
