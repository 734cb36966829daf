// Warden Protocol Facade
// Single entry point tying the registry modules to a token ledger. Every
// operation reads through the canonical store, stages its writes in a
// StateOverlay and applies the overlay only after all checks and ledger
// moves succeeded. A failed operation leaves the registry untouched.
//
// Caller authentication happens at the host boundary: single-signer
// operations take the verified caller key, only recovery cosigners present
// real signatures.

mod error;

pub use error::*;

use crate::crypto::{Hash, PublicKey};
use crate::identity::{IdentityError, IdentityRecord, IdentityStatus};
use crate::recovery::{
    verify_recovery_approvals, LastTx, RecoveryApproval, RecoveryAuthority, RecoveryError,
    RecoveryState,
};
use crate::state::{RecordKey, RecordValue, RegistryStore, StateOverlay};
use crate::time::TimestampMillis;
use crate::token::{TokenError, TokenLedger};
use crate::transfer::{check_transfer, TransferContext};
use crate::two_auth::{TransactionApproval, TwoAuthError, TwoAuthParameters, TwoAuthRule};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Deployment parameters, decided by the host and passed in at construction
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolConfig {
    /// The gated mint
    pub mint: Hash,

    /// Decimals of the gated mint, checked on every ledger move
    pub decimals: u8,

    /// Key the protocol acts with at the token boundary
    pub authority: PublicKey,

    /// Keys allowed to issue and maintain identity attestations
    pub trusted_issuers: Vec<PublicKey>,
}

impl ProtocolConfig {
    pub fn new(
        mint: Hash,
        decimals: u8,
        authority: PublicKey,
        trusted_issuers: Vec<PublicKey>,
    ) -> Self {
        Self {
            mint,
            decimals,
            authority,
            trusted_issuers,
        }
    }

    pub fn is_trusted_issuer(&self, key: &PublicKey) -> bool {
        self.trusted_issuers.iter().any(|issuer| issuer == key)
    }
}

/// The protocol state machine over a token ledger
pub struct Protocol<L: TokenLedger> {
    config: ProtocolConfig,
    store: RegistryStore,
    ledger: L,
}

impl<L: TokenLedger> Protocol<L> {
    pub fn new(config: ProtocolConfig, ledger: L) -> Self {
        Self {
            config,
            store: RegistryStore::new(),
            ledger,
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    // ===== Record accessors =====

    pub fn identity(&self, token_account: &PublicKey) -> Option<&IdentityRecord> {
        self.store
            .get(&RecordKey::Identity(*token_account))
            .and_then(RecordValue::as_identity)
    }

    pub fn last_tx(&self, owner: &PublicKey) -> Option<&LastTx> {
        self.store
            .get(&RecordKey::LastTx(*owner))
            .and_then(RecordValue::as_last_tx)
    }

    pub fn recovery_authority(&self, owner: &PublicKey) -> Option<&RecoveryAuthority> {
        self.store
            .get(&RecordKey::RecoveryAuthority(*owner))
            .and_then(RecordValue::as_recovery_authority)
    }

    pub fn two_auth(&self, token_account: &PublicKey) -> Option<&TwoAuthParameters> {
        self.store
            .get(&RecordKey::TwoAuth(*token_account))
            .and_then(RecordValue::as_two_auth)
    }

    pub fn transaction_approval(&self, owner: &PublicKey) -> Option<&TransactionApproval> {
        self.store
            .get(&RecordKey::TransactionApproval(*owner))
            .and_then(RecordValue::as_transaction_approval)
    }

    // ===== Identity registry =====

    /// Issue an identity for a token account. The caller must be a trusted
    /// issuer and the account must exist on the gated mint.
    pub fn issue_identity(
        &mut self,
        caller: &PublicKey,
        owner: PublicKey,
        token_account: PublicKey,
        expires_at: TimestampMillis,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        if !self.config.is_trusted_issuer(caller) {
            return Err(ProtocolError::Unauthorized);
        }

        let account = self
            .ledger
            .account(&token_account)
            .ok_or(TokenError::AccountNotFound(token_account))?;
        if account.owner != owner {
            return Err(ProtocolError::Unauthorized);
        }
        if account.mint != self.config.mint {
            return Err(TokenError::MintMismatch.into());
        }

        let key = RecordKey::Identity(token_account);
        if let Some(existing) = self.store.get(&key).and_then(RecordValue::as_identity) {
            if existing.is_recovered() {
                return Err(IdentityError::AlreadyRecovered.into());
            }
            if existing.is_valid(now) {
                return Err(IdentityError::AlreadyExists.into());
            }
            // Expired and never recovered: the dead record is replaced
        }

        // Past expiries are accepted; the record is simply born expired
        let record = IdentityRecord::new(owner, token_account, *caller, expires_at, now);

        let mut overlay = StateOverlay::new();
        overlay.set(key, RecordValue::Identity(record));
        self.store.apply(overlay);

        info!(
            "identity issued for token account {} (expires {})",
            token_account, expires_at
        );
        Ok(())
    }

    /// Attach an additional issuer attestation to an existing record
    pub fn add_issuer(
        &mut self,
        caller: &PublicKey,
        token_account: &PublicKey,
        expires_at: TimestampMillis,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        if !self.config.is_trusted_issuer(caller) {
            return Err(ProtocolError::Unauthorized);
        }

        let key = RecordKey::Identity(*token_account);
        let mut record = self
            .store
            .get(&key)
            .and_then(RecordValue::as_identity)
            .ok_or(IdentityError::NotFound)?
            .clone();
        record.add_attestation(*caller, expires_at, now)?;

        let mut overlay = StateOverlay::new();
        overlay.set(key, RecordValue::Identity(record));
        self.store.apply(overlay);

        info!("issuer {} attested token account {}", caller, token_account);
        Ok(())
    }

    /// Extend the caller's own attestation on a record, reactivating it if
    /// it was revoked
    pub fn renew_attestation(
        &mut self,
        caller: &PublicKey,
        token_account: &PublicKey,
        expires_at: TimestampMillis,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        if !self.config.is_trusted_issuer(caller) {
            return Err(ProtocolError::Unauthorized);
        }

        let key = RecordKey::Identity(*token_account);
        let mut record = self
            .store
            .get(&key)
            .and_then(RecordValue::as_identity)
            .ok_or(IdentityError::NotFound)?
            .clone();
        let attestation = record
            .attestation_mut(caller)
            .ok_or(IdentityError::NotFound)?;
        attestation.renew(expires_at, now);

        let mut overlay = StateOverlay::new();
        overlay.set(key, RecordValue::Identity(record));
        self.store.apply(overlay);

        debug!(
            "attestation renewed on {} until {}",
            token_account, expires_at
        );
        Ok(())
    }

    /// Deactivate the caller's own attestation on a record
    pub fn revoke_attestation(
        &mut self,
        caller: &PublicKey,
        token_account: &PublicKey,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        if !self.config.is_trusted_issuer(caller) {
            return Err(ProtocolError::Unauthorized);
        }

        let key = RecordKey::Identity(*token_account);
        let mut record = self
            .store
            .get(&key)
            .and_then(RecordValue::as_identity)
            .ok_or(IdentityError::NotFound)?
            .clone();
        let attestation = record
            .attestation_mut(caller)
            .ok_or(IdentityError::NotFound)?;
        attestation.revoke(now);

        let mut overlay = StateOverlay::new();
        overlay.set(key, RecordValue::Identity(record));
        self.store.apply(overlay);

        info!("attestation revoked on {} by {}", token_account, caller);
        Ok(())
    }

    /// Report the identity status of a token account
    pub fn check_identity(
        &self,
        token_account: &PublicKey,
        now: TimestampMillis,
    ) -> IdentityStatus {
        match self.identity(token_account) {
            Some(record) => record.status(now),
            None => IdentityStatus::NotFound,
        }
    }

    // ===== Last-transaction ledger =====

    /// Create the owner's last-transaction marker
    pub fn initialize_last_tx(
        &mut self,
        owner: PublicKey,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        let key = RecordKey::LastTx(owner);
        if self.store.contains(&key) {
            return Err(RecoveryError::LastTxAlreadyExists.into());
        }

        let mut overlay = StateOverlay::new();
        overlay.set(key, RecordValue::LastTx(LastTx::new(owner, now)));
        self.store.apply(overlay);

        debug!("last-transaction marker created for {}", owner);
        Ok(())
    }

    // ===== Recovery =====

    /// Observable recovery lifecycle for an owner and one of their accounts
    pub fn recovery_state(&self, owner: &PublicKey, token_account: &PublicKey) -> RecoveryState {
        if self
            .identity(token_account)
            .is_some_and(IdentityRecord::is_recovered)
        {
            RecoveryState::Recovered
        } else if self.recovery_authority(owner).is_some() {
            RecoveryState::AuthoritySet
        } else {
            RecoveryState::Uninitialized
        }
    }

    /// Register the owner's cosigning authorities.
    ///
    /// Also establishes the owner's last-transaction marker, bumping it when
    /// one already exists so previously gathered approvals go stale.
    pub fn initialize_recovery(
        &mut self,
        owner: PublicKey,
        authorities: Vec<PublicKey>,
        threshold: u8,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        let key = RecordKey::RecoveryAuthority(owner);
        if self.store.contains(&key) {
            return Err(RecoveryError::AlreadyConfigured.into());
        }

        let set = RecoveryAuthority::new(owner, authorities, threshold, now);
        set.validate()?;
        let count = set.authority_count();

        let last_tx = match self.last_tx(&owner).cloned() {
            Some(mut existing) => {
                existing.bump(now);
                existing
            }
            None => LastTx::new(owner, now),
        };

        let mut overlay = StateOverlay::new();
        overlay.set(RecordKey::LastTx(owner), RecordValue::LastTx(last_tx));
        overlay.set(key, RecordValue::RecoveryAuthority(set));
        self.store.apply(overlay);

        info!(
            "recovery configured for {}: {}-of-{}",
            owner, threshold, count
        );
        Ok(())
    }

    /// Execute a threshold-cosigned recovery.
    ///
    /// Moves the old account's full balance to the new account, attempts to
    /// close the old account and appends the binding to the identity record.
    /// A missing close authority downgrades the close to a warning; the
    /// emptied account stays open and the binding still commits.
    pub fn recover_account(
        &mut self,
        old_token_account: &PublicKey,
        new_owner: PublicKey,
        new_token_account: PublicKey,
        approvals: &[RecoveryApproval],
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        let identity_key = RecordKey::Identity(*old_token_account);
        let record = self
            .store
            .get(&identity_key)
            .and_then(RecordValue::as_identity)
            .ok_or(IdentityError::NotFound)?
            .clone();
        if record.is_recovered() {
            return Err(IdentityError::AlreadyRecovered.into());
        }
        let owner = record.owner;

        let last_tx = self
            .last_tx(&owner)
            .cloned()
            .ok_or(RecoveryError::LastTxNotFound)?;

        let new_account = self
            .ledger
            .account(&new_token_account)
            .ok_or(TokenError::AccountNotFound(new_token_account))?;
        if new_account.owner != new_owner {
            return Err(ProtocolError::Unauthorized);
        }
        if new_account.mint != self.config.mint {
            return Err(TokenError::MintMismatch.into());
        }

        let authority_set = self
            .recovery_authority(&owner)
            .ok_or(RecoveryError::NotConfigured)?;
        let verification = verify_recovery_approvals(
            authority_set,
            approvals,
            old_token_account,
            &new_token_account,
            &new_owner,
            last_tx.sequence,
            now,
        )?;

        // Balance migration bypasses the transfer gate
        let balance = self
            .ledger
            .account(old_token_account)
            .ok_or(TokenError::AccountNotFound(*old_token_account))?
            .balance;
        if balance > 0 {
            self.ledger.transfer_checked(
                old_token_account,
                &new_token_account,
                balance,
                self.config.decimals,
            )?;
        }

        let close_authority = self.config.authority;
        match self.ledger.close_account(old_token_account, &close_authority) {
            Ok(()) => debug!("closed recovered token account {}", old_token_account),
            Err(TokenError::MissingCloseAuthority) => {
                warn!(
                    "close authority not held for {}, leaving emptied account open",
                    old_token_account
                );
            }
            Err(err) => return Err(err.into()),
        }

        let mut record = record;
        record.record_recovery(new_token_account);
        let mut last_tx = last_tx;
        last_tx.bump(now);

        let mut overlay = StateOverlay::new();
        overlay.set(identity_key, RecordValue::Identity(record));
        overlay.set(RecordKey::LastTx(owner), RecordValue::LastTx(last_tx));
        self.store.apply(overlay);

        info!(
            "account {} recovered to {} with {} cosigner(s), {} moved",
            old_token_account, new_token_account, verification.valid_count, balance
        );
        Ok(())
    }

    // ===== Two-auth =====

    /// Register a two-auth policy for a token account. Owner only.
    pub fn initialize_two_auth(
        &mut self,
        caller: &PublicKey,
        token_account: PublicKey,
        rules: Vec<TwoAuthRule>,
        approvers: Vec<PublicKey>,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        let account = self
            .ledger
            .account(&token_account)
            .ok_or(TokenError::AccountNotFound(token_account))?;
        if account.owner != *caller {
            return Err(ProtocolError::Unauthorized);
        }

        let key = RecordKey::TwoAuth(token_account);
        if self.store.contains(&key) {
            return Err(TwoAuthError::AlreadyConfigured.into());
        }

        let params = TwoAuthParameters::new(*caller, token_account, rules, approvers, now);
        params.validate()?;
        let rule_count = params.rules.len();

        let mut overlay = StateOverlay::new();
        overlay.set(key, RecordValue::TwoAuth(params));
        self.store.apply(overlay);

        info!(
            "two-auth policy configured for {} with {} rule(s)",
            token_account, rule_count
        );
        Ok(())
    }

    /// Grant a transfer authorization. The approver must belong to the
    /// policy's approver set; the grant overwrites the owner's slot.
    pub fn approve_transaction(
        &mut self,
        approver: &PublicKey,
        source: &PublicKey,
        destination: PublicKey,
        amount: u64,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        let owner = self
            .ledger
            .account(source)
            .ok_or(TokenError::AccountNotFound(*source))?
            .owner;

        let policy = self.two_auth(source).ok_or(TwoAuthError::NotConfigured)?;
        if !policy.is_approver(approver) {
            return Err(ProtocolError::Unauthorized);
        }

        let approval = TransactionApproval::new(*source, destination, amount, now, *approver);

        let mut overlay = StateOverlay::new();
        overlay.set(
            RecordKey::TransactionApproval(owner),
            RecordValue::TransactionApproval(approval),
        );
        self.store.apply(overlay);

        debug!(
            "transfer authorization granted: {} -> {} amount {}",
            source, destination, amount
        );
        Ok(())
    }

    // ===== Transfers =====

    /// Run the gate over a transfer and execute it.
    ///
    /// On success the spent authorization slot is marked consumed and the
    /// owner's last-transaction marker advances. On any failure no registry
    /// record changes.
    pub fn transfer(
        &mut self,
        source: &PublicKey,
        destination: &PublicKey,
        amount: u64,
        now: TimestampMillis,
    ) -> ProtocolResult<()> {
        let source_owner = self
            .ledger
            .account(source)
            .ok_or(TokenError::AccountNotFound(*source))?
            .owner;

        let approval = self.transaction_approval(&source_owner);
        let context = TransferContext {
            source_token_account: source,
            destination_token_account: destination,
            amount,
            source_identity: self.identity(source),
            destination_identity: self.identity(destination),
            policy: self.two_auth(source),
            approval,
        };
        let verdict = check_transfer(&context, now)?;
        let spent_slot = if verdict.approval_consumed {
            approval.copied()
        } else {
            None
        };

        self.ledger
            .transfer_checked(source, destination, amount, self.config.decimals)?;

        let mut overlay = StateOverlay::new();
        if let Some(mut slot) = spent_slot {
            slot.consume();
            overlay.set(
                RecordKey::TransactionApproval(source_owner),
                RecordValue::TransactionApproval(slot),
            );
        }
        if let Some(mut last_tx) = self.last_tx(&source_owner).cloned() {
            last_tx.bump(now);
            overlay.set(RecordKey::LastTx(source_owner), RecordValue::LastTx(last_tx));
        }
        self.store.apply(overlay);

        debug!("transfer {} -> {} amount {}", source, destination, amount);
        Ok(())
    }
}
