// File: testing-framework/src/utilities/mod.rs
//
// Utilities Module
//
// Scenario harness over the protocol facade. A `Harness` owns a protocol
// instance backed by the in-memory ledger plus a deterministic environment,
// and exposes the handful of operations every scenario repeats: minting
// actors, issuing identities, wiring recovery and two-auth, moving funds.

use anyhow::Result;

use warden_common::crypto::{hash, Hash, KeyPair, PublicKey};
use warden_common::protocol::{Protocol, ProtocolConfig, ProtocolResult};
use warden_common::recovery::RecoveryApproval;
use warden_common::time::TimestampMillis;
use warden_common::token::{MemoryTokenLedger, TokenLedger};
use warden_common::two_auth::TwoAuthRule;

use crate::orchestrator::TestEnv;

/// Decimals used by the harness mint unless overridden
pub const TEST_DECIMALS: u8 = 6;

/// Identity validity used by [`Harness::issue_default_identity`]
pub const DEFAULT_IDENTITY_VALIDITY_MILLIS: u64 = 365 * 24 * 3_600 * 1_000;

/// A participant in a scenario: one owner keypair and one token account
pub struct Actor {
    /// Owner keypair, used to derive the authenticated caller
    pub keypair: KeyPair,

    /// Address of the actor's token account
    pub token_account: PublicKey,
}

impl Actor {
    /// The owner key of this actor's token account
    pub fn owner(&self) -> PublicKey {
        self.keypair.public_key()
    }
}

/// Builder for [`Harness`] in the usual fluent style
///
/// # Example
///
/// ```rust
/// use warden_testing_framework::utilities::HarnessBuilder;
///
/// let harness = HarnessBuilder::new()
///     .with_seed(7)
///     .with_decimals(2)
///     .build()
///     .unwrap();
/// assert_eq!(harness.protocol.config().decimals, 2);
/// ```
pub struct HarnessBuilder {
    seed: Option<u64>,
    decimals: u8,
    extra_issuers: Vec<PublicKey>,
}

impl HarnessBuilder {
    /// Builder with default decimals and an environment-chosen seed
    pub fn new() -> Self {
        Self {
            seed: None,
            decimals: TEST_DECIMALS,
            extra_issuers: Vec::new(),
        }
    }

    /// Pin the RNG seed instead of taking one from the environment
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the mint's decimals
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Trust an additional identity issuer beyond the harness default
    pub fn with_extra_issuer(mut self, issuer: PublicKey) -> Self {
        self.extra_issuers.push(issuer);
        self
    }

    /// Assemble the harness: mint created, issuer trusted, ledger empty
    pub fn build(self) -> Result<Harness> {
        let env = match self.seed {
            Some(seed) => TestEnv::with_seed(seed),
            None => TestEnv::new(),
        };

        let issuer = env.rng.keypair();
        let authority = env.rng.public_key();
        let mint = hash(b"warden-harness-mint");

        let mut ledger = MemoryTokenLedger::new();
        ledger.create_mint(mint.clone(), self.decimals)?;

        let mut trusted_issuers = vec![issuer.public_key()];
        trusted_issuers.extend(self.extra_issuers);

        let config = ProtocolConfig::new(mint.clone(), self.decimals, authority, trusted_issuers);

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Harness ready: seed={}, decimals={}, trusted_issuers={}",
                env.seed(),
                self.decimals,
                config.trusted_issuers.len()
            );
        }

        Ok(Harness {
            protocol: Protocol::new(config, ledger),
            env,
            issuer,
            mint,
        })
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a scenario needs in one place
pub struct Harness {
    /// Protocol under test, backed by the in-memory ledger
    pub protocol: Protocol<MemoryTokenLedger>,

    /// Deterministic clock and RNG driving the scenario
    pub env: TestEnv,

    issuer: KeyPair,
    mint: Hash,
}

impl Harness {
    /// Start configuring a harness
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::new()
    }

    /// Harness with an environment-seeded RNG and default decimals
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Current scenario time
    pub fn now(&self) -> TimestampMillis {
        self.env.now()
    }

    /// Move scenario time forward by `millis`
    pub fn advance(&self, millis: u64) {
        self.env.advance_time(millis);
    }

    /// Mint every harness account belongs to
    pub fn mint(&self) -> &Hash {
        &self.mint
    }

    /// Public key of the harness's trusted identity issuer
    pub fn issuer_key(&self) -> PublicKey {
        self.issuer.public_key()
    }

    // ===== Actors =====

    /// Create an actor with a funded token account closable by the protocol
    /// authority
    pub fn actor(&mut self, balance: u64) -> Result<Actor> {
        let close_authority = Some(self.protocol.config().authority);
        self.actor_with_close_authority(balance, close_authority)
    }

    /// Create an actor whose account carries no close authority, so recovery
    /// can empty it but never close it
    pub fn actor_without_close_authority(&mut self, balance: u64) -> Result<Actor> {
        self.actor_with_close_authority(balance, None)
    }

    fn actor_with_close_authority(
        &mut self,
        balance: u64,
        close_authority: Option<PublicKey>,
    ) -> Result<Actor> {
        let keypair = self.env.rng.keypair();
        let token_account = self.env.rng.public_key();
        self.protocol.ledger_mut().create_account(
            token_account,
            &self.mint,
            keypair.public_key(),
            close_authority,
        )?;
        if balance > 0 {
            self.protocol
                .ledger_mut()
                .mint_to(&self.mint, &token_account, balance)?;
        }
        Ok(Actor {
            keypair,
            token_account,
        })
    }

    /// Current balance of the actor's token account, zero if closed
    pub fn balance(&self, actor: &Actor) -> u64 {
        self.protocol
            .ledger()
            .account(&actor.token_account)
            .map(|account| account.balance)
            .unwrap_or(0)
    }

    // ===== Identity =====

    /// Issue an identity valid for `validity_millis` from the current time
    pub fn issue_identity(&mut self, actor: &Actor, validity_millis: u64) -> Result<()> {
        let now = self.now();
        self.protocol.issue_identity(
            &self.issuer.public_key(),
            actor.owner(),
            actor.token_account,
            now.saturating_add(validity_millis),
            now,
        )?;
        Ok(())
    }

    /// Issue an identity that outlives any realistic scenario
    pub fn issue_default_identity(&mut self, actor: &Actor) -> Result<()> {
        self.issue_identity(actor, DEFAULT_IDENTITY_VALIDITY_MILLIS)
    }

    // ===== Recovery =====

    /// Generate `count` cosigner keypairs from the scenario RNG
    pub fn cosigners(&self, count: usize) -> Vec<KeyPair> {
        (0..count).map(|_| self.env.rng.keypair()).collect()
    }

    /// Register a cosigner set and threshold for the actor's owner
    pub fn configure_recovery(
        &mut self,
        actor: &Actor,
        cosigners: &[KeyPair],
        threshold: u8,
    ) -> Result<()> {
        let now = self.now();
        let authorities = cosigners.iter().map(KeyPair::public_key).collect();
        self.protocol
            .initialize_recovery(actor.owner(), authorities, threshold, now)?;
        Ok(())
    }

    /// Produce one cosigner approval bound to the owner's live sequence
    /// number. Approvals created before a later transfer go stale with it.
    pub fn cosign_recovery(
        &self,
        cosigner: &KeyPair,
        old: &Actor,
        new: &Actor,
    ) -> RecoveryApproval {
        let sequence = self
            .protocol
            .last_tx(&old.owner())
            .map(|marker| marker.sequence)
            .unwrap_or(0);
        let timestamp = self.now();
        let message = RecoveryApproval::build_recovery_message(
            &old.token_account,
            &new.token_account,
            &new.owner(),
            sequence,
            timestamp,
        );
        RecoveryApproval::new(cosigner.public_key(), cosigner.sign(&message), timestamp)
    }

    /// Execute recovery of `old` into `new` with the given approvals
    pub fn recover(
        &mut self,
        old: &Actor,
        new: &Actor,
        approvals: &[RecoveryApproval],
    ) -> ProtocolResult<()> {
        let now = self.now();
        self.protocol.recover_account(
            &old.token_account,
            new.owner(),
            new.token_account,
            approvals,
            now,
        )
    }

    // ===== Two-auth =====

    /// Attach a two-auth policy to the actor's token account
    pub fn configure_two_auth(
        &mut self,
        actor: &Actor,
        rules: Vec<TwoAuthRule>,
        approvers: Vec<PublicKey>,
    ) -> Result<()> {
        let now = self.now();
        self.protocol.initialize_two_auth(
            &actor.owner(),
            actor.token_account,
            rules,
            approvers,
            now,
        )?;
        Ok(())
    }

    /// Pre-approve an exact transfer on behalf of a configured approver
    pub fn approve(
        &mut self,
        approver: &PublicKey,
        source: &Actor,
        destination: &Actor,
        amount: u64,
    ) -> ProtocolResult<()> {
        let now = self.now();
        self.protocol.approve_transaction(
            approver,
            &source.token_account,
            destination.token_account,
            amount,
            now,
        )
    }

    // ===== Transfers =====

    /// Move funds between actors through the full transfer gate
    pub fn transfer(
        &mut self,
        source: &Actor,
        destination: &Actor,
        amount: u64,
    ) -> ProtocolResult<()> {
        let now = self.now();
        self.protocol
            .transfer(&source.token_account, &destination.token_account, amount, now)
    }

    /// Run the registry-wide invariant suite against the current state
    pub fn check_invariants(&self) -> Result<()> {
        crate::invariants::check_registry(&self.protocol, &self.mint, self.now())
    }
}
