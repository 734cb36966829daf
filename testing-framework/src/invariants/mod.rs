//! Core invariant checkers
//!
//! Registry-wide properties scenarios assert between steps:
//! - Supply conservation (mint supply equals the sum of account balances)
//! - Sequence monotonicity (the last-tx marker never moves backwards)
//! - Recovered terminality (a recovered identity reports Recovered forever)
//! - Approval slot consistency (slots belong to configured approvers and
//!   to the owner they are keyed under)

use anyhow::{bail, Result};

use warden_common::crypto::Hash;
use warden_common::identity::{IdentityRecord, IdentityStatus};
use warden_common::protocol::Protocol;
use warden_common::state::{RecordKey, RecordValue};
use warden_common::time::TimestampMillis;
use warden_common::token::{MemoryTokenLedger, TokenLedger};
use warden_common::two_auth::{TransactionApproval, TwoAuthParameters};

/// Every minted unit must sit in exactly one account
pub fn check_supply_conservation(ledger: &MemoryTokenLedger, mint: &Hash) -> Result<()> {
    let supply = ledger.mint(mint).map(|record| record.supply).unwrap_or(0);
    let circulating = ledger.circulating(mint);
    if supply != circulating {
        bail!(
            "supply conservation violated for mint {}: supply is {} but accounts hold {}",
            mint,
            supply,
            circulating
        );
    }
    Ok(())
}

/// The last-tx sequence read after an operation must not be behind the one
/// read before it
pub fn check_sequence_monotonicity(before: u64, after: u64) -> Result<()> {
    if after < before {
        bail!("last-tx sequence went backwards: {} then {}", before, after);
    }
    Ok(())
}

/// A recovered identity must report [`IdentityStatus::Recovered`] no matter
/// how its attestations have aged
pub fn check_recovered_terminality(record: &IdentityRecord, now: TimestampMillis) -> Result<()> {
    if record.is_recovered() {
        let status = record.status(now);
        if status != IdentityStatus::Recovered {
            bail!(
                "recovered identity for token account {} reports status {}",
                record.token_account,
                status
            );
        }
    }
    Ok(())
}

/// A stored approval must have been written by one of the policy's approvers
pub fn check_approval_slot_consistency(
    policy: &TwoAuthParameters,
    slot: &TransactionApproval,
) -> Result<()> {
    if !policy.is_approver(&slot.approver) {
        bail!(
            "approval slot holds an approval from {}, who is not a configured approver for {}",
            slot.approver,
            policy.token_account
        );
    }
    Ok(())
}

/// Run every registry-wide check against a live protocol instance
pub fn check_registry(
    protocol: &Protocol<MemoryTokenLedger>,
    mint: &Hash,
    now: TimestampMillis,
) -> Result<()> {
    check_supply_conservation(protocol.ledger(), mint)?;

    for (key, value) in protocol.store().records() {
        match (key, value) {
            (RecordKey::Identity(_), RecordValue::Identity(record)) => {
                check_recovered_terminality(record, now)?;
            }
            (RecordKey::TransactionApproval(owner), RecordValue::TransactionApproval(slot)) => {
                // Slots are keyed by the source account's owner
                match protocol.ledger().account(&slot.source) {
                    Some(account) if account.owner == *owner => {}
                    Some(account) => bail!(
                        "approval slot keyed under {} but source account {} is owned by {}",
                        owner,
                        slot.source,
                        account.owner
                    ),
                    None => bail!(
                        "approval slot references source account {} which does not exist",
                        slot.source
                    ),
                }
                match protocol.two_auth(&slot.source) {
                    Some(policy) => check_approval_slot_consistency(policy, slot)?,
                    None => bail!(
                        "approval slot for owner {} has no backing two-auth policy",
                        owner
                    ),
                }
            }
            _ => {}
        }
    }
    Ok(())
}
