// Warden Transfer Gate
// This module decides whether a transfer between two identity-gated token
// accounts may proceed. The gate is pure: it reads identity records and the
// two-auth policy, and reports whether an authorization slot was spent.
//
// Check order:
// 1. Both sides carry an identity record
// 2. Neither identity is expired
// 3. A recovered sender may only move funds to its recovery destination
// 4. When the policy asks for one, a matching fresh authorization exists

use crate::crypto::PublicKey;
use crate::identity::{IdentityRecord, IdentityStatus};
use crate::time::TimestampMillis;
use crate::two_auth::{TransactionApproval, TwoAuthParameters};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    #[error("identity not initialized for one side of the transfer")]
    IdentityNotInitialized,

    #[error("identity attestation expired")]
    IdentityExpired,

    #[error("account was recovered, funds may only move to the recovery destination")]
    IdentityRecovered,

    #[error("transfer requires a second authorization")]
    ApprovalRequired,

    #[error("second authorization expired")]
    ApprovalExpired,
}

/// Everything the gate reads to decide one transfer
#[derive(Debug, Clone, Copy)]
pub struct TransferContext<'a> {
    pub source_token_account: &'a PublicKey,
    pub destination_token_account: &'a PublicKey,
    pub amount: u64,
    pub source_identity: Option<&'a IdentityRecord>,
    pub destination_identity: Option<&'a IdentityRecord>,
    /// Source owner's two-auth policy, if configured
    pub policy: Option<&'a TwoAuthParameters>,
    /// Source owner's authorization slot, if one was granted
    pub approval: Option<&'a TransactionApproval>,
}

/// Gate decision for an admissible transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferVerdict {
    /// The caller must mark the authorization slot spent
    pub approval_consumed: bool,
}

/// Run the full gate over a transfer context.
///
/// Returns the verdict for an admissible transfer or the first failing
/// check. Does not mutate anything; spending the authorization slot is the
/// caller's move.
pub fn check_transfer(
    context: &TransferContext,
    current_time: TimestampMillis,
) -> Result<TransferVerdict, TransferError> {
    let source = context
        .source_identity
        .ok_or(TransferError::IdentityNotInitialized)?;
    let destination = context
        .destination_identity
        .ok_or(TransferError::IdentityNotInitialized)?;

    if source.status(current_time) == IdentityStatus::Expired {
        return Err(TransferError::IdentityExpired);
    }

    if destination.status(current_time) == IdentityStatus::Expired {
        return Err(TransferError::IdentityExpired);
    }

    // A recovered sender is drained towards its replacement account only
    if source.is_recovered()
        && source.recovery_destination() != Some(context.destination_token_account)
    {
        return Err(TransferError::IdentityRecovered);
    }

    let Some(policy) = context.policy else {
        return Ok(TransferVerdict {
            approval_consumed: false,
        });
    };

    if !policy.requires_approval(context.amount) {
        return Ok(TransferVerdict {
            approval_consumed: false,
        });
    }

    let Some(approval) = context.approval else {
        return Err(TransferError::ApprovalRequired);
    };

    if !approval.active
        || !approval.matches(
            context.source_token_account,
            context.destination_token_account,
            context.amount,
        )
    {
        return Err(TransferError::ApprovalRequired);
    }

    if approval.is_expired(current_time) {
        return Err(TransferError::ApprovalExpired);
    }

    Ok(TransferVerdict {
        approval_consumed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::APPROVAL_VALIDITY_MILLIS;
    use crate::two_auth::TwoAuthRule;

    const NOW: TimestampMillis = 10_000;

    fn key(tag: u8) -> PublicKey {
        PublicKey::from_bytes([tag; 32])
    }

    fn identity(owner_tag: u8, account_tag: u8, expires_at: TimestampMillis) -> IdentityRecord {
        IdentityRecord::new(key(owner_tag), key(account_tag), key(200), expires_at, 1_000)
    }

    fn context<'a>(
        source_account: &'a PublicKey,
        destination_account: &'a PublicKey,
        source_identity: Option<&'a IdentityRecord>,
        destination_identity: Option<&'a IdentityRecord>,
    ) -> TransferContext<'a> {
        TransferContext {
            source_token_account: source_account,
            destination_token_account: destination_account,
            amount: 100,
            source_identity,
            destination_identity,
            policy: None,
            approval: None,
        }
    }

    #[test]
    fn test_missing_identities_rejected() {
        let source_account = key(1);
        let destination_account = key(2);
        let destination = identity(12, 2, NOW + 1_000);

        let missing_source = context(&source_account, &destination_account, None, Some(&destination));
        assert_eq!(
            check_transfer(&missing_source, NOW).unwrap_err(),
            TransferError::IdentityNotInitialized
        );

        let source = identity(11, 1, NOW + 1_000);
        let missing_destination = context(&source_account, &destination_account, Some(&source), None);
        assert_eq!(
            check_transfer(&missing_destination, NOW).unwrap_err(),
            TransferError::IdentityNotInitialized
        );
    }

    #[test]
    fn test_expired_identity_rejected() {
        let source_account = key(1);
        let destination_account = key(2);
        let live = identity(11, 1, NOW + 1_000);
        let expired = identity(12, 2, NOW);

        let ctx = context(&source_account, &destination_account, Some(&expired), Some(&live));
        assert_eq!(
            check_transfer(&ctx, NOW).unwrap_err(),
            TransferError::IdentityExpired
        );

        let ctx = context(&source_account, &destination_account, Some(&live), Some(&expired));
        assert_eq!(
            check_transfer(&ctx, NOW).unwrap_err(),
            TransferError::IdentityExpired
        );
    }

    #[test]
    fn test_valid_identities_pass_without_policy() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);

        let ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        let verdict = check_transfer(&ctx, NOW).unwrap();
        assert!(!verdict.approval_consumed);
    }

    #[test]
    fn test_recovered_sender_locked_to_destination() {
        let source_account = key(1);
        let recovery_account = key(3);
        let other_account = key(2);

        let mut source = identity(11, 1, NOW + 1_000);
        source.record_recovery(recovery_account);
        let elsewhere = identity(12, 2, NOW + 1_000);
        let replacement = identity(11, 3, NOW + 1_000);

        // Any destination except the recovery account is refused
        let ctx = context(&source_account, &other_account, Some(&source), Some(&elsewhere));
        assert_eq!(
            check_transfer(&ctx, NOW).unwrap_err(),
            TransferError::IdentityRecovered
        );

        // Draining into the recovery account is allowed
        let ctx = context(&source_account, &recovery_account, Some(&source), Some(&replacement));
        assert!(check_transfer(&ctx, NOW).is_ok());
    }

    #[test]
    fn test_policy_without_approval_rejected() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);
        let policy = TwoAuthParameters::new(key(11), key(1), vec![], vec![key(50)], 1_000);

        let mut ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        ctx.policy = Some(&policy);

        assert_eq!(
            check_transfer(&ctx, NOW).unwrap_err(),
            TransferError::ApprovalRequired
        );
    }

    #[test]
    fn test_policy_below_cap_passes_without_approval() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);
        let policy = TwoAuthParameters::new(
            key(11),
            key(1),
            vec![TwoAuthRule::OnMax { max: 1_000 }],
            vec![key(50)],
            1_000,
        );

        let mut ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        ctx.policy = Some(&policy);

        let verdict = check_transfer(&ctx, NOW).unwrap();
        assert!(!verdict.approval_consumed);
    }

    #[test]
    fn test_matching_approval_consumed() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);
        let policy = TwoAuthParameters::new(key(11), key(1), vec![], vec![key(50)], 1_000);
        let approval = TransactionApproval::new(key(1), key(2), 100, NOW - 100, key(50));

        let mut ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        ctx.policy = Some(&policy);
        ctx.approval = Some(&approval);

        let verdict = check_transfer(&ctx, NOW).unwrap();
        assert!(verdict.approval_consumed);
    }

    #[test]
    fn test_mismatched_approval_rejected() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);
        let policy = TwoAuthParameters::new(key(11), key(1), vec![], vec![key(50)], 1_000);
        // Authorized amount differs from the attempted transfer
        let approval = TransactionApproval::new(key(1), key(2), 250, NOW - 100, key(50));

        let mut ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        ctx.policy = Some(&policy);
        ctx.approval = Some(&approval);

        assert_eq!(
            check_transfer(&ctx, NOW).unwrap_err(),
            TransferError::ApprovalRequired
        );
    }

    #[test]
    fn test_spent_approval_rejected() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);
        let policy = TwoAuthParameters::new(key(11), key(1), vec![], vec![key(50)], 1_000);
        let mut approval = TransactionApproval::new(key(1), key(2), 100, NOW - 100, key(50));
        approval.consume();

        let mut ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        ctx.policy = Some(&policy);
        ctx.approval = Some(&approval);

        assert_eq!(
            check_transfer(&ctx, NOW).unwrap_err(),
            TransferError::ApprovalRequired
        );
    }

    #[test]
    fn test_stale_approval_rejected() {
        let source_account = key(1);
        let destination_account = key(2);
        let source = identity(11, 1, NOW + 1_000);
        let destination = identity(12, 2, NOW + 1_000);
        let policy = TwoAuthParameters::new(key(11), key(1), vec![], vec![key(50)], 1_000);
        let approval = TransactionApproval::new(key(1), key(2), 100, 1_000, key(50));

        let mut ctx = context(&source_account, &destination_account, Some(&source), Some(&destination));
        ctx.policy = Some(&policy);
        ctx.approval = Some(&approval);

        let late = 1_000 + APPROVAL_VALIDITY_MILLIS + 1;
        assert_eq!(
            check_transfer(&ctx, late).unwrap_err(),
            TransferError::ApprovalExpired
        );
    }
}
