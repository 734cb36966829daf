//! # Recovery Approval Verification
//!
//! Stateless verification of threshold-signed recovery requests. A request
//! carries one approval per cosigning authority; verification checks:
//! 1. Authority membership in the registered set
//! 2. Signature validity over the domain-separated recovery message
//! 3. Approval freshness against the supplied clock
//! 4. Threshold enforcement over distinct valid cosigners
//!
//! Duplicate approvals from the same authority count once. Surplus valid
//! approvals beyond the threshold are accepted.
//!
//! The signed message embeds the owner's current last-transaction sequence,
//! so approvals gathered before a later owner action no longer verify.

use crate::config::RECOVERY_APPROVAL_VALIDITY_MILLIS;
use crate::crypto::{PublicKey, Signature};
use crate::recovery::{RecoveryAuthority, RecoveryError};
use crate::serializer::{Reader, ReaderError, Serializer, Writer};
use crate::time::TimestampMillis;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Domain prefix for recovery messages
const RECOVERY_MESSAGE_PREFIX: &[u8] = b"WARDEN_RECOVERY_V1";

/// One authority's signed approval of a recovery request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryApproval {
    /// Cosigning authority's public key
    pub authority: PublicKey,

    /// Signature over the recovery message
    pub signature: Signature,

    /// Signing timestamp
    pub timestamp: TimestampMillis,
}

impl RecoveryApproval {
    pub fn new(authority: PublicKey, signature: Signature, timestamp: TimestampMillis) -> Self {
        Self {
            authority,
            signature,
            timestamp,
        }
    }

    /// Check if the approval is older than the recovery validity window
    pub fn is_expired(&self, current_time: TimestampMillis) -> bool {
        current_time.saturating_sub(self.timestamp) > RECOVERY_APPROVAL_VALIDITY_MILLIS
    }

    /// Verify the signature against a rebuilt message
    pub fn verify_signature(&self, message: &[u8]) -> bool {
        self.authority.verify(message, &self.signature).is_ok()
    }

    /// Build the domain-separated message an authority signs to approve
    /// moving `old_token_account` to `new_token_account` / `new_owner`.
    ///
    /// `sequence` is the owner's current last-transaction sequence at signing
    /// time; execution rebuilds the message from live state.
    pub fn build_recovery_message(
        old_token_account: &PublicKey,
        new_token_account: &PublicKey,
        new_owner: &PublicKey,
        sequence: u64,
        timestamp: TimestampMillis,
    ) -> Vec<u8> {
        let mut writer = Writer::with_capacity(RECOVERY_MESSAGE_PREFIX.len() + 32 * 3 + 8 + 8);
        writer.write_bytes(RECOVERY_MESSAGE_PREFIX);
        old_token_account.write(&mut writer);
        new_token_account.write(&mut writer);
        new_owner.write(&mut writer);
        writer.write_u64(&sequence);
        writer.write_u64(&timestamp);
        writer.bytes()
    }
}

impl Serializer for RecoveryApproval {
    fn write(&self, writer: &mut Writer) {
        self.authority.write(writer);
        self.signature.write(writer);
        writer.write_u64(&self.timestamp);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            authority: PublicKey::read(reader)?,
            signature: Signature::read(reader)?,
            timestamp: reader.read_u64()?,
        })
    }

    fn size(&self) -> usize {
        self.authority.size() + self.signature.size() + 8
    }
}

/// Result of verifying a batch of recovery approvals
#[derive(Debug, Clone)]
pub struct ApprovalVerificationResult {
    /// Number of distinct valid approvals
    pub valid_count: usize,
    /// Threshold the set requires
    pub required_threshold: u8,
    /// Whether the threshold was met
    pub threshold_met: bool,
    /// Detailed results for each approval
    pub approval_results: Vec<ApprovalCheckResult>,
}

/// Result of checking a single approval
#[derive(Debug, Clone)]
pub struct ApprovalCheckResult {
    /// The cosigner's public key
    pub authority: PublicKey,
    /// Whether the cosigner belongs to the registered set
    pub is_registered_authority: bool,
    /// Whether the signature verified
    pub signature_valid: bool,
    /// Whether the approval is expired
    pub is_expired: bool,
    /// Combined validity (all checks pass, not a duplicate)
    pub is_valid: bool,
}

/// Verify a batch of approvals for a recovery execution.
///
/// The rebuilt message binds (old account, new account, new owner, sequence),
/// so approvals signed for any other tuple fail signature verification and
/// do not count.
pub fn verify_recovery_approvals(
    authority_set: &RecoveryAuthority,
    approvals: &[RecoveryApproval],
    old_token_account: &PublicKey,
    new_token_account: &PublicKey,
    new_owner: &PublicKey,
    sequence: u64,
    current_time: TimestampMillis,
) -> Result<ApprovalVerificationResult, RecoveryError> {
    let build_message = |approval: &RecoveryApproval| {
        RecoveryApproval::build_recovery_message(
            old_token_account,
            new_token_account,
            new_owner,
            sequence,
            approval.timestamp,
        )
    };

    verify_approvals_internal(
        authority_set,
        approvals,
        build_message,
        authority_set.threshold,
        current_time,
    )
}

/// Internal verification loop.
///
/// Deduplicates approvals by authority key so a single cosigner never counts
/// more than once toward the threshold.
fn verify_approvals_internal<F>(
    authority_set: &RecoveryAuthority,
    approvals: &[RecoveryApproval],
    build_message: F,
    required_threshold: u8,
    current_time: TimestampMillis,
) -> Result<ApprovalVerificationResult, RecoveryError>
where
    F: Fn(&RecoveryApproval) -> Vec<u8>,
{
    if approvals.is_empty() {
        return Err(RecoveryError::NoApprovals);
    }

    let mut approval_results = Vec::with_capacity(approvals.len());
    let mut valid_count = 0usize;
    // Track seen cosigners to prevent duplicate counting
    let mut seen_authorities: HashSet<PublicKey> = HashSet::new();

    for approval in approvals {
        let is_duplicate = seen_authorities.contains(&approval.authority);
        let is_expired = approval.is_expired(current_time);
        let is_registered_authority = authority_set.is_authority(&approval.authority);

        // Signature check is the expensive step; skip it when the approval
        // already failed a cheaper check
        let signature_valid = if is_registered_authority && !is_expired && !is_duplicate {
            approval.verify_signature(&build_message(approval))
        } else {
            false
        };

        let is_valid = !is_duplicate && is_registered_authority && signature_valid && !is_expired;

        if is_valid {
            valid_count += 1;
            seen_authorities.insert(approval.authority);
        }

        approval_results.push(ApprovalCheckResult {
            authority: approval.authority,
            is_registered_authority,
            signature_valid,
            is_expired,
            is_valid,
        });
    }

    let threshold_met = valid_count >= required_threshold as usize;

    if !threshold_met {
        return Err(RecoveryError::NotEnoughSignatures {
            required: required_threshold,
            actual: valid_count,
        });
    }

    Ok(ApprovalVerificationResult {
        valid_count,
        required_threshold,
        threshold_met,
        approval_results,
    })
}
