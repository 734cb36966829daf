use crate::crypto::PublicKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TwoAuthError {
    #[error("two-auth policy already configured for this account")]
    AlreadyConfigured,

    #[error("no two-auth policy configured for this account")]
    NotConfigured,

    #[error("approver set cannot be empty")]
    EmptyApprovers,

    #[error("duplicate approver in set: {0}")]
    DuplicateApprover(PublicKey),

    #[error("too many rules: {count} exceeds maximum {max}")]
    TooManyRules { count: usize, max: usize },

    #[error("too many approvers: {count} exceeds maximum {max}")]
    TooManyApprovers { count: usize, max: usize },
}
