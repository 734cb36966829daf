use crate::crypto::PublicKey;
use thiserror::Error;

/// Error types for recovery configuration and execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("Recovery authority set not configured for owner")]
    NotConfigured,

    #[error("Recovery authority set already configured for owner")]
    AlreadyConfigured,

    #[error("Last-transaction entry already exists for owner")]
    LastTxAlreadyExists,

    #[error("Last-transaction entry not found for owner")]
    LastTxNotFound,

    #[error("Authority set is empty")]
    EmptyAuthorities,

    #[error("Duplicate authority key in set: {0}")]
    DuplicateAuthority(PublicKey),

    #[error("Too many authorities: {count}, maximum {max}")]
    TooManyAuthorities { count: usize, max: usize },

    #[error("Invalid threshold {threshold} for {authorities} authorities")]
    InvalidThreshold { threshold: u8, authorities: usize },

    #[error("No approvals provided")]
    NoApprovals,

    #[error("Not enough signatures: required {required}, got {actual}")]
    NotEnoughSignatures { required: u8, actual: usize },

    #[error("Identity has already been recovered")]
    AlreadyRecovered,
}
