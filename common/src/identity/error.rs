// Identity registry error types

use std::fmt;

/// Errors raised by identity record operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// A live identity record already exists for the token account,
    /// or the issuer already holds an attestation on the record
    AlreadyExists,

    /// No identity record, or no attestation from the given issuer
    NotFound,

    /// The record exists but carries no live attestation
    Expired,

    /// The identity was recovered; the state is terminal
    AlreadyRecovered,

    /// The record cannot hold another attestation
    AttestationLimitReached { max: usize },
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::AlreadyExists => write!(f, "Identity record already exists"),
            IdentityError::NotFound => write!(f, "Identity record not found"),
            IdentityError::Expired => write!(f, "Identity has expired"),
            IdentityError::AlreadyRecovered => write!(f, "Identity has already been recovered"),
            IdentityError::AttestationLimitReached { max } => {
                write!(f, "Attestation limit reached: maximum {}", max)
            }
        }
    }
}

impl std::error::Error for IdentityError {}

/// Result type for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;
