use crate::identity::IdentityError;
use crate::recovery::RecoveryError;
use crate::token::TokenError;
use crate::transfer::TransferError;
use crate::two_auth::TwoAuthError;
use thiserror::Error;

/// Aggregate error surface of the protocol facade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error(transparent)]
    TwoAuth(#[from] TwoAuthError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
