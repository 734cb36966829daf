// Warden Social Recovery
// This module provides threshold-cosigned account recovery infrastructure.
//
// Design Philosophy:
// - Configuration: owner registers N cosigning authorities and a threshold M
// - Execution: M-of-N distinct valid cosignatures move the balance to a new account
// - Freshness: signed messages embed the owner's last-transaction sequence

mod approval;
mod authority;
mod error;
mod last_tx;

pub use approval::*;
pub use authority::*;
pub use error::*;
pub use last_tx::*;

use std::fmt;

/// Observable lifecycle of an account's recovery setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    /// No recovery configuration registered
    Uninitialized,
    /// Cosigning authorities registered, recovery available
    AuthoritySet,
    /// Recovery executed, identity permanently redirected
    Recovered,
}

impl RecoveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::AuthoritySet => "authority_set",
            Self::Recovered => "recovered",
        }
    }
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
