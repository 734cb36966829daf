// Identity Registry
// This module provides the identity records gating token transfers.
//
// Design Philosophy:
// - A token account transfers only while a trusted issuer vouches for it
// - Expiry is an absolute timestamp checked against a caller-supplied clock
// - Recovery is terminal: a recovered identity never validates again

mod error;
mod record;
mod status;

pub use error::*;
pub use record::*;
pub use status::*;
