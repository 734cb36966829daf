// Warden Two-Authorization Policy
// This module provides opt-in second-authorization guards for transfers.
//
// Design Philosophy:
// - Policy: per-account rule list, combined conjunctively, plus an approver set
// - Authorization: one slot per owner binding the exact (source, destination, amount)
// - Consumption: a transfer spends its authorization; replays need a fresh one

mod approval;
mod error;
mod parameters;
mod rule;

pub use approval::*;
pub use error::*;
pub use parameters::*;
pub use rule::*;
