//! Convenient re-exports for scenario tests
//!
//! `use warden_testing_framework::prelude::*;` pulls in the harness, the
//! deterministic environment and the protocol types scenarios touch most.

pub use crate::invariants::{
    check_approval_slot_consistency, check_recovered_terminality, check_registry,
    check_sequence_monotonicity, check_supply_conservation,
};
pub use crate::orchestrator::{Clock, ManualClock, SystemClock, TestEnv, TestRng};
pub use crate::utilities::{
    Actor, Harness, HarnessBuilder, DEFAULT_IDENTITY_VALIDITY_MILLIS, TEST_DECIMALS,
};

pub use warden_common::config::{APPROVAL_VALIDITY_MILLIS, RECOVERY_APPROVAL_VALIDITY_MILLIS};
pub use warden_common::crypto::{hash, Hash, KeyPair, PublicKey, Signature};
pub use warden_common::identity::{IdentityError, IdentityRecord, IdentityStatus};
pub use warden_common::protocol::{Protocol, ProtocolConfig, ProtocolError, ProtocolResult};
pub use warden_common::recovery::{
    LastTx, RecoveryApproval, RecoveryAuthority, RecoveryError, RecoveryState,
};
pub use warden_common::time::TimestampMillis;
pub use warden_common::token::{MemoryTokenLedger, TokenError, TokenLedger};
pub use warden_common::transfer::TransferError;
pub use warden_common::two_auth::{
    TransactionApproval, TwoAuthError, TwoAuthParameters, TwoAuthRule,
};
