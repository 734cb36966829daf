use crate::{static_assert, time::TimestampMillis};

pub const VERSION: &str = env!("BUILD_VERSION");

// ===== APPROVAL WINDOWS =====

// Transfer approvals are short-lived: an approved tuple must be spent within
// this window, measured from the approval timestamp, or the gate rejects it
// as expired.
pub const APPROVAL_VALIDITY_MILLIS: TimestampMillis = 5_000;

// Recovery approvals are gathered off-system and may take much longer to
// collect. 24 hours.
pub const RECOVERY_APPROVAL_VALIDITY_MILLIS: TimestampMillis = 24 * 3_600 * 1_000;

// ===== RECORD SIZE BOUNDS =====

// A recovery authority set holds between MIN and MAX keys; the threshold must
// fit inside the set.
pub const MIN_RECOVERY_AUTHORITIES: usize = 1;
pub const MAX_RECOVERY_AUTHORITIES: usize = 32;

// Two-auth parameter bounds
pub const MAX_TWO_AUTH_RULES: usize = 16;
pub const MAX_TWO_AUTH_APPROVERS: usize = 16;

// An identity record holds at most this many issuer attestations
pub const MAX_ISSUER_ATTESTATIONS: usize = 8;

// Static checks
static_assert!(
    MAX_RECOVERY_AUTHORITIES >= MIN_RECOVERY_AUTHORITIES,
    "Authority set upper bound must cover the lower bound"
);
static_assert!(
    MAX_RECOVERY_AUTHORITIES <= u8::MAX as usize,
    "Authority sets are counted with u8 thresholds"
);
static_assert!(
    APPROVAL_VALIDITY_MILLIS < RECOVERY_APPROVAL_VALIDITY_MILLIS,
    "Transfer approvals must expire faster than recovery approvals"
);
