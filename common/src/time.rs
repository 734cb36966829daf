// Time types used across the protocol.
//
// Every protocol entry point receives its clock value as an explicit `now`
// argument. Nothing below is allowed to leak into record validation;
// SystemTime::now() is non-deterministic and only suitable for logging and
// test-harness seeding.

use std::time::{SystemTime, UNIX_EPOCH};

// Unix epoch milliseconds. The alias is the unit annotation.
pub type TimestampMillis = u64;

// Wall-clock milliseconds, for logging or seeding a harness clock only.
// A clock before the epoch reads as zero.
pub fn get_current_time_in_millis() -> TimestampMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as TimestampMillis)
        .unwrap_or(0)
}
