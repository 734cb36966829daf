// File: testing-framework/src/orchestrator/clock.rs
//
// Clock Abstraction
//
// Protocol operations take an explicit timestamp, so tests control time by
// deciding what they pass. The clock types here give scenarios a shared,
// advanceable source for that timestamp.

use std::sync::atomic::{AtomicU64, Ordering};
use warden_common::time::{get_current_time_in_millis, TimestampMillis};

/// Clock abstraction for test scenarios
///
/// Scenario helpers read the current timestamp through this trait and pass
/// it into protocol operations. Injecting a [`ManualClock`] makes a whole
/// scenario advance only when the test says so.
pub trait Clock: Send + Sync {
    /// Current timestamp in milliseconds
    fn now(&self) -> TimestampMillis;
}

/// Wall-clock time, for harness logging and soak runs
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimestampMillis {
        get_current_time_in_millis()
    }
}

/// Manually advanced clock (test environment)
///
/// Time starts at a fixed base and moves only through [`advance`] or
/// [`set`], so expiry windows are exact and runs are reproducible.
///
/// [`advance`]: ManualClock::advance
/// [`set`]: ManualClock::set
///
/// # Examples
///
/// ```rust
/// use warden_testing_framework::orchestrator::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1_000_000);
/// clock.advance(5_000);
/// assert_eq!(clock.now(), 1_005_000);
/// ```
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Default scenario start time
    pub const DEFAULT_START: TimestampMillis = 1_000_000;

    /// Clock starting at `start` milliseconds
    pub fn new(start: TimestampMillis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `millis`
    pub fn advance(&self, millis: TimestampMillis) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute timestamp
    pub fn set(&self, now: TimestampMillis) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_START)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimestampMillis {
        self.now.load(Ordering::SeqCst)
    }
}
