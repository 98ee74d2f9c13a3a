use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Source of "now" for scheduled records
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable clock for deterministic scheduling tests.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the queue:
///
/// ```rust
/// use chrono::Duration;
/// use dog_queue_test::{Clock, MockClock, TestQueue};
///
/// let clock = MockClock::new();
/// let queue = TestQueue::new().with_clock(clock.clone());
///
/// let start = clock.now();
/// clock.advance(Duration::minutes(5));
/// assert_eq!((queue.now() - start).num_seconds(), 300);
/// ```
#[derive(Clone, Debug)]
pub struct MockClock {
    current_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a mock clock frozen at the current time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a mock clock frozen at the given instant
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, duration: Duration) {
        *self.current_time.lock() += duration;
    }

    /// Jump to a specific instant
    pub fn set(&self, time: DateTime<Utc>) {
        *self.current_time.lock() = time;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.lock()
    }
}
