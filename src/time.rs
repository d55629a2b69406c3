//! Time sources for tick derivation.
//!
//! The cache never reads the OS clock directly. All timing flows through the
//! [`TimeSource`] trait so tests can substitute an advance-on-demand clock.
//! Tick conversion (`now_ms / tick_ms`) happens in the coordinator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic millisecond clock.
///
/// `now_ms` must be non-decreasing for the lifetime of the process. The value
/// is relative (an offset from an arbitrary epoch), never wall-clock time.
pub trait TimeSource: Send + Sync {
    /// Milliseconds elapsed since the source's epoch.
    fn now_ms(&self) -> u64;
}

/// Default time source backed by [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Advance-on-demand clock for tests.
///
/// Cloned handles share one underlying counter, so a test can hold a handle
/// while the cache holds another.
///
/// # Example
///
/// ```
/// use wheelcache::time::{ManualClock, TimeSource};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// clock.advance(150);
/// assert_eq!(handle.now_ms(), 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute value. Never move it backwards; the
    /// cache assumes monotonic time.
    pub fn set_ms(&self, ms: u64) {
        self.ms.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }
}
