//! Error types for the wheelcache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity, non-power-of-two wheel size).
//! - [`CoreError`]: Returned when a data-structure contract is violated
//!   (invalid slot id, double free, impossible growth, scheduling in the past).
//!
//! `CoreError` values are contract violations: the cache coordinator keeps
//! them unreachable from user input, so observing one indicates a bug in the
//! caller of the arena or wheel, not bad user data.
//!
//! ## Example Usage
//!
//! ```
//! use wheelcache::builder::WheelCacheBuilder;
//! use wheelcache::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let cache = WheelCacheBuilder::<u64, String>::new(100).try_build_core();
//! assert!(cache.is_ok());
//!
//! // Invalid wheel size is caught without panicking
//! let bad = WheelCacheBuilder::<u64, String>::new(100)
//!     .wheel_size(3)
//!     .try_build_core();
//! let err: ConfigError = bad.unwrap_err();
//! assert!(err.message().contains("wheel_size"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`WheelCacheBuilder::try_build`](crate::builder::WheelCacheBuilder::try_build)
/// and the `try_new` constructors on the data-structure types. Carries a
/// human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CoreError
// ---------------------------------------------------------------------------

/// Error returned when an arena or wheel operation violates its contract.
///
/// These never surface through the public cache API; the coordinator
/// guarantees the preconditions before calling into the data structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Slot id outside `[0, cap)`.
    InvalidId { id: i32, cap: usize },
    /// `free_id` called on a slot whose key column is already absent.
    DoubleFree { id: i32 },
    /// Column growth cannot reach the requested capacity.
    CapacityExhausted { requested: usize, max_entries: usize },
    /// `schedule` called with an expiry tick at or before the current tick.
    ScheduleInPast { expire_tick: u64, now_tick: u64 },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidId { id, cap } => {
                write!(f, "slot id {} outside [0, {})", id, cap)
            },
            CoreError::DoubleFree { id } => {
                write!(f, "slot id {} freed while already free", id)
            },
            CoreError::CapacityExhausted {
                requested,
                max_entries,
            } => {
                write!(
                    f,
                    "cannot grow to {} slots (max_entries = {})",
                    requested, max_entries
                )
            },
            CoreError::ScheduleInPast {
                expire_tick,
                now_tick,
            } => {
                write!(
                    f,
                    "expiry tick {} is not after current tick {}",
                    expire_tick, now_tick
                )
            },
        }
    }
}

impl std::error::Error for CoreError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
