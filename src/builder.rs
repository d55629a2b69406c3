//! Unified builder for wheel caches.
//!
//! Collects configuration with fluent setters and validates it in one place,
//! so both the single-threaded core and the concurrent wrapper share the same
//! construction path.
//!
//! ## Example
//!
//! ```rust
//! use wheelcache::builder::WheelCacheBuilder;
//!
//! let mut cache = WheelCacheBuilder::<u64, String>::new(100)
//!     .tick_ms(50)
//!     .wheel_size(256)
//!     .try_build_core()
//!     .unwrap();
//! cache.set(1, "hello".to_string(), 30_000);
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;
use std::sync::Arc;

use crate::cache::{ConcurrentWheelCache, DisposeFn, WheelCacheCore};
use crate::ds::entry_arena::EntryArena;
use crate::ds::timer_wheel::TimerWheel;
use crate::error::ConfigError;
use crate::time::{MonotonicClock, TimeSource};

const DEFAULT_TICK_MS: u64 = 50;
const DEFAULT_WHEEL_SIZE: usize = 4096;
const DEFAULT_BUDGET_PER_TICK: usize = 200_000;

/// Builder for [`WheelCacheCore`] and [`ConcurrentWheelCache`].
///
/// Defaults: `tick_ms = 50`, `wheel_size = 4096`,
/// `budget_per_tick = 200_000`, sliding expiration off, passive expiration
/// on, monotonic clock, no disposal callback.
pub struct WheelCacheBuilder<K, V> {
    max_entries: usize,
    initial_cap: Option<usize>,
    tick_ms: u64,
    wheel_size: usize,
    budget_per_tick: usize,
    update_ttl_on_get: bool,
    passive_expiration: bool,
    clock: Arc<dyn TimeSource>,
    on_dispose: Option<DisposeFn<K, V>>,
}

impl<K, V> WheelCacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Starts a builder for a cache bounded at `max_entries`.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            initial_cap: None,
            tick_ms: DEFAULT_TICK_MS,
            wheel_size: DEFAULT_WHEEL_SIZE,
            budget_per_tick: DEFAULT_BUDGET_PER_TICK,
            update_ttl_on_get: false,
            passive_expiration: true,
            clock: Arc::new(MonotonicClock::new()),
            on_dispose: None,
        }
    }

    /// Initial arena capacity; defaults to `min(1024, max_entries)`.
    pub fn initial_cap(mut self, initial_cap: usize) -> Self {
        self.initial_cap = Some(initial_cap);
        self
    }

    /// Tick length in milliseconds.
    pub fn tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Number of wheel buckets; must be a power of two of at least 2.
    pub fn wheel_size(mut self, wheel_size: usize) -> Self {
        self.wheel_size = wheel_size;
        self
    }

    /// Maximum units of expiration work per advance call.
    pub fn budget_per_tick(mut self, budget_per_tick: usize) -> Self {
        self.budget_per_tick = budget_per_tick;
        self
    }

    /// Enables sliding expiration: every `get` restarts the entry's TTL.
    pub fn update_ttl_on_get(mut self, enabled: bool) -> Self {
        self.update_ttl_on_get = enabled;
        self
    }

    /// Chooses who pumps the wheel. `true` (default) leaves it to a periodic
    /// advancer; `false` makes every user operation advance first.
    pub fn passive_expiration(mut self, enabled: bool) -> Self {
        self.passive_expiration = enabled;
        self
    }

    /// Substitutes the time source (tests use
    /// [`ManualClock`](crate::time::ManualClock)).
    pub fn clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Registers a disposal callback, invoked once per removed entry with
    /// the removal [`DisposeReason`](crate::cache::DisposeReason).
    pub fn on_dispose(mut self, callback: DisposeFn<K, V>) -> Self {
        self.on_dispose = Some(callback);
        self
    }

    /// Validates the configuration and builds the single-threaded core.
    pub fn try_build_core(self) -> Result<WheelCacheCore<K, V>, ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::new("tick_ms must be positive"));
        }
        let arena = match self.initial_cap {
            Some(cap) => EntryArena::try_with_initial_cap(self.max_entries, cap)?,
            None => EntryArena::try_new(self.max_entries)?,
        };
        let start_tick = self.clock.now_ms() / self.tick_ms;
        let wheel = TimerWheel::try_new(self.wheel_size, self.budget_per_tick, start_tick)?;
        Ok(WheelCacheCore::from_parts(
            arena,
            wheel,
            self.clock,
            self.tick_ms,
            self.update_ttl_on_get,
            self.passive_expiration,
            self.on_dispose,
        ))
    }

    /// Validates the configuration and builds the thread-safe cache,
    /// starting the periodic advancer when passive expiration is enabled.
    pub fn try_build(self) -> Result<ConcurrentWheelCache<K, V>, ConfigError>
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        Ok(ConcurrentWheelCache::start(self.try_build_core()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_successfully() {
        let cache = WheelCacheBuilder::<u64, u64>::new(100).try_build_core();
        assert!(cache.is_ok());
        let cache = cache.unwrap();
        assert_eq!(cache.max_entries(), 100);
        assert_eq!(cache.tick_ms(), 50);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(WheelCacheBuilder::<u64, u64>::new(0).try_build_core().is_err());
        assert!(WheelCacheBuilder::<u64, u64>::new(10)
            .tick_ms(0)
            .try_build_core()
            .is_err());
        assert!(WheelCacheBuilder::<u64, u64>::new(10)
            .wheel_size(100)
            .try_build_core()
            .is_err());
        assert!(WheelCacheBuilder::<u64, u64>::new(10)
            .budget_per_tick(0)
            .try_build_core()
            .is_err());
        assert!(WheelCacheBuilder::<u64, u64>::new(10)
            .initial_cap(11)
            .try_build_core()
            .is_err());
    }

    #[test]
    fn error_messages_name_the_parameter() {
        let err = WheelCacheBuilder::<u64, u64>::new(10)
            .wheel_size(3)
            .try_build_core()
            .unwrap_err();
        assert!(err.to_string().contains("wheel_size"));

        let err = WheelCacheBuilder::<u64, u64>::new(0)
            .try_build_core()
            .unwrap_err();
        assert!(err.to_string().contains("max_entries"));
    }

    #[test]
    fn build_concurrent_starts_and_stops() {
        let cache = WheelCacheBuilder::<u64, String>::new(10)
            .tick_ms(5)
            .try_build()
            .unwrap();
        cache.set(1, "v".to_string(), 60_000);
        assert_eq!(cache.len(), 1);
        cache.close();
    }
}
