//! # TTL + LRU cache coordinator
//!
//! Couples the key index, the entry arena, the recency list, and the timer
//! wheel into one bounded key/value cache. Entries expire when their TTL
//! elapses (wheel) and are evicted least-recently-used first when the cache
//! is full (recency list). Both mechanisms share the arena's slots.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                        WheelCacheCore<K, V>                         │
//!   │                                                                     │
//!   │   FxHashMap<K, i32>        EntryArena<K, V> (SoA columns)           │
//!   │   ┌─────────┬──────┐       ┌──────────────────────────────────┐     │
//!   │   │  "a"    │  0   │──────►│ keys / values / expires / ttl    │     │
//!   │   │  "b"    │  1   │──────►│ wheel links    lru links         │     │
//!   │   └─────────┴──────┘       └───────┬──────────────┬───────────┘     │
//!   │                                    │              │                 │
//!   │                       TimerWheel ◄─┘              └─► LruList       │
//!   │                 (TTL expiration)                (capacity eviction) │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation flow
//!
//! ```text
//!   set(k, v, ttl):   index hit  -> overwrite value, reschedule, touch LRU
//!                     index miss -> evict LRU tail while full, allocate
//!                                   slot, index + schedule + link at head
//!
//!   get(k):           expired?   -> defensive removal, return None
//!                     live       -> touch LRU (and slide TTL if enabled)
//!
//!   tick advance:     wheel emits due slot ids; each is removed from the
//!                     index and recency list and its slot is recycled
//! ```
//!
//! ## Key Components
//!
//! | Component                | Description                                   |
//! |--------------------------|-----------------------------------------------|
//! | `WheelCacheCore<K, V>`   | Single-threaded coordinator                   |
//! | `ConcurrentWheelCache`   | `parking_lot::Mutex` wrapper + advancer thread|
//! | `DisposeReason`          | Why an entry left the cache                   |
//! | `CacheStats`             | Lightweight occupancy gauges                  |
//!
//! ## Expiration model
//!
//! Time is processed in whole ticks of `tick_ms` milliseconds. A TTL is
//! converted with `ttl_ms / tick_ms`, clamped to at least one tick, so the
//! smallest positive TTL expires on the next tick. Reads compare against the
//! clock-derived current tick rather than the wheel's processed tick, so an
//! entry whose TTL has elapsed is never returned even if no advance has run
//! yet (the read removes it on the spot).
//!
//! Disposal callbacks run synchronously, exactly once per removed entry,
//! before the slot id is recycled. The callback only sees `&K`/`&V`, so it
//! cannot reenter the cache.
//!
//! ## Thread Safety
//!
//! - `WheelCacheCore`: **NOT thread-safe**, sequential access only.
//! - `ConcurrentWheelCache`: serializes every operation (including the
//!   periodic advancer) behind one mutex.

use std::hash::Hash;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::builder::WheelCacheBuilder;
use crate::ds::entry_arena::{EntryArena, NIL};
use crate::ds::lru_list::LruList;
use crate::ds::timer_wheel::TimerWheel;
use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::WheelCacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::WheelCacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::WheelCacheMetricsRecorder;
use crate::time::TimeSource;

/// Why an entry was removed, reported to the disposal callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisposeReason {
    /// The entry's TTL elapsed.
    Ttl,
    /// The entry was the least recently used when the cache needed room.
    Lru,
    /// The entry was removed by an explicit `delete`.
    Delete,
    /// The entry was removed by `clear`.
    Clear,
}

/// Callback invoked once per removed entry, before its slot is recycled.
pub type DisposeFn<K, V> = Box<dyn FnMut(&K, &V, DisposeReason) + Send>;

/// Occupancy gauges, available without the `metrics` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries (key index cardinality).
    pub size: usize,
    /// High-water mark of slot ids ever handed out.
    pub size_allocated: usize,
    /// Freed slots awaiting reuse.
    pub free: usize,
    /// Current arena column length.
    pub cap: usize,
    /// Latest tick the wheel has processed.
    pub now_tick: u64,
    /// Approximate length of the wheel's overflow list.
    pub overflow_len_approx: usize,
}

#[inline]
fn tick_delta(ttl_ms: u64, tick_ms: u64) -> u64 {
    (ttl_ms / tick_ms).max(1)
}

impl<K, V> std::fmt::Debug for WheelCacheCore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WheelCacheCore")
            .field("tick_ms", &self.tick_ms)
            .field("update_ttl_on_get", &self.update_ttl_on_get)
            .field("passive_expiration", &self.passive_expiration)
            .finish_non_exhaustive()
    }
}

/// Single-threaded TTL + LRU cache over one entry arena.
pub struct WheelCacheCore<K, V> {
    arena: EntryArena<K, V>,
    lru: LruList,
    wheel: TimerWheel,
    index: FxHashMap<K, i32>,
    clock: Arc<dyn TimeSource>,
    tick_ms: u64,
    update_ttl_on_get: bool,
    passive_expiration: bool,
    on_dispose: Option<DisposeFn<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: WheelCacheMetrics,
}

impl<K, V> WheelCacheCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with default options and the monotonic clock.
    ///
    /// # Example
    ///
    /// ```
    /// use wheelcache::cache::WheelCacheCore;
    ///
    /// let mut cache: WheelCacheCore<u64, String> = WheelCacheCore::try_new(100).unwrap();
    /// cache.set(1, "hello".to_string(), 60_000);
    /// assert_eq!(cache.get(&1), Some(&"hello".to_string()));
    /// ```
    pub fn try_new(max_entries: usize) -> Result<Self, ConfigError> {
        WheelCacheBuilder::new(max_entries).try_build_core()
    }

    pub(crate) fn from_parts(
        arena: EntryArena<K, V>,
        wheel: TimerWheel,
        clock: Arc<dyn TimeSource>,
        tick_ms: u64,
        update_ttl_on_get: bool,
        passive_expiration: bool,
        on_dispose: Option<DisposeFn<K, V>>,
    ) -> Self {
        let max_entries = arena.max_entries();
        Self {
            arena,
            lru: LruList::new(),
            wheel,
            index: FxHashMap::with_capacity_and_hasher(max_entries.min(1024), Default::default()),
            clock,
            tick_ms,
            update_ttl_on_get,
            passive_expiration,
            on_dispose,
            #[cfg(feature = "metrics")]
            metrics: WheelCacheMetrics::default(),
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Hard entry limit.
    #[inline]
    pub fn max_entries(&self) -> usize {
        self.arena.max_entries()
    }

    /// Tick length in milliseconds.
    #[inline]
    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Current tick derived from the time source.
    #[inline]
    pub fn now_tick(&self) -> u64 {
        self.clock.now_ms() / self.tick_ms
    }

    /// Occupancy gauges.
    pub fn stats(&self) -> CacheStats {
        #[cfg(feature = "metrics")]
        self.metrics.record_stats_call();
        CacheStats {
            size: self.index.len(),
            size_allocated: self.arena.size_allocated(),
            free: self.arena.free_count(),
            cap: self.arena.cap(),
            now_tick: self.wheel.now_tick(),
            overflow_len_approx: self.wheel.overflow_len_approx(),
        }
    }

    /// Per-operation counters. Requires the `metrics` feature.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> WheelCacheMetricsSnapshot {
        self.metrics.snapshot(self.index.len(), self.arena.cap())
    }

    /// Inserts or overwrites `key` with the given TTL in milliseconds.
    ///
    /// A zero TTL is rejected silently: the cache is left untouched. When
    /// the cache is full, least-recently-used entries are evicted to make
    /// room (each reported to the disposal callback with
    /// [`DisposeReason::Lru`]).
    pub fn set(&mut self, key: K, value: V, ttl_ms: u64) {
        #[cfg(feature = "metrics")]
        self.metrics.record_set_call();
        if ttl_ms == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_set_rejected();
            return;
        }
        if !self.passive_expiration {
            self.advance_to_now();
        }

        let expire_tick = self.now_tick() + tick_delta(ttl_ms, self.tick_ms);

        if let Some(&id) = self.index.get(&key) {
            let i = id as usize;
            self.arena.values[i] = Some(value);
            self.arena.ttl_ms[i] = ttl_ms;
            self.wheel
                .schedule(&mut self.arena, id, expire_tick)
                .expect("overwrite reschedules to a future tick");
            self.lru.touch(&mut self.arena, id);
            #[cfg(feature = "metrics")]
            self.metrics.record_set_update();
            return;
        }

        while self.index.len() >= self.arena.max_entries() {
            self.evict_lru();
        }

        let id = self
            .arena
            .alloc_id()
            .expect("doubling growth below max_entries cannot fail");
        assert_ne!(id, NIL, "slot allocation failed after eviction made room");
        self.arena
            .set_entry(id, key.clone(), value)
            .expect("freshly allocated id is in range");
        self.arena.ttl_ms[id as usize] = ttl_ms;
        self.index.insert(key, id);
        self.wheel
            .schedule(&mut self.arena, id, expire_tick)
            .expect("insert schedules a future tick");
        self.lru.link_head(&mut self.arena, id);
        #[cfg(feature = "metrics")]
        self.metrics.record_set_new();
    }

    /// Looks up `key`, refreshing its recency (and its TTL when sliding
    /// expiration is enabled).
    ///
    /// An entry whose TTL has already elapsed is removed here and reported
    /// with [`DisposeReason::Ttl`], even if no tick advance has processed it.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.passive_expiration {
            self.advance_to_now();
        }
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };

        let now_tick = self.now_tick();
        if self.arena.expires_tick(id) <= now_tick {
            self.wheel.unlink(&mut self.arena, id);
            self.remove_slot(id, DisposeReason::Ttl);
            #[cfg(feature = "metrics")]
            {
                self.metrics.record_expired_on_read();
                self.metrics.record_get_miss();
            }
            return None;
        }

        self.lru.touch(&mut self.arena, id);
        if self.update_ttl_on_get && self.arena.ttl_ms(id) > 0 {
            let expire_tick = now_tick + tick_delta(self.arena.ttl_ms(id), self.tick_ms);
            self.wheel
                .schedule(&mut self.arena, id, expire_tick)
                .expect("sliding reschedule targets a future tick");
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        self.arena.value(id)
    }

    /// Returns `true` if `key` is present and not expired.
    ///
    /// Performs the same defensive expiry check as [`get`](Self::get) but
    /// never refreshes recency or TTL.
    pub fn has(&mut self, key: &K) -> bool {
        if !self.passive_expiration {
            self.advance_to_now();
        }
        let Some(&id) = self.index.get(key) else {
            return false;
        };
        if self.arena.expires_tick(id) <= self.now_tick() {
            self.wheel.unlink(&mut self.arena, id);
            self.remove_slot(id, DisposeReason::Ttl);
            #[cfg(feature = "metrics")]
            self.metrics.record_expired_on_read();
            return false;
        }
        true
    }

    /// Removes `key`; returns `true` if it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_delete_call();
        if !self.passive_expiration {
            self.advance_to_now();
        }
        let Some(&id) = self.index.get(key) else {
            return false;
        };
        self.wheel.unlink(&mut self.arena, id);
        self.remove_slot(id, DisposeReason::Delete);
        #[cfg(feature = "metrics")]
        self.metrics.record_delete_found();
        true
    }

    /// Removes every entry, reporting each with [`DisposeReason::Clear`].
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        let removed = self.index.len() as u64;
        let Self {
            arena,
            lru,
            wheel,
            index,
            on_dispose,
            ..
        } = self;

        for id in 0..arena.size_allocated() as i32 {
            if !arena.is_live(id) {
                continue;
            }
            if let Some(callback) = on_dispose.as_mut() {
                if let (Some(key), Some(value)) = (arena.key(id), arena.value(id)) {
                    callback(key, value, DisposeReason::Clear);
                }
            }
            wheel.unlink(arena, id);
            arena.free_id(id).expect("live slot freed twice during clear");
        }
        lru.reset();
        index.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear(removed);
    }

    /// Advances the wheel to the clock's current tick, expiring due entries.
    ///
    /// Returns `false` when the work budget ran out before catching up; a
    /// later call resumes from where this one stopped.
    pub fn advance_to_now(&mut self) -> bool {
        let target = self.now_tick();
        self.advance_to_tick(target)
    }

    /// Advances the wheel toward `target_tick` under the work budget.
    ///
    /// Targets are normally at or below the clock's current tick; pushing
    /// the wheel ahead of the clock would make subsequent schedules land in
    /// its past.
    pub fn advance_to_tick(&mut self, target_tick: u64) -> bool {
        #[cfg(feature = "metrics")]
        let mut expired: u64 = 0;
        let Self {
            arena,
            lru,
            wheel,
            index,
            on_dispose,
            ..
        } = self;
        let done = wheel.advance_to_tick(arena, target_tick, |arena, id| {
            Self::dispose_and_free(arena, lru, index, on_dispose, id, DisposeReason::Ttl);
            #[cfg(feature = "metrics")]
            {
                expired += 1;
            }
        });
        #[cfg(feature = "metrics")]
        self.metrics.record_advance(done, expired);
        done
    }

    /// Evicts the least recently used entry to make room.
    fn evict_lru(&mut self) {
        let tail = self.lru.tail();
        assert_ne!(tail, NIL, "capacity eviction with an empty recency list");
        self.wheel.unlink(&mut self.arena, tail);
        self.remove_slot(tail, DisposeReason::Lru);
        #[cfg(feature = "metrics")]
        self.metrics.record_lru_eviction();
    }

    /// Removes a live slot already unlinked from the wheel.
    fn remove_slot(&mut self, id: i32, reason: DisposeReason) {
        let Self {
            arena,
            lru,
            index,
            on_dispose,
            ..
        } = self;
        Self::dispose_and_free(arena, lru, index, on_dispose, id, reason);
    }

    /// Disposal + index removal + recency unlink + slot recycling, shared by
    /// the TTL, LRU, and delete paths. The wheel link must already be gone.
    fn dispose_and_free(
        arena: &mut EntryArena<K, V>,
        lru: &mut LruList,
        index: &mut FxHashMap<K, i32>,
        on_dispose: &mut Option<DisposeFn<K, V>>,
        id: i32,
        reason: DisposeReason,
    ) {
        if let Some(callback) = on_dispose.as_mut() {
            if let (Some(key), Some(value)) = (arena.key(id), arena.value(id)) {
                callback(key, value, reason);
            }
        }
        if let Some(key) = arena.key(id) {
            index.remove(key);
        }
        lru.unlink(arena, id);
        arena.free_id(id).expect("freed a slot that was not live");
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.arena.debug_validate_invariants();
        self.lru.debug_validate_invariants(&self.arena);
        self.wheel.debug_validate_invariants(&self.arena);

        let lru_ids = self.lru.debug_collect(&self.arena);
        assert_eq!(self.index.len(), self.arena.live_count());
        assert_eq!(self.index.len(), lru_ids.len());

        for (key, &id) in &self.index {
            assert!(self.arena.is_live(id));
            assert!(self.arena.key(id) == Some(key), "index points at wrong slot");
            assert_ne!(
                self.arena.wheel_bucket(id),
                crate::ds::entry_arena::BUCKET_NONE,
                "live slot not scheduled in the wheel"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// ConcurrentWheelCache
// ---------------------------------------------------------------------------

struct Advancer {
    stop_tx: mpsc::Sender<()>,
    join: thread::JoinHandle<()>,
}

/// Thread-safe cache handle serializing all access behind one mutex.
///
/// When built with passive expiration (the default), a background thread
/// pumps the wheel every tick; [`close`](Self::close) stops it. Without
/// passive expiration, every user operation pumps the wheel itself.
pub struct ConcurrentWheelCache<K, V> {
    core: Arc<Mutex<WheelCacheCore<K, V>>>,
    advancer: Mutex<Option<Advancer>>,
}

impl<K, V> ConcurrentWheelCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    pub(crate) fn start(core: WheelCacheCore<K, V>) -> Self {
        let passive = core.passive_expiration;
        let tick_ms = core.tick_ms;
        let core = Arc::new(Mutex::new(core));

        let advancer = if passive {
            let (stop_tx, stop_rx) = mpsc::channel();
            let worker = Arc::clone(&core);
            let join = thread::Builder::new()
                .name("wheelcache-advancer".into())
                .spawn(move || loop {
                    match stop_rx.recv_timeout(Duration::from_millis(tick_ms)) {
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            worker.lock().advance_to_now();
                        },
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                })
                .expect("spawn cache advancer thread");
            Some(Advancer { stop_tx, join })
        } else {
            None
        };

        Self {
            core,
            advancer: Mutex::new(advancer),
        }
    }

    /// Inserts or overwrites `key` with the given TTL in milliseconds.
    pub fn set(&self, key: K, value: V, ttl_ms: u64) {
        self.core.lock().set(key, value, ttl_ms);
    }

    /// Looks up `key`, returning a clone of the value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.core.lock().get(key).cloned()
    }

    /// Returns `true` if `key` is present and not expired.
    pub fn has(&self, key: &K) -> bool {
        self.core.lock().has(key)
    }

    /// Removes `key`; returns `true` if it was present.
    pub fn delete(&self, key: &K) -> bool {
        self.core.lock().delete(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.core.lock().clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }

    /// Occupancy gauges.
    pub fn stats(&self) -> CacheStats {
        self.core.lock().stats()
    }

    /// Pumps the wheel to the current tick. Useful when the cache was built
    /// without passive expiration, or from tests driving a manual clock.
    pub fn advance_to_now(&self) -> bool {
        self.core.lock().advance_to_now()
    }

    /// Stops the background advancer. Idempotent; also runs on drop.
    pub fn close(&self) {
        if let Some(advancer) = self.advancer.lock().take() {
            let _ = advancer.stop_tx.send(());
            let _ = advancer.join.join();
        }
    }
}

impl<K, V> Drop for ConcurrentWheelCache<K, V> {
    fn drop(&mut self) {
        if let Some(advancer) = self.advancer.lock().take() {
            let _ = advancer.stop_tx.send(());
            let _ = advancer.join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WheelCacheBuilder;
    use crate::time::ManualClock;

    type Disposals = Arc<Mutex<Vec<(u32, u32, DisposeReason)>>>;

    fn recording_callback(log: &Disposals) -> DisposeFn<u32, u32> {
        let log = Arc::clone(log);
        Box::new(move |k, v, reason| log.lock().push((*k, *v, reason)))
    }

    fn core_with_clock(max: usize, clock: &ManualClock) -> WheelCacheCore<u32, u32> {
        WheelCacheBuilder::new(max)
            .tick_ms(50)
            .clock(Arc::new(clock.clone()))
            .try_build_core()
            .unwrap()
    }

    #[test]
    fn set_then_get_round_trips() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(8, &clock);
        cache.set(1, 100, 10_000);
        assert_eq!(cache.get(&1), Some(&100));
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn zero_ttl_set_is_a_noop() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(8, &clock);
        cache.set(1, 100, 0);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn overwrite_updates_value_and_recency() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(2, &clock);
        cache.set(1, 10, 10_000);
        cache.set(2, 20, 10_000);
        cache.set(1, 11, 10_000);
        // Key 2 is now least recently used; a third insert evicts it.
        cache.set(3, 30, 10_000);
        assert_eq!(cache.get(&1), Some(&11));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(&30));
        cache.debug_validate_invariants();
    }

    #[test]
    fn capacity_eviction_reports_lru_reason() {
        let clock = ManualClock::new();
        let log: Disposals = Arc::new(Mutex::new(Vec::new()));
        let mut cache = WheelCacheBuilder::new(2)
            .tick_ms(50)
            .clock(Arc::new(clock.clone()))
            .on_dispose(recording_callback(&log))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 10_000);
        cache.set(2, 20, 10_000);
        cache.set(3, 30, 10_000);
        assert_eq!(cache.len(), 2);
        assert_eq!(log.lock().as_slice(), &[(1, 10, DisposeReason::Lru)]);
    }

    #[test]
    fn has_does_not_refresh_recency() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(2, &clock);
        cache.set(1, 10, 10_000);
        cache.set(2, 20, 10_000);
        assert!(cache.has(&1));
        // Key 1 stays least recently used despite the `has`.
        cache.set(3, 30, 10_000);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&20));
    }

    #[test]
    fn ttl_expiry_via_advance_disposes_once() {
        let clock = ManualClock::new();
        let log: Disposals = Arc::new(Mutex::new(Vec::new()));
        let mut cache = WheelCacheBuilder::new(8)
            .tick_ms(50)
            .clock(Arc::new(clock.clone()))
            .on_dispose(recording_callback(&log))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 150);
        clock.advance(200);
        assert!(cache.advance_to_now());
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(log.lock().as_slice(), &[(1, 10, DisposeReason::Ttl)]);
        cache.debug_validate_invariants();
    }

    #[test]
    fn expired_entry_is_removed_on_read_without_advance() {
        let clock = ManualClock::new();
        let log: Disposals = Arc::new(Mutex::new(Vec::new()));
        let mut cache = WheelCacheBuilder::new(8)
            .tick_ms(50)
            .clock(Arc::new(clock.clone()))
            .on_dispose(recording_callback(&log))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 150);
        clock.advance(200);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(log.lock().as_slice(), &[(1, 10, DisposeReason::Ttl)]);
    }

    #[test]
    fn has_also_expires_defensively() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(8, &clock);
        cache.set(1, 10, 100);
        clock.advance(150);
        assert!(!cache.has(&1));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn delete_reports_reason_and_is_idempotent() {
        let clock = ManualClock::new();
        let log: Disposals = Arc::new(Mutex::new(Vec::new()));
        let mut cache = WheelCacheBuilder::new(8)
            .tick_ms(50)
            .clock(Arc::new(clock.clone()))
            .on_dispose(recording_callback(&log))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 10_000);
        assert!(cache.delete(&1));
        assert!(!cache.delete(&1));
        assert_eq!(cache.get(&1), None);
        assert_eq!(log.lock().as_slice(), &[(1, 10, DisposeReason::Delete)]);
        cache.debug_validate_invariants();
    }

    #[test]
    fn clear_disposes_everything_once() {
        let clock = ManualClock::new();
        let log: Disposals = Arc::new(Mutex::new(Vec::new()));
        let mut cache = WheelCacheBuilder::new(8)
            .tick_ms(50)
            .clock(Arc::new(clock.clone()))
            .on_dispose(recording_callback(&log))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 10_000);
        cache.set(2, 20, 10_000);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(log.lock().len(), 2);
        assert!(log.lock().iter().all(|(_, _, r)| *r == DisposeReason::Clear));

        // A second clear has nothing left to report.
        cache.clear();
        assert_eq!(log.lock().len(), 2);
        cache.debug_validate_invariants();
    }

    #[test]
    fn slot_reuse_after_expiry_keeps_index_consistent() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(4, &clock);
        cache.set(1, 10, 100);
        clock.advance(200);
        assert!(cache.advance_to_now());

        cache.set(2, 20, 10_000);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&20));
        assert_eq!(cache.stats().size_allocated, 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn sliding_expiration_reschedules_on_get() {
        let clock = ManualClock::new();
        let mut cache = WheelCacheBuilder::new(8)
            .tick_ms(50)
            .update_ttl_on_get(true)
            .clock(Arc::new(clock.clone()))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 200);
        clock.advance(100);
        assert_eq!(cache.get(&1), Some(&10));
        clock.advance(120);
        assert_eq!(cache.get(&1), Some(&10));
        clock.advance(220);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn active_expiration_pumps_on_user_operations() {
        let clock = ManualClock::new();
        let log: Disposals = Arc::new(Mutex::new(Vec::new()));
        let mut cache = WheelCacheBuilder::new(8)
            .tick_ms(50)
            .passive_expiration(false)
            .clock(Arc::new(clock.clone()))
            .on_dispose(recording_callback(&log))
            .try_build_core()
            .unwrap();

        cache.set(1, 10, 100);
        clock.advance(500);
        // The lookup of a different key still drives expiration.
        assert_eq!(cache.get(&2), None);
        assert_eq!(log.lock().as_slice(), &[(1, 10, DisposeReason::Ttl)]);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn stats_reflect_occupancy() {
        let clock = ManualClock::new();
        let mut cache = core_with_clock(8, &clock);
        cache.set(1, 10, 10_000);
        cache.set(2, 20, 10_000);
        cache.delete(&1);

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.size_allocated, 2);
        assert_eq!(stats.free, 1);
        assert!(stats.cap >= 2);
    }

    #[test]
    fn concurrent_wrapper_serializes_and_closes_idempotently() {
        let clock = ManualClock::new();
        let cache = WheelCacheBuilder::<u32, String>::new(8)
            .tick_ms(50)
            .passive_expiration(false)
            .clock(Arc::new(clock.clone()))
            .try_build()
            .unwrap();

        cache.set(1, "one".to_string(), 10_000);
        assert_eq!(cache.get(&1), Some("one".to_string()));
        assert!(cache.has(&1));
        assert_eq!(cache.len(), 1);

        clock.advance(20_000);
        cache.advance_to_now();
        assert_eq!(cache.len(), 0);

        cache.close();
        cache.close();
    }

    #[test]
    fn concurrent_wrapper_is_shareable_across_threads() {
        let cache = Arc::new(
            WheelCacheBuilder::<u32, u32>::new(64)
                .passive_expiration(false)
                .try_build()
                .unwrap(),
        );

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for n in 0..50u32 {
                        cache.set(t * 100 + n, n, 60_000);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 64);
        cache.close();
    }
}
