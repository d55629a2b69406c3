use crate::metrics::cell::ReadCounter;
use crate::metrics::snapshot::WheelCacheMetricsSnapshot;
use crate::metrics::traits::WheelCacheMetricsRecorder;

/// Counter set maintained by [`WheelCacheCore`](crate::cache::WheelCacheCore).
///
/// Most counters are plain fields bumped through `&mut self`; the read-only
/// gauge paths record through [`ReadCounter`].
#[derive(Debug, Default)]
pub struct WheelCacheMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub expired_on_read: u64,
    pub set_calls: u64,
    pub set_new: u64,
    pub set_updates: u64,
    pub set_rejected: u64,
    pub delete_calls: u64,
    pub delete_found: u64,
    pub lru_evictions: u64,
    pub ttl_expirations: u64,
    pub clear_calls: u64,
    pub cleared_entries: u64,
    pub advance_calls: u64,
    pub advance_partial: u64,
    pub stats_calls: ReadCounter,
}

impl WheelCacheMetrics {
    /// Captures the counters plus the supplied occupancy gauges.
    pub fn snapshot(&self, cache_len: usize, cap: usize) -> WheelCacheMetricsSnapshot {
        WheelCacheMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            expired_on_read: self.expired_on_read,
            set_calls: self.set_calls,
            set_new: self.set_new,
            set_updates: self.set_updates,
            set_rejected: self.set_rejected,
            delete_calls: self.delete_calls,
            delete_found: self.delete_found,
            lru_evictions: self.lru_evictions,
            ttl_expirations: self.ttl_expirations,
            clear_calls: self.clear_calls,
            cleared_entries: self.cleared_entries,
            advance_calls: self.advance_calls,
            advance_partial: self.advance_partial,
            stats_calls: self.stats_calls.total(),
            cache_len,
            cap,
        }
    }

    /// Records a `stats()` call from a shared reference.
    #[inline]
    pub fn record_stats_call(&self) {
        self.stats_calls.record();
    }
}

impl WheelCacheMetricsRecorder for WheelCacheMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_expired_on_read(&mut self) {
        self.expired_on_read += 1;
        self.ttl_expirations += 1;
    }

    fn record_set_call(&mut self) {
        self.set_calls += 1;
    }

    fn record_set_new(&mut self) {
        self.set_new += 1;
    }

    fn record_set_update(&mut self) {
        self.set_updates += 1;
    }

    fn record_set_rejected(&mut self) {
        self.set_rejected += 1;
    }

    fn record_delete_call(&mut self) {
        self.delete_calls += 1;
    }

    fn record_delete_found(&mut self) {
        self.delete_found += 1;
    }

    fn record_lru_eviction(&mut self) {
        self.lru_evictions += 1;
    }

    fn record_clear(&mut self, removed: u64) {
        self.clear_calls += 1;
        self.cleared_entries += removed;
    }

    fn record_advance(&mut self, done: bool, expired: u64) {
        self.advance_calls += 1;
        if !done {
            self.advance_partial += 1;
        }
        self.ttl_expirations += expired;
    }
}
