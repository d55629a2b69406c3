//! Recorder trait implemented by the cache's metrics struct.
//!
//! Keeping the recording surface behind a trait keeps call sites uniform and
//! lets tests substitute a recorder when exercising instrumentation.

/// Records the outcomes of cache operations.
pub trait WheelCacheMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    /// A read observed an elapsed TTL and removed the entry itself.
    fn record_expired_on_read(&mut self);

    fn record_set_call(&mut self);
    fn record_set_new(&mut self);
    fn record_set_update(&mut self);
    /// `set` was a no-op because the TTL was invalid.
    fn record_set_rejected(&mut self);

    fn record_delete_call(&mut self);
    fn record_delete_found(&mut self);

    /// An entry was evicted to make room for an insert.
    fn record_lru_eviction(&mut self);

    /// `clear` removed `removed` entries.
    fn record_clear(&mut self, removed: u64);

    /// One advance call finished (`done`) or paused on budget, expiring
    /// `expired` entries along the way.
    fn record_advance(&mut self, done: bool, expired: u64);
}
