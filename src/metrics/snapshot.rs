#[derive(Debug, Default, Clone, Copy)]
pub struct WheelCacheMetricsSnapshot {
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
    pub advance_partial: u64, // advances that paused on the work budget
    pub stats_calls: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub cap: usize,
}
