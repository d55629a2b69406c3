//! Operation counters for the cache, enabled with the `metrics` feature.
//!
//! Counters are plain `u64` fields (or [`cell::ReadCounter`] where a shared
//! reference must record), mutated inline on the hot path and read out as a
//! point-in-time [`snapshot::WheelCacheMetricsSnapshot`].

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
