pub use crate::builder::WheelCacheBuilder;
pub use crate::cache::{
    CacheStats, ConcurrentWheelCache, DisposeFn, DisposeReason, WheelCacheCore,
};
pub use crate::error::{ConfigError, CoreError};
pub use crate::time::{ManualClock, MonotonicClock, TimeSource};
