//! wheelcache: bounded key/value caching with TTL and LRU eviction.
//!
//! One entry arena, two intrusive lists woven through it: a hashed timer
//! wheel expires entries when their TTL elapses, a recency list evicts the
//! least recently used entry when the cache is full.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod time;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
