//! # direct-cache — Sharded, Fixed-Capacity Membership Cache
//!
//! This crate provides a **thread-safe membership cache for short byte
//! strings**, suited to questions such as "is this word on the blacklist?"
//! where the list changes at runtime.
//!
//! Storage is a set of independent shards. Each shard is a fixed table of
//! 65 536 slots behind its own `RwLock`, indexed by a byte-sum
//! [`fingerprint`]. There is no resizing and no allocation beyond the stored
//! values themselves.
//!
//! ---
//!
//! ## Placement
//!
//! - `add` scans shards in order and takes the first slot that is free or
//!   already holds the value
//! - if every shard's slot holds something else, shard
//!   `fingerprint % shard_count` is overwritten
//! - `contains` returns on the first shard holding the value
//! - `remove` clears the value from every shard
//!
//! Colliding values can therefore evict each other. That is accepted: the
//! cache trades exactness for constant-time, allocation-free lookups.
//!
//! ---
//!
//! ## Background Sweep
//!
//! Construction starts a sweeper thread that repeatedly locks one shard at a
//! time and asks the caller's predicate about every occupied slot, clearing
//! the ones it selects. Pacing between cycles and shards comes from
//! [`CacheConfig`] and can be replaced with a custom [`Pacer`].
//!
//! A panic inside the predicate stops the sweeper only. The cache keeps
//! serving `add`, `contains` and `remove`, and [`SweepStats::faulted`] is set.
//!
//! ---
//!
//! ## Example
//!
//! ```rust
//! use direct_cache::DirectCache;
//!
//! let cache = DirectCache::new(8, |value| value.starts_with(b"tmp:")).unwrap();
//!
//! cache.add("hello");
//! cache.add("x");
//!
//! assert!(cache.contains("hello"));
//! assert!(!cache.contains("z"));
//! assert!(cache.remove("hello"));
//! assert!(!cache.contains("hello"));
//! assert!(cache.contains("x"));
//!
//! cache.stop();
//! ```
//!
//! ---
//!
//! ## Consistency
//!
//! Each shard is locked independently, so `add` and `remove` are not atomic
//! across shards, and the sweeper only ever sees one shard at a time.

mod cache;
mod config;
mod error;
mod fingerprint;
mod lifecycle;
mod shard;
mod stats;
mod sweeper;

pub use cache::DirectCache;
pub use config::{
    CacheConfig, CacheConfigBuilder, DEFAULT_SHARD_COUNT, DEFAULT_SHARD_PAUSE,
    DEFAULT_SWEEP_INTERVAL, DEFAULT_THREAD_NAME, MAX_SHARD_COUNT,
};
pub use error::{CacheError, Result};
pub use fingerprint::{SLOT_COUNT, fingerprint};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use stats::SweepStats;
pub use sweeper::{Pacer, ThreadPacer};
