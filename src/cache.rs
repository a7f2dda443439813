use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fingerprint::fingerprint;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::shard::Shard;
use crate::stats::{SweepCounters, SweepStats};
use crate::sweeper::{self, Pacer, Schedule, ThreadPacer};

/// State shared between a cache handle and its sweeper thread.
pub(crate) struct Shared {
    pub(crate) shards: Box<[Shard]>,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) stats: SweepCounters,
}

/// A sharded, fixed-capacity membership cache for byte strings.
///
/// Each value is placed by its [`fingerprint`] into the same slot index of
/// one of the shards. `add` takes the first shard whose slot is free or
/// already holds the value; when every shard's slot is taken by something
/// else, the slot in shard `fingerprint % shard_count` is overwritten and the
/// previous occupant is dropped.
///
/// A background sweeper started at construction repeatedly offers every
/// cached value to the eviction predicate and clears the ones it selects.
/// Call [`DirectCache::stop`] to end it; dropping the cache does the same.
///
/// Operations on different shards are independent: `add` and `remove` are
/// not atomic across shards.
///
/// ```
/// use direct_cache::DirectCache;
///
/// let cache = DirectCache::new(8, |_| false).unwrap();
/// cache.add("hello");
/// assert!(cache.contains("hello"));
/// assert!(cache.remove("hello"));
/// assert!(!cache.contains("hello"));
/// cache.stop();
/// ```
pub struct DirectCache {
    shared: Arc<Shared>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl DirectCache {
    /// Creates a cache with `shard_count` shards and default pacing, and
    /// starts its sweeper.
    pub fn new<F>(shard_count: usize, evict: F) -> Result<Self>
    where
        F: FnMut(&[u8]) -> bool + Send + 'static,
    {
        Self::with_config(CacheConfig::with_shards(shard_count), evict)
    }

    /// Creates a cache from `config` with the default [`ThreadPacer`].
    pub fn with_config<F>(config: CacheConfig, evict: F) -> Result<Self>
    where
        F: FnMut(&[u8]) -> bool + Send + 'static,
    {
        Self::with_pacer(config, ThreadPacer, evict)
    }

    /// Like [`DirectCache::with_config`] with a custom [`Pacer`] driving the
    /// sweeper's pauses.
    pub fn with_pacer<P, F>(config: CacheConfig, pacer: P, evict: F) -> Result<Self>
    where
        P: Pacer,
        F: FnMut(&[u8]) -> bool + Send + 'static,
    {
        config.validate()?;

        let shards = (0..config.shard_count).map(|_| Shard::new()).collect();
        let shared = Arc::new(Shared {
            shards,
            lifecycle: Lifecycle::new(),
            stats: SweepCounters::default(),
        });

        let schedule = Schedule {
            sweep_interval: config.sweep_interval,
            shard_pause: config.shard_pause,
        };
        let handle = sweeper::spawn(
            config.thread_name,
            Arc::clone(&shared),
            schedule,
            pacer,
            evict,
        )
        .map_err(CacheError::SpawnSweeper)?;

        debug!(
            shards = config.shard_count,
            sweep_interval = ?config.sweep_interval,
            shard_pause = ?config.shard_pause,
            "direct cache started"
        );

        Ok(Self {
            shared,
            sweeper: Mutex::new(Some(handle)),
        })
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shared.shards.len()
    }

    /// Inserts `value`. Never fails, but may overwrite an unrelated value
    /// with the same fingerprint. The empty string is never stored.
    pub fn add(&self, value: impl AsRef<[u8]>) {
        let value = value.as_ref();
        if value.is_empty() {
            return;
        }

        let index = fingerprint(value);
        if self.shared.shards.iter().any(|s| s.claim(index, value)) {
            return;
        }

        let fallback = usize::from(index) % self.shard_count();
        if let Some(displaced) = self.shared.shards[fallback].overwrite(index, value) {
            debug!(
                slot = index,
                shard = fallback,
                displaced_len = displaced.len(),
                "collision overwrote cached value"
            );
        }
    }

    /// True if some shard holds exactly `value`.
    pub fn contains(&self, value: impl AsRef<[u8]>) -> bool {
        let value = value.as_ref();
        if value.is_empty() {
            return false;
        }

        let index = fingerprint(value);
        self.shared.shards.iter().any(|s| s.holds(index, value))
    }

    /// Removes every copy of `value`. True if at least one shard held it.
    pub fn remove(&self, value: impl AsRef<[u8]>) -> bool {
        let value = value.as_ref();
        if value.is_empty() {
            return false;
        }

        let index = fingerprint(value);
        let mut removed = false;
        for shard in self.shared.shards.iter() {
            removed |= shard.release(index, value);
        }
        removed
    }

    /// Number of occupied slots across all shards. A value stored in several
    /// shards counts once per shard.
    pub fn len(&self) -> usize {
        self.shared.shards.iter().map(Shard::len).sum()
    }

    /// True if no shard holds any value.
    pub fn is_empty(&self) -> bool {
        self.shared.shards.iter().all(|s| s.len() == 0)
    }

    /// Empties every shard, one shard lock at a time.
    pub fn clear(&self) {
        for shard in self.shared.shards.iter() {
            shard.clear();
        }
    }

    /// Runs one sweep cycle on the calling thread with `evict`, independent
    /// of the background sweeper. Returns the number of slots cleared.
    ///
    /// Works after [`DirectCache::stop`] too.
    pub fn sweep_with<F>(&self, mut evict: F) -> usize
    where
        F: FnMut(&[u8]) -> bool,
    {
        let mut evicted = 0;
        for shard in self.shared.shards.iter() {
            let n = shard.sweep(&mut evict);
            self.shared.stats.record_evictions(n);
            evicted += n;
        }
        self.shared.stats.record_cycle();
        evicted
    }

    /// Snapshot of sweep activity so far.
    pub fn sweep_stats(&self) -> SweepStats {
        self.shared.stats.snapshot()
    }

    /// Current lifecycle state, `Running` until [`DirectCache::stop`].
    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    /// Shorthand for `state() == LifecycleState::Running`.
    pub fn is_running(&self) -> bool {
        self.shared.lifecycle.is_running()
    }

    /// Stops the sweeper and waits for it to exit. A shard scan already in
    /// progress finishes first; no sweeper eviction happens after this
    /// returns. Idempotent. The cache stays usable for `add`, `contains` and
    /// `remove`.
    pub fn stop(&self) {
        if self.shared.lifecycle.stop() {
            debug!("direct cache stopping");
        }

        // the guard stays held across the join so a concurrent stop() waits
        // for the sweeper too; the sweeper never takes this lock
        let mut sweeper = self.sweeper.lock();
        let Some(handle) = sweeper.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        // run() catches predicate panics, so join only fails on a panic
        // outside the predicate; nothing is left to clean up either way
        let _ = handle.join();
    }
}

impl Drop for DirectCache {
    fn drop(&mut self) {
        self.stop();
    }
}
