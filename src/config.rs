//! Cache configuration and its builder.
//!
//! The defaults reproduce the classic cadence of one pause per sweep cycle
//! plus one pause before each shard, one second each.

use std::time::Duration;

use crate::error::{CacheError, Result};

pub const DEFAULT_SHARD_COUNT: usize = 8;
/// Upper bound on shards. Each shard preallocates [`SLOT_COUNT`](crate::SLOT_COUNT)
/// slots, about 1 MiB, so this caps the tables at roughly 1 GiB.
pub const MAX_SHARD_COUNT: usize = 1024;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_SHARD_PAUSE: Duration = Duration::from_secs(1);
pub const DEFAULT_THREAD_NAME: &str = "direct-cache-sweeper";

/// Configuration for a [`DirectCache`](crate::DirectCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of shards, `1..=MAX_SHARD_COUNT`. Every shard costs about
    /// 1 MiB up front, whatever is stored in it.
    pub shard_count: usize,

    /// Pause at the start of every sweep cycle.
    pub sweep_interval: Duration,

    /// Pause before scanning each shard.
    pub shard_pause: Duration,

    /// Name given to the sweeper thread.
    pub thread_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            shard_pause: DEFAULT_SHARD_PAUSE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Default pacing with the given number of shards.
    ///
    /// # Example
    /// ```
    /// use direct_cache::CacheConfig;
    ///
    /// let config = CacheConfig::with_shards(16);
    /// assert_eq!(config.shard_count, 16);
    /// ```
    pub fn with_shards(shard_count: usize) -> Self {
        Self {
            shard_count,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(CacheError::InvalidConfig(
                "shard_count must be greater than 0".into(),
            ));
        }
        if self.shard_count > MAX_SHARD_COUNT {
            return Err(CacheError::InvalidConfig(format!(
                "shard_count must be at most {MAX_SHARD_COUNT}, got {}",
                self.shard_count
            )));
        }
        if self.thread_name.is_empty() {
            return Err(CacheError::InvalidConfig(
                "thread_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CacheConfig`] with fluent API
///
/// ```
/// use std::time::Duration;
///
/// use direct_cache::CacheConfig;
///
/// let config = CacheConfig::builder()
///     .shard_count(4)
///     .sweep_interval(Duration::from_millis(250))
///     .shard_pause(Duration::ZERO)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.shard_count, 4);
/// ```
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.config.shard_count = shard_count;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    pub fn shard_pause(mut self, pause: Duration) -> Self {
        self.config.shard_pause = pause;
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<CacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
