//! Error types for cache construction.
//!
//! `add`, `contains` and `remove` are total and never fail. Only building a
//! cache can: either the configuration is rejected or the sweeper thread
//! cannot be started.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn sweeper thread")]
    SpawnSweeper(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
