//! The counter store contract consumed by the gate.
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors a counter store can return.
#[derive(Error, Debug)]
pub enum CounterError {
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected counter store reply: {0}")]
    Protocol(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Shared counter with atomic increment-with-expiry.
///
/// Implementations must make [`increment`](CounterStore::increment) atomic
/// across every process sharing the store: the gate relies on it instead of
/// any local lock.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter for `key` and return the new count.
    ///
    /// When the increment creates the key, it expires after `ttl`. Later
    /// increments leave the expiry untouched.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError>;
}
