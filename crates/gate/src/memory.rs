//! Process-local counter store.
//!
//! Counts live in this process only, so two service instances never share a
//! limit. Meant for tests and single-instance deployments.
use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{CounterError, CounterStore};

#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, Counter>>,
}

#[derive(Debug)]
struct Counter {
    count: u64,
    expires_at: Instant,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError> {
        let now = Instant::now();
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| CounterError::Unavailable("counter map poisoned".to_string()))?;

        counters.retain(|_, counter| counter.expires_at > now);
        let counter = counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: now + ttl,
        });
        counter.count += 1;
        Ok(counter.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_until_expiry() {
        let store = MemoryCounterStore::new();
        let ttl = Duration::from_secs(10);

        assert_eq!(store.increment("a", ttl).await.unwrap(), 1);
        assert_eq!(store.increment("a", ttl).await.unwrap(), 2);
        assert_eq!(store.increment("b", ttl).await.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.increment("a", ttl).await.unwrap(), 3);

        // The window started with the first increment, not the last one.
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.increment("a", ttl).await.unwrap(), 1);
    }
}
