//! Request admission control.
//!
//! [`AdmissionGate`] answers one question per request: may it proceed? It
//! counts calls per key in a shared [`CounterStore`] using fixed windows:
//! the window opens with the first counted call for a key and closes when
//! the store expires that key. The gate itself holds no counts, so every
//! instance sharing one store enforces one common limit.
//!
//! The gate knows nothing about what it protects. Callers pick the key
//! (one global key, a client address, a user id) and decide what to do when
//! the store fails: a [`GateError`] is never folded into an allow or a deny.

use std::{sync::Arc, time::Duration};

use thiserror::Error;

pub use memory::MemoryCounterStore;
pub use rest::RestCounterStore;
pub use store::{CounterError, CounterStore};

mod memory;
mod rest;
mod store;

#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    Store(#[from] CounterError),
    #[error("counter store did not answer within {0:?}")]
    Timeout(Duration),
    #[error("invalid admission policy: {0}")]
    InvalidPolicy(String),
}

/// Threshold and window of the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatePolicy {
    /// Requests admitted per key and window.
    pub max_requests: u64,
    pub window: Duration,
    /// Upper bound for one counter store call.
    pub timeout: Duration,
    /// Namespace prepended to every key in the store.
    pub prefix: String,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            timeout: Duration::from_secs(1),
            prefix: "ledger-rate-limit".to_string(),
        }
    }
}

/// Outcome of [`AdmissionGate::admit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Calls counted in the current window, this one included.
    pub count: u64,
    pub limit: u64,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }
}

#[derive(Clone)]
pub struct AdmissionGate {
    store: Arc<dyn CounterStore>,
    policy: GatePolicy,
}

impl AdmissionGate {
    pub fn new(store: Arc<dyn CounterStore>, policy: GatePolicy) -> Result<Self, GateError> {
        if policy.max_requests == 0 {
            return Err(GateError::InvalidPolicy(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        if policy.window.is_zero() {
            return Err(GateError::InvalidPolicy(
                "window must be greater than zero".to_string(),
            ));
        }
        if policy.timeout.is_zero() {
            return Err(GateError::InvalidPolicy(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Self { store, policy })
    }

    /// Count one call for `key` and decide whether it may proceed.
    ///
    /// The call is counted even when it is denied.
    pub async fn admit(&self, key: &str) -> Result<Decision, GateError> {
        let scoped = format!("{}:{key}", self.policy.prefix);
        let count = tokio::time::timeout(
            self.policy.timeout,
            self.store.increment(&scoped, self.policy.window),
        )
        .await
        .map_err(|_| GateError::Timeout(self.policy.timeout))??;

        let decision = Decision {
            allowed: count <= self.policy.max_requests,
            count,
            limit: self.policy.max_requests,
        };
        if !decision.allowed {
            tracing::debug!("admission denied for {scoped}: {count}/{}", decision.limit);
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FailingStore;

    #[async_trait]
    impl CounterStore for FailingStore {
        async fn increment(&self, _key: &str, _ttl: Duration) -> Result<u64, CounterError> {
            Err(CounterError::Unavailable("connection refused".to_string()))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl CounterStore for StalledStore {
        async fn increment(&self, _key: &str, _ttl: Duration) -> Result<u64, CounterError> {
            std::future::pending::<Result<u64, CounterError>>().await
        }
    }

    fn policy(max_requests: u64, window_secs: u64) -> GatePolicy {
        GatePolicy {
            max_requests,
            window: Duration::from_secs(window_secs),
            ..GatePolicy::default()
        }
    }

    fn memory_gate(max_requests: u64, window_secs: u64) -> AdmissionGate {
        AdmissionGate::new(
            Arc::new(MemoryCounterStore::new()),
            policy(max_requests, window_secs),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn first_n_calls_pass_then_deny_until_window_expires() {
        let gate = memory_gate(3, 60);

        for count in 1..=3 {
            let decision = gate.admit("global").await.unwrap();
            assert!(decision.is_allowed());
            assert_eq!(decision.count, count);
        }
        let denied = gate.admit("global").await.unwrap();
        assert!(!denied.is_allowed());
        assert_eq!(denied.remaining(), 0);

        tokio::time::advance(Duration::from_secs(60)).await;
        let decision = gate.admit("global").await.unwrap();
        assert!(decision.is_allowed());
        assert_eq!(decision.count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn denied_calls_are_still_counted() {
        let gate = memory_gate(1, 60);

        assert!(gate.admit("k").await.unwrap().is_allowed());
        assert_eq!(gate.admit("k").await.unwrap().count, 2);
        assert_eq!(gate.admit("k").await.unwrap().count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_limited_independently() {
        let gate = memory_gate(1, 60);

        assert!(gate.admit("10.0.0.1").await.unwrap().is_allowed());
        assert!(!gate.admit("10.0.0.1").await.unwrap().is_allowed());
        assert!(gate.admit("10.0.0.2").await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn store_failure_is_an_error_not_a_decision() {
        let gate = AdmissionGate::new(Arc::new(FailingStore), policy(10, 60)).unwrap();

        let err = gate.admit("global").await.unwrap_err();
        assert!(matches!(err, GateError::Store(CounterError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_times_out() {
        let gate = AdmissionGate::new(Arc::new(StalledStore), policy(10, 60)).unwrap();

        let err = gate.admit("global").await.unwrap_err();
        assert!(matches!(err, GateError::Timeout(t) if t == Duration::from_secs(1)));
    }

    #[test]
    fn rejects_degenerate_policies() {
        let store: Arc<dyn CounterStore> = Arc::new(MemoryCounterStore::new());
        assert!(AdmissionGate::new(store.clone(), policy(0, 60)).is_err());
        assert!(AdmissionGate::new(store.clone(), policy(1, 0)).is_err());
        let no_timeout = GatePolicy {
            timeout: Duration::ZERO,
            ..policy(1, 60)
        };
        assert!(AdmissionGate::new(store, no_timeout).is_err());
    }
}
