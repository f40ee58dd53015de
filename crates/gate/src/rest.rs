//! Counter store backed by a Redis REST endpoint (Upstash compatible).
//!
//! Each increment is one `multi-exec` call running `INCR key` and
//! `PEXPIRE key ttl NX` as a single Redis transaction, so the expiry is only
//! set by the request that created the key.
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{CounterError, CounterStore};

#[derive(Debug, Clone)]
pub struct RestCounterStore {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

/// One entry of the `multi-exec` reply array.
#[derive(Debug, Deserialize)]
struct Reply {
    result: Option<Value>,
    error: Option<String>,
}

impl RestCounterStore {
    /// `url` is the REST base URL; `token` is sent as a bearer token.
    pub fn new(url: &str, token: &str) -> Result<Self, CounterError> {
        let base = url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(CounterError::Unavailable(
                "counter store url is empty".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            endpoint: format!("{base}/multi-exec"),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl CounterStore for RestCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64, CounterError> {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let commands = json!([
            ["INCR", key],
            ["PEXPIRE", key, ttl_ms.to_string(), "NX"],
        ]);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&commands)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CounterError::Unavailable(format!(
                "counter store answered {status}"
            )));
        }

        let replies: Vec<Reply> = response.json().await?;
        let first = replies
            .into_iter()
            .next()
            .ok_or_else(|| CounterError::Protocol("empty reply".to_string()))?;
        if let Some(error) = first.error {
            return Err(CounterError::Protocol(error));
        }

        match first.result {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| CounterError::Protocol(format!("invalid count {n}"))),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| CounterError::Protocol(format!("invalid count {s}"))),
            other => Err(CounterError::Protocol(format!("invalid count {other:?}"))),
        }
    }
}
