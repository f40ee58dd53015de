use std::future::Future;

use sea_orm::DbErr;

use crate::{EngineError, ResultEngine};

use super::Engine;

mod summary;
mod transactions;

impl Engine {
    /// Await a store call, giving up after the configured statement timeout.
    ///
    /// A timed out call is reported, never retried: the statement may still
    /// have committed.
    async fn bounded<T, F>(&self, call: F) -> ResultEngine<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match self.statement_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(EngineError::from),
                Err(_) => {
                    tracing::warn!("ledger statement exceeded {limit:?}");
                    Err(EngineError::Timeout(limit))
                }
            },
            None => call.await.map_err(EngineError::from),
        }
    }
}
