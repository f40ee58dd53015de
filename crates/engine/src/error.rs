//! The module contains the errors the engine can return.
//!
//! - [`Validation`] the caller sent something the ledger cannot store.
//! - [`NotFound`] the referenced transaction does not exist.
//! - [`Database`] and [`Timeout`] the ledger store failed or did not answer
//!   in time. Neither is retried by the engine.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`Database`]: EngineError::Database
//!  [`Timeout`]: EngineError::Timeout
use std::time::Duration;

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("ledger store did not answer within {0:?}")]
    Timeout(Duration),
}

impl EngineError {
    /// Returns `true` when the error comes from the ledger store rather than
    /// from the caller's input.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Timeout(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            _ => false,
        }
    }
}
