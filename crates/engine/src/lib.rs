//! Transaction ledger.
//!
//! [`Engine`] owns the four ledger operations (create, list by user, delete by
//! id, summarize by user) over the `transactions` table created by the
//! `migration` crate. The engine keeps no mutable state of its own: every
//! operation is a single statement against the database, so handlers can
//! share one `Engine` freely.
use std::time::Duration;

use sea_orm::DatabaseConnection;

pub use error::EngineError;
pub use money::Amount;
pub use summary::Summary;
pub use transactions::{NewTransaction, Transaction};

mod error;
mod money;
mod ops;
mod summary;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Column width of the text fields (`VARCHAR(255)`).
const MAX_TEXT_LEN: usize = 255;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    statement_timeout: Option<Duration>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    statement_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Upper bound for a single ledger statement. Without it the engine waits
    /// as long as the connection pool does.
    pub fn statement_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.statement_timeout.is_some_and(|t| t.is_zero()) {
            return Err(EngineError::Validation(
                "statement timeout must be greater than zero".to_string(),
            ));
        }
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
            statement_timeout: self.statement_timeout,
        })
    }
}

/// Check a required text field is not blank and fits its column.
///
/// The value is stored exactly as given: ids and labels are opaque, so
/// `"u1 "` and `"u1"` are different users.
fn ensure_required_text(value: &str, label: &str) -> ResultEngine<()> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(EngineError::Validation(format!(
            "{label} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}
