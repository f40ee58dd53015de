//! JSON bodies of the transactions API.
//!
//! Field names are camelCase on the wire; the create body also accepts the
//! snake_case column names.
use chrono::NaiveDate;
use engine::{Amount, NewTransaction, Summary, Transaction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNew {
    #[serde(alias = "user_id")]
    pub user_id: String,
    pub title: String,
    pub amount: Amount,
    pub category: String,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<NaiveDate>,
}

impl From<TransactionNew> for NewTransaction {
    fn from(value: TransactionNew) -> Self {
        Self {
            user_id: value.user_id,
            title: value.title,
            amount: value.amount,
            category: value.category,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub amount: Amount,
    pub category: String,
    pub created_at: NaiveDate,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            title: tx.title,
            amount: tx.amount,
            category: tx.category,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDeleted {
    pub message: String,
    pub id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryView {
    pub balance: Amount,
    pub income: Amount,
    pub expense: Amount,
}

impl From<Summary> for SummaryView {
    fn from(summary: Summary) -> Self {
        Self {
            balance: summary.balance,
            income: summary.income,
            expense: summary.expense,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Machine readable error class, e.g. `validation` or `rate_limited`.
    pub kind: String,
}
