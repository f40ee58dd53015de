//! Transaction primitives.
//!
//! A `Transaction` is one signed money movement owned by a single user. Rows
//! are only ever inserted or deleted: there is no update path, so every
//! summary is a plain aggregate over the rows that currently exist.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Amount;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub amount: Amount,
    pub category: String,
    pub created_at: NaiveDate,
}

/// Input of [`Engine::create_transaction`](crate::Engine::create_transaction).
///
/// `created_at` defaults to the current UTC date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: String,
    pub title: String,
    pub amount: Amount,
    pub category: String,
    pub created_at: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub title: String,
    pub amount_minor: i64,
    pub category: String,
    pub created_at: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            amount: Amount::new(model.amount_minor),
            category: model.category,
            created_at: model.created_at,
        }
    }
}

/// Builds the row for an already validated transaction. The id is left to
/// the store.
pub(crate) fn active_model(
    user_id: String,
    title: String,
    amount: Amount,
    category: String,
    created_at: NaiveDate,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user_id),
        title: ActiveValue::Set(title),
        amount_minor: ActiveValue::Set(amount.cents()),
        category: ActiveValue::Set(category),
        created_at: ActiveValue::Set(created_at),
    }
}
