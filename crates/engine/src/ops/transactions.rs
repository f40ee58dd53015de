use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, NewTransaction, ResultEngine, Transaction, ensure_required_text,
    transactions,
};

use super::Engine;

impl Engine {
    /// Record a new transaction and return it with its store-assigned id.
    ///
    /// Every field is validated before the insert is issued. A failed insert
    /// is returned as is: there is no idempotency key, so retrying could
    /// record the same movement twice.
    pub async fn create_transaction(&self, new: NewTransaction) -> ResultEngine<Transaction> {
        ensure_required_text(&new.user_id, "user_id")?;
        ensure_required_text(&new.title, "title")?;
        ensure_required_text(&new.category, "category")?;
        let amount = new.amount.ensure_storable()?;
        let created_at = new.created_at.unwrap_or_else(|| Utc::now().date_naive());

        let row = transactions::active_model(
            new.user_id,
            new.title,
            amount,
            new.category,
            created_at,
        );
        let model = self.bounded(row.insert(&self.database)).await?;

        tracing::debug!(
            "created transaction {} for user {}",
            model.id,
            model.user_id
        );
        Ok(model.into())
    }

    /// All transactions of `user_id`, most recent `created_at` first and
    /// newest id first within the same day.
    pub async fn list_transactions(&self, user_id: &str) -> ResultEngine<Vec<Transaction>> {
        let models = self
            .bounded(
                transactions::Entity::find()
                    .filter(transactions::Column::UserId.eq(user_id))
                    .order_by_desc(transactions::Column::CreatedAt)
                    .order_by_desc(transactions::Column::Id)
                    .all(&self.database),
            )
            .await?;

        Ok(models.into_iter().map(Transaction::from).collect())
    }

    /// Delete one transaction by id.
    ///
    /// With `owner` set, only a transaction belonging to that user is
    /// removed; someone else's row is reported as missing.
    pub async fn delete_transaction(&self, id: i32, owner: Option<&str>) -> ResultEngine<()> {
        let mut delete = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(id));
        if let Some(owner) = owner {
            delete = delete.filter(transactions::Column::UserId.eq(owner));
        }

        let result = self.bounded(delete.exec(&self.database)).await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound(format!("transaction {id}")));
        }

        tracing::debug!("deleted transaction {id}");
        Ok(())
    }
}
