use sea_orm::{QueryFilter, QuerySelect, prelude::*, sea_query::Expr};

use crate::{Amount, ResultEngine, Summary, transactions};

use super::Engine;

impl Engine {
    /// Summarize every transaction of `user_id`.
    ///
    /// Both totals come from one aggregate statement, so the result reflects a
    /// single snapshot of the user's rows even under concurrent writes.
    pub async fn summarize(&self, user_id: &str) -> ResultEngine<Summary> {
        let totals: Option<(i64, i64)> = self
            .bounded(
                transactions::Entity::find()
                    .select_only()
                    .column_as(
                        Expr::cust(
                            "CAST(COALESCE(SUM(CASE WHEN amount_minor >= 0 \
                             THEN amount_minor ELSE 0 END), 0) AS BIGINT)",
                        ),
                        "income",
                    )
                    .column_as(
                        Expr::cust(
                            "CAST(COALESCE(SUM(CASE WHEN amount_minor < 0 \
                             THEN -amount_minor ELSE 0 END), 0) AS BIGINT)",
                        ),
                        "expense",
                    )
                    .filter(transactions::Column::UserId.eq(user_id))
                    .into_tuple()
                    .one(&self.database),
            )
            .await?;

        let (income, expense) = totals.unwrap_or_default();
        Ok(Summary::new(Amount::new(income), Amount::new(expense)))
    }
}
