//! Ledger schema: a single `transactions` table plus the `user_id` index used
//! by per-user listing and summaries.
//!
//! `amount_minor` holds signed integer cents. The check constraint keeps it
//! inside the DECIMAL(10,2) range: at most 8 integer digits and 2 fractional
//! digits.
//!
//! Every statement is `IF NOT EXISTS`, so running the migrator against an
//! already initialized database never touches existing rows.

use sea_orm_migration::prelude::*;

/// Largest storable magnitude, in cents (`99_999_999.99`).
const MAX_AMOUNT_MINOR: i64 = 9_999_999_999;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string_len(255).not_null())
                    .col(ColumnDef::new(Transactions::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(
                                Expr::col(Transactions::AmountMinor)
                                    .between(-MAX_AMOUNT_MINOR, MAX_AMOUNT_MINOR),
                            ),
                    )
                    .col(ColumnDef::new(Transactions::Category).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .date()
                            .not_null()
                            .default(Expr::current_date()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-transactions-user_id")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub enum Transactions {
    Table,
    Id,
    UserId,
    Title,
    AmountMinor,
    Category,
    CreatedAt,
}
