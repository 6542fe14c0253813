//! Initial schema migration - creates all tables from scratch.
//!
//! - `payment_transactions`: normalized provider feed rows plus the
//!   engine-owned `assigned`/`match_*` columns
//! - `invoices`: sales-ledger documents, the primary match target
//! - `chart_of_accounts`: ledger accounts, the match target for fee rows

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum PaymentTransactions {
    Table,
    Id,
    Provider,
    AmountMinor,
    BookedAt,
    Purpose,
    Subject,
    MerchantReference,
    ExternalOrderId,
    Category,
    Status,
    Assigned,
    MatchTargetKind,
    MatchTargetId,
    MatchTargetLabel,
    MatchConfidence,
    MatchMethod,
    MatchedAt,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    Number,
    GrossMinor,
    IssuedOn,
    OrderReference,
    Source,
}

#[derive(Iden)]
enum ChartOfAccounts {
    Table,
    Code,
    Label,
    Category,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Payment transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PaymentTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::Provider)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::BookedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentTransactions::Purpose).string())
                    .col(ColumnDef::new(PaymentTransactions::Subject).string())
                    .col(ColumnDef::new(PaymentTransactions::MerchantReference).string())
                    .col(ColumnDef::new(PaymentTransactions::ExternalOrderId).string())
                    .col(ColumnDef::new(PaymentTransactions::Category).string())
                    .col(ColumnDef::new(PaymentTransactions::Status).string())
                    .col(
                        ColumnDef::new(PaymentTransactions::Assigned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PaymentTransactions::MatchTargetKind).string())
                    .col(ColumnDef::new(PaymentTransactions::MatchTargetId).string())
                    .col(ColumnDef::new(PaymentTransactions::MatchTargetLabel).string())
                    .col(ColumnDef::new(PaymentTransactions::MatchConfidence).string())
                    .col(ColumnDef::new(PaymentTransactions::MatchMethod).string())
                    .col(ColumnDef::new(PaymentTransactions::MatchedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_transactions-provider-assigned")
                    .table(PaymentTransactions::Table)
                    .col(PaymentTransactions::Provider)
                    .col(PaymentTransactions::Assigned)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_transactions-booked_at")
                    .table(PaymentTransactions::Table)
                    .col(PaymentTransactions::BookedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Invoices
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::Number).string().not_null())
                    .col(
                        ColumnDef::new(Invoices::GrossMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::IssuedOn).date().not_null())
                    .col(ColumnDef::new(Invoices::OrderReference).string())
                    .col(
                        ColumnDef::new(Invoices::Source)
                            .string()
                            .not_null()
                            .default("internal"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-number-unique")
                    .table(Invoices::Table)
                    .col(Invoices::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-issued_on")
                    .table(Invoices::Table)
                    .col(Invoices::IssuedOn)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Chart of accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ChartOfAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChartOfAccounts::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChartOfAccounts::Label).string().not_null())
                    .col(
                        ColumnDef::new(ChartOfAccounts::Category)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChartOfAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentTransactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
