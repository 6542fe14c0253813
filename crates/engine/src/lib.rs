//! Payment-to-ledger reconciliation engine.
//!
//! A batch process that links unassigned payment transactions from several
//! provider feeds to either a sales invoice or a general-ledger account,
//! via a cascade of matching strategies. Anything it cannot resolve with
//! confidence stays open for human review or a later run.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use tokio::sync::Mutex;

pub use accounts::Account;
pub use error::EngineError;
pub use invoices::{Invoice, InvoiceSource};
pub use matching::{Confidence, LedgerMatch, MatchConfig, MatchMethod, MatchTargetKind};
pub use report::{MatchedTransaction, ProviderStats, ReportWindow, RunReport};
pub use transactions::{Provider, ProviderKind, Transaction};

use matching::{cascade, MatchContext};

pub mod accounts;
mod error;
pub mod invoices;
pub mod matching;
mod report;
pub mod transactions;

type ResultEngine<T> = Result<T, EngineError>;

/// Options for a single reconciliation pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Reporting window label; defaults to the previous calendar month.
    pub window: Option<ReportWindow>,
    /// Compute and report matches without persisting anything.
    pub dry_run: bool,
    /// Cap on transactions processed across all feeds.
    pub limit: Option<usize>,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    config: MatchConfig,
    // Advisory run lock: a second invocation while a run is active fails
    // fast instead of double-writing.
    run_guard: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Runs a full reconciliation pass over every provider feed.
    ///
    /// Reference data (invoices from the load floor onwards, the full
    /// chart of accounts) is loaded once up front and held for the entire
    /// run; invoices created mid-run are invisible until the next one.
    /// Already-assigned transactions are excluded up front, which makes
    /// the run safely repeatable.
    pub async fn reconcile(&self, options: RunOptions) -> ResultEngine<RunReport> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| EngineError::RunInProgress)?;

        let today = Utc::now().date_naive();
        let window = options
            .window
            .unwrap_or_else(|| report::previous_month(today));
        let mut run = RunReport::new(window, options.dry_run);

        let floor = today - Duration::days(self.config.invoice_floor_days);
        let all_invoices = self.load_invoices(floor).await?;
        let internal_invoices: Vec<Invoice> = all_invoices
            .iter()
            .filter(|invoice| invoice.source == InvoiceSource::Internal)
            .cloned()
            .collect();
        let accounts = self.load_accounts().await?;

        let context = MatchContext {
            internal_invoices: &internal_invoices,
            all_invoices: &all_invoices,
            accounts: &accounts,
        };

        tracing::info!(
            invoices = all_invoices.len(),
            accounts = accounts.len(),
            dry_run = options.dry_run,
            "starting reconciliation run"
        );

        'feeds: for provider in Provider::ALL {
            let feed = match self.load_feed(provider).await {
                Ok(feed) => feed,
                Err(err) => {
                    // One broken feed must not stop the others.
                    tracing::warn!(
                        provider = provider.as_str(),
                        "failed to load provider feed: {err}"
                    );
                    run.skipped_providers.push(provider);
                    continue;
                }
            };

            run.by_provider.entry(provider).or_default();

            for transaction in feed {
                if options.limit.is_some_and(|cap| run.total_transactions >= cap) {
                    break 'feeds;
                }
                run.total_transactions += 1;
                run.by_provider.entry(provider).or_default().total += 1;

                let Some(matched) = cascade::match_transaction(&transaction, &context, &self.config)
                else {
                    continue;
                };

                if !options.dry_run {
                    if let Err(err) = self.persist_match(&transaction.id, &matched).await {
                        // Soft failure: the row stays open and is retried on
                        // the next run.
                        tracing::error!(
                            transaction = transaction.id,
                            "failed to persist match: {err}"
                        );
                        run.failed.push(transaction.id.clone());
                        continue;
                    }
                }

                run.by_provider.entry(provider).or_default().matched += 1;
                *run.by_method.entry(matched.method).or_insert(0) += 1;
                run.matched.push(MatchedTransaction {
                    transaction_id: transaction.id,
                    provider,
                    matched,
                });
            }
        }

        tracing::info!(
            total = run.total_transactions,
            matched = run.matched_count(),
            failed = run.failed.len(),
            "reconciliation run finished"
        );

        Ok(run)
    }

    async fn load_invoices(&self, floor: chrono::NaiveDate) -> ResultEngine<Vec<Invoice>> {
        let models = invoices::Entity::find()
            .filter(invoices::Column::IssuedOn.gte(floor))
            .order_by_asc(invoices::Column::IssuedOn)
            .order_by_asc(invoices::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Invoice::try_from).collect()
    }

    async fn load_accounts(&self) -> ResultEngine<HashMap<String, Account>> {
        let models = accounts::Entity::find().all(&self.database).await?;
        Ok(models
            .into_iter()
            .map(|model| (model.code.clone(), Account::from(model)))
            .collect())
    }

    /// Loads the unassigned slice of one provider feed, oldest first.
    async fn load_feed(&self, provider: Provider) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::Provider.eq(provider.as_str()))
            .filter(transactions::Column::Assigned.eq(false))
            .order_by_asc(transactions::Column::BookedAt)
            .order_by_asc(transactions::Column::Id);

        if provider.requires_terminal_status() {
            query = query.filter(transactions::Column::Status.eq(transactions::STATUS_COMPLETED));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    async fn persist_match(&self, transaction_id: &str, matched: &LedgerMatch) -> ResultEngine<()> {
        let update = transactions::match_update(transaction_id, matched, Utc::now());
        update.update(&self.database).await?;
        Ok(())
    }
}

/// The builder for `Engine`.
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    config: MatchConfig,
}

impl EngineBuilder {
    /// Pass the required database. The connection's lifecycle is owned by
    /// the caller; the engine keeps no connection state of its own.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn config(mut self, config: MatchConfig) -> EngineBuilder {
        self.config = config;
        self
    }

    /// Construct `Engine`.
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            config: self.config,
            run_guard: Mutex::new(()),
        }
    }
}
