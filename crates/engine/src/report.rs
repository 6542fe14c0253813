//! Ephemeral per-run aggregates, returned to the caller and never
//! persisted.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::matching::{LedgerMatch, MatchMethod};
use crate::transactions::Provider;

/// Reporting window label. Matching scope is unaffected by it: a payment
/// can predate or postdate its invoice by an unpredictable amount, so the
/// engine always scans all unassigned transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Default window: the previous calendar month.
pub(crate) fn previous_month(today: NaiveDate) -> ReportWindow {
    let first_of_month = today.with_day(1).unwrap_or(today);
    let to = first_of_month.pred_opt().unwrap_or(first_of_month);
    let from = to.with_day(1).unwrap_or(to);
    ReportWindow { from, to }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchedTransaction {
    pub transaction_id: String,
    pub provider: Provider,
    pub matched: LedgerMatch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProviderStats {
    pub total: usize,
    pub matched: usize,
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub window: ReportWindow,
    pub dry_run: bool,
    /// Transactions considered across all feeds (capped by the limit).
    pub total_transactions: usize,
    pub matched: Vec<MatchedTransaction>,
    pub by_method: BTreeMap<MatchMethod, usize>,
    pub by_provider: BTreeMap<Provider, ProviderStats>,
    /// Transactions whose match could not be persisted; left open for the
    /// next run.
    pub failed: Vec<String>,
    /// Providers whose feed failed to load; they contribute zero matches.
    pub skipped_providers: Vec<Provider>,
}

impl RunReport {
    pub(crate) fn new(window: ReportWindow, dry_run: bool) -> Self {
        Self {
            window,
            dry_run,
            total_transactions: 0,
            matched: Vec::new(),
            by_method: BTreeMap::new(),
            by_provider: BTreeMap::new(),
            failed: Vec::new(),
            skipped_providers: Vec::new(),
        }
    }

    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_month_spans_full_month() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 14).expect("valid date");
        let window = previous_month(today);
        assert_eq!(window.from, NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"));
        assert_eq!(window.to, NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"));
    }

    #[test]
    fn previous_month_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 3).expect("valid date");
        let window = previous_month(today);
        assert_eq!(window.from, NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date"));
        assert_eq!(window.to, NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"));
    }
}
