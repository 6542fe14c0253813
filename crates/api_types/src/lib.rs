use serde::{Deserialize, Serialize};

pub mod reconcile {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;

    /// Request body for triggering a reconciliation run.
    ///
    /// `zeitraum` only affects the statistics window label in the response;
    /// matching itself always scans all unassigned transactions.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReconcileRequest {
        /// Reporting window, `"YYYY-MM-DD_YYYY-MM-DD"`.
        pub zeitraum: Option<String>,
        #[serde(rename = "dryRun")]
        pub dry_run: Option<bool>,
        /// Cap on transactions processed across all provider feeds.
        pub limit: Option<usize>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Window {
        pub from: NaiveDate,
        pub to: NaiveDate,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MatchTargetKind {
        Invoice,
        Account,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Confidence {
        High,
        Medium,
    }

    /// One produced match, as reported to the caller.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MatchView {
        pub transaction_id: String,
        pub provider: String,
        pub target: MatchTargetKind,
        pub target_id: String,
        pub target_label: String,
        pub confidence: Confidence,
        pub method: String,
    }

    #[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
    pub struct ProviderStats {
        pub total: usize,
        pub matched: usize,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct RunStats {
        #[serde(rename = "totalZahlungen")]
        pub total_zahlungen: usize,
        pub matched: usize,
        #[serde(rename = "byMethod")]
        pub by_method: BTreeMap<String, usize>,
        #[serde(rename = "byAnbieter")]
        pub by_anbieter: BTreeMap<String, ProviderStats>,
        /// Transaction ids whose match could not be persisted (soft failures).
        pub failed: Vec<String>,
        /// Provider feeds skipped because their load failed.
        pub skipped: Vec<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ReconcileResponse {
        pub ok: bool,
        pub zeitraum: Window,
        pub matched: Vec<MatchView>,
        pub stats: RunStats,
        #[serde(rename = "dryRun")]
        pub dry_run: bool,
    }
}
