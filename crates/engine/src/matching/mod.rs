//! Matching strategies and their shared output type.
//!
//! A [`LedgerMatch`] links one payment transaction to either a sales
//! invoice or a general-ledger account. It is created at most once per
//! transaction and never revised by the engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::accounts::Account;
use crate::invoices::Invoice;

pub mod cascade;
pub mod categories;
pub mod reference;
pub mod scoring;

pub use scoring::MatchConfig;

/// What a match points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTargetKind {
    Invoice,
    Account,
}

impl MatchTargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Account => "account",
        }
    }
}

/// Coarse two-level confidence label, not a probability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

/// The strategy that produced a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Order reference extracted from a processor memo, found verbatim in an
    /// invoice's own order reference.
    DirectReference,
    /// Invoice number extracted from a bank statement purpose line.
    InvoiceNumber,
    /// Marketplace order id looked up against invoice order references.
    OrderLookup,
    /// Amount/date proximity scoring against internal invoices.
    AmountDateScore,
    /// Fee category mapped to a chart-of-accounts code.
    CategoryAccount,
}

impl MatchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DirectReference => "direct_reference",
            Self::InvoiceNumber => "invoice_number",
            Self::OrderLookup => "order_lookup",
            Self::AmountDateScore => "amount_date_score",
            Self::CategoryAccount => "category_account",
        }
    }
}

/// Engine output for one transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerMatch {
    pub target: MatchTargetKind,
    pub target_id: String,
    pub target_label: String,
    pub confidence: Confidence,
    pub method: MatchMethod,
}

impl LedgerMatch {
    pub(crate) fn invoice(invoice: &Invoice, confidence: Confidence, method: MatchMethod) -> Self {
        Self {
            target: MatchTargetKind::Invoice,
            target_id: invoice.id.clone(),
            target_label: invoice.number.clone(),
            confidence,
            method,
        }
    }
}

/// Reference data loaded once per run and shared by all strategies.
pub struct MatchContext<'a> {
    /// Internally issued invoices only; the scored fallback is restricted
    /// to these.
    pub internal_invoices: &'a [Invoice],
    /// All invoices from the load floor onwards, externally-sourced ones
    /// included; reference and order lookups scan this view.
    pub all_invoices: &'a [Invoice],
    /// Live chart of accounts, keyed by account code.
    pub accounts: &'a HashMap<String, Account>,
}
