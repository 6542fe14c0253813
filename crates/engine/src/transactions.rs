//! Payment transaction primitives.
//!
//! A `Transaction` is one row from a provider feed, pending ledger
//! assignment. The engine never creates or deletes these rows; it only sets
//! the `assigned` flag and the `match_*` columns, exactly once.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::matching::LedgerMatch;
use crate::EngineError;

/// A payment-provider feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    BankGiro,
    BankCredit,
    Marketplace,
    PspCheckout,
    PspWallet,
}

/// How a provider's rows are matched, decided per feed class, not per feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// Bank statement feed; rows carry a free-text purpose with an invoice
    /// number, no settlement status.
    Bank,
    /// Marketplace settlement feed; proceeds rows carry an order id, fee
    /// rows carry a cost category.
    Marketplace,
    /// Payment processor feed; rows embed a merchant reference in the memo.
    Processor,
}

impl Provider {
    /// Fixed iteration order; the run controller relies on it for
    /// deterministic reports.
    pub const ALL: [Provider; 5] = [
        Provider::BankGiro,
        Provider::BankCredit,
        Provider::Marketplace,
        Provider::PspCheckout,
        Provider::PspWallet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BankGiro => "bank_giro",
            Self::BankCredit => "bank_credit",
            Self::Marketplace => "marketplace",
            Self::PspCheckout => "psp_checkout",
            Self::PspWallet => "psp_wallet",
        }
    }

    pub fn kind(self) -> ProviderKind {
        match self {
            Self::BankGiro | Self::BankCredit => ProviderKind::Bank,
            Self::Marketplace => ProviderKind::Marketplace,
            Self::PspCheckout | Self::PspWallet => ProviderKind::Processor,
        }
    }

    /// Settlement-style feeds report a per-row status; only terminal rows
    /// are eligible for matching.
    pub fn requires_terminal_status(self) -> bool {
        !matches!(self.kind(), ProviderKind::Bank)
    }
}

impl TryFrom<&str> for Provider {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "bank_giro" => Ok(Self::BankGiro),
            "bank_credit" => Ok(Self::BankCredit),
            "marketplace" => Ok(Self::Marketplace),
            "psp_checkout" => Ok(Self::PspCheckout),
            "psp_wallet" => Ok(Self::PspWallet),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid provider: {other}"
            ))),
        }
    }
}

/// Terminal settlement status written by the feed importers.
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub provider: Provider,
    /// Signed amount in minor units (fees and outgoing payments negative).
    pub amount_minor: i64,
    pub booked_at: DateTime<Utc>,
    pub purpose: Option<String>,
    pub subject: Option<String>,
    pub merchant_reference: Option<String>,
    pub external_order_id: Option<String>,
    /// Provider fee/cost category label, set on marketplace fee rows.
    pub category: Option<String>,
    pub status: Option<String>,
    pub assigned: bool,
}

impl Transaction {
    /// Free-text fields scanned for embedded references, most specific
    /// first.
    pub fn reference_texts(&self) -> impl Iterator<Item = &str> {
        self.merchant_reference
            .as_deref()
            .into_iter()
            .chain(self.purpose.as_deref())
            .chain(self.subject.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub provider: String,
    pub amount_minor: i64,
    pub booked_at: DateTimeUtc,
    pub purpose: Option<String>,
    pub subject: Option<String>,
    pub merchant_reference: Option<String>,
    pub external_order_id: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub assigned: bool,
    pub match_target_kind: Option<String>,
    pub match_target_id: Option<String>,
    pub match_target_label: Option<String>,
    pub match_confidence: Option<String>,
    pub match_method: Option<String>,
    pub matched_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            provider: Provider::try_from(model.provider.as_str())?,
            amount_minor: model.amount_minor,
            booked_at: model.booked_at,
            purpose: model.purpose,
            subject: model.subject,
            merchant_reference: model.merchant_reference,
            external_order_id: model.external_order_id,
            category: model.category,
            status: model.status,
            assigned: model.assigned,
        })
    }
}

/// Active model carrying only the columns the engine is allowed to write.
pub(crate) fn match_update(
    transaction_id: &str,
    matched: &LedgerMatch,
    matched_at: DateTime<Utc>,
) -> ActiveModel {
    use sea_orm::ActiveValue;

    ActiveModel {
        id: ActiveValue::Set(transaction_id.to_string()),
        assigned: ActiveValue::Set(true),
        match_target_kind: ActiveValue::Set(Some(matched.target.as_str().to_string())),
        match_target_id: ActiveValue::Set(Some(matched.target_id.clone())),
        match_target_label: ActiveValue::Set(Some(matched.target_label.clone())),
        match_confidence: ActiveValue::Set(Some(matched.confidence.as_str().to_string())),
        match_method: ActiveValue::Set(Some(matched.method.as_str().to_string())),
        matched_at: ActiveValue::Set(Some(matched_at)),
        ..Default::default()
    }
}
