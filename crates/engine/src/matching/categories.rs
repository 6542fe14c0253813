//! Fee-category to ledger-account mapping for marketplace cost rows.
//!
//! The mapping table is maintained here, independently of the live chart
//! of accounts. When the mapped code is missing from the loaded chart the
//! match is still recorded, degraded to "medium" confidence with the raw
//! category label as display name.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

use crate::accounts::Account;

use super::{Confidence, LedgerMatch, MatchMethod, MatchTargetKind};

/// Known marketplace fee/cost categories.
///
/// `from_label` returning `None` is the typed "unknown category" gap: an
/// unmapped label yields no match instead of a silent misbooking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeCategory {
    FulfillmentFee,
    SaleCommission,
    RefundCommission,
    StorageFee,
    ShippingLabel,
    Advertising,
    SubscriptionFee,
}

impl FeeCategory {
    pub fn from_label(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "fulfillment-fee" => Some(Self::FulfillmentFee),
            "sale-commission" => Some(Self::SaleCommission),
            "refund-commission" => Some(Self::RefundCommission),
            "storage-fee" => Some(Self::StorageFee),
            "shipping-label" => Some(Self::ShippingLabel),
            "advertising" => Some(Self::Advertising),
            "subscription-fee" => Some(Self::SubscriptionFee),
            _ => None,
        }
    }

    /// Ledger account code this category books against.
    pub fn account_code(self) -> &'static str {
        match self {
            Self::FulfillmentFee => "4950",
            Self::SaleCommission => "4970",
            Self::RefundCommission => "4975",
            Self::StorageFee => "4955",
            Self::ShippingLabel => "4730",
            Self::Advertising => "6600",
            Self::SubscriptionFee => "4980",
        }
    }
}

/// Feed labels arrive in mixed case and with either separator.
fn normalize_label(label: &str) -> String {
    label
        .nfkc()
        .collect::<String>()
        .trim()
        .to_ascii_lowercase()
        .replace('_', "-")
}

/// Maps a provider category label to an account match.
pub fn map_category(label: &str, accounts: &HashMap<String, Account>) -> Option<LedgerMatch> {
    let category = FeeCategory::from_label(label)?;
    let code = category.account_code();

    let (target_label, confidence) = match accounts.get(code) {
        Some(account) => (account.label.clone(), Confidence::High),
        // Stale mapping vs. current ledger: keep the match, degrade it.
        None => (label.to_string(), Confidence::Medium),
    };

    Some(LedgerMatch {
        target: MatchTargetKind::Account,
        target_id: code.to_string(),
        target_label,
        confidence,
        method: MatchMethod::CategoryAccount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(entries: &[(&str, &str)]) -> HashMap<String, Account> {
        entries
            .iter()
            .map(|(code, label)| {
                (
                    code.to_string(),
                    Account {
                        code: code.to_string(),
                        label: label.to_string(),
                        category: "expense".to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn known_category_with_chart_entry_is_high() {
        let accounts = chart(&[("4950", "Fremdleistungen Fulfillment")]);
        let matched = map_category("fulfillment-fee", &accounts).expect("mapped");

        assert_eq!(matched.target, MatchTargetKind::Account);
        assert_eq!(matched.target_id, "4950");
        assert_eq!(matched.target_label, "Fremdleistungen Fulfillment");
        assert_eq!(matched.confidence, Confidence::High);
    }

    #[test]
    fn stale_mapping_degrades_to_medium_with_raw_label() {
        let accounts = chart(&[]);
        let matched = map_category("storage-fee", &accounts).expect("mapped");

        assert_eq!(matched.target_id, "4955");
        assert_eq!(matched.target_label, "storage-fee");
        assert_eq!(matched.confidence, Confidence::Medium);
    }

    #[test]
    fn unknown_category_is_a_typed_gap() {
        let accounts = chart(&[("4950", "Fremdleistungen Fulfillment")]);
        assert!(map_category("mystery-fee", &accounts).is_none());
    }

    #[test]
    fn labels_normalize_case_and_separators() {
        assert_eq!(
            FeeCategory::from_label(" Fulfillment_Fee "),
            Some(FeeCategory::FulfillmentFee)
        );
    }
}
