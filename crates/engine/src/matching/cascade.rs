//! The strategy cascade: produces at most one match per transaction.
//!
//! Strategies run most-specific-first and the cascade stops at the first
//! accepted match; signals from different strategies are never combined.
//! Which strategies apply depends on the provider kind.

use crate::invoices::Invoice;
use crate::transactions::{ProviderKind, Transaction};

use super::reference::{extract_invoice_number, extract_order_reference, normalize_reference};
use super::scoring::{pick_unique, score_candidates, MatchConfig};
use super::{categories, Confidence, LedgerMatch, MatchContext, MatchMethod};

pub fn match_transaction(
    transaction: &Transaction,
    context: &MatchContext<'_>,
    config: &MatchConfig,
) -> Option<LedgerMatch> {
    match transaction.provider.kind() {
        ProviderKind::Processor => direct_reference(transaction, context.all_invoices)
            .or_else(|| scored(transaction, context, config.settlement_window_days, config)),
        ProviderKind::Bank => invoice_number(transaction, context.all_invoices)
            .or_else(|| scored(transaction, context, config.settlement_window_days, config)),
        ProviderKind::Marketplace => match &transaction.category {
            // Fee/cost rows never settle an invoice.
            Some(label) => categories::map_category(label, context.accounts),
            None => order_lookup(transaction, context.all_invoices)
                .or_else(|| scored(transaction, context, config.marketplace_window_days, config)),
        },
    }
}

/// Strategy 1 for processors: an order code extracted from the memo,
/// found inside an invoice's own order reference.
fn direct_reference(transaction: &Transaction, invoices: &[Invoice]) -> Option<LedgerMatch> {
    let code = transaction
        .reference_texts()
        .find_map(extract_order_reference)?;

    invoices
        .iter()
        .find(|invoice| reference_contains(invoice, code))
        .map(|invoice| LedgerMatch::invoice(invoice, Confidence::High, MatchMethod::DirectReference))
}

/// Strategy 1 for banks: an invoice number in the purpose line, compared
/// separator-insensitively against the invoice register.
fn invoice_number(transaction: &Transaction, invoices: &[Invoice]) -> Option<LedgerMatch> {
    let number = transaction
        .reference_texts()
        .find_map(extract_invoice_number)?;
    let normalized = normalize_reference(number);

    invoices
        .iter()
        .find(|invoice| normalize_reference(&invoice.number) == normalized)
        .map(|invoice| LedgerMatch::invoice(invoice, Confidence::High, MatchMethod::InvoiceNumber))
}

/// Strategy 1 for marketplace proceeds: the settlement row's order id,
/// looked up in invoice order references.
fn order_lookup(transaction: &Transaction, invoices: &[Invoice]) -> Option<LedgerMatch> {
    let order_id = transaction.external_order_id.as_deref()?;
    if order_id.is_empty() {
        return None;
    }

    invoices
        .iter()
        .find(|invoice| reference_contains(invoice, order_id))
        .map(|invoice| LedgerMatch::invoice(invoice, Confidence::High, MatchMethod::OrderLookup))
}

/// Strategy 2 everywhere: amount/date scoring against internal invoices,
/// accepting only an unambiguous winner.
fn scored(
    transaction: &Transaction,
    context: &MatchContext<'_>,
    max_day_spread: i64,
    config: &MatchConfig,
) -> Option<LedgerMatch> {
    let ranked = score_candidates(
        transaction,
        context.internal_invoices,
        max_day_spread,
        config,
    );
    pick_unique(&ranked, config).map(|(invoice, confidence)| {
        LedgerMatch::invoice(invoice, confidence, MatchMethod::AmountDateScore)
    })
}

fn reference_contains(invoice: &Invoice, code: &str) -> bool {
    invoice
        .order_reference
        .as_deref()
        .is_some_and(|reference| reference.contains(code))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::accounts::Account;
    use crate::invoices::InvoiceSource;
    use crate::matching::MatchTargetKind;
    use crate::transactions::Provider;

    use super::*;

    fn transaction(provider: Provider, amount_minor: i64) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            provider,
            amount_minor,
            booked_at: Utc
                .with_ymd_and_hms(2025, 7, 10, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
            purpose: None,
            subject: None,
            merchant_reference: None,
            external_order_id: None,
            category: None,
            status: Some("completed".to_string()),
            assigned: false,
        }
    }

    fn invoice(
        id: &str,
        gross_minor: i64,
        day: u32,
        order_reference: Option<&str>,
        source: InvoiceSource,
    ) -> Invoice {
        Invoice {
            id: id.to_string(),
            number: format!("RE2025-{id}"),
            gross_minor,
            issued_on: NaiveDate::from_ymd_opt(2025, 7, day).expect("valid date"),
            order_reference: order_reference.map(str::to_string),
            source,
        }
    }

    fn context<'a>(
        internal: &'a [Invoice],
        all: &'a [Invoice],
        accounts: &'a HashMap<String, Account>,
    ) -> MatchContext<'a> {
        MatchContext {
            internal_invoices: internal,
            all_invoices: all,
            accounts,
        }
    }

    #[test]
    fn processor_memo_reference_beats_scoring() {
        let all = vec![
            invoice("0001", 11900, 8, Some("AU_4821_SW6"), InvoiceSource::External),
            invoice("0002", 11900, 9, None, InvoiceSource::Internal),
        ];
        let accounts = HashMap::new();
        let mut tx = transaction(Provider::PspCheckout, 11900);
        tx.purpose = Some("Bestellung AU_4821_SW6".to_string());

        let matched =
            match_transaction(&tx, &context(&[], &all, &accounts), &MatchConfig::default())
                .expect("matched");
        assert_eq!(matched.target, MatchTargetKind::Invoice);
        assert_eq!(matched.target_id, "0001");
        assert_eq!(matched.method, MatchMethod::DirectReference);
        assert_eq!(matched.confidence, Confidence::High);
    }

    #[test]
    fn processor_without_reference_falls_back_to_scoring() {
        let internal = vec![invoice("0003", 4990, 7, None, InvoiceSource::Internal)];
        let accounts = HashMap::new();
        let tx = transaction(Provider::PspWallet, 4998);

        let matched = match_transaction(
            &tx,
            &context(&internal, &internal, &accounts),
            &MatchConfig::default(),
        )
        .expect("matched");
        assert_eq!(matched.method, MatchMethod::AmountDateScore);
        assert_eq!(matched.confidence, Confidence::High);
    }

    #[test]
    fn bank_purpose_line_matches_invoice_number() {
        let all = vec![invoice("0117", 25000, 2, None, InvoiceSource::Internal)];
        let accounts = HashMap::new();
        let mut tx = transaction(Provider::BankGiro, 25000);
        tx.purpose = Some("Rechnung RE20250117 Danke".to_string());

        let matched =
            match_transaction(&tx, &context(&all, &all, &accounts), &MatchConfig::default())
                .expect("matched");
        assert_eq!(matched.method, MatchMethod::InvoiceNumber);
        assert_eq!(matched.target_label, "RE2025-0117");
    }

    #[test]
    fn marketplace_proceeds_use_order_lookup() {
        let all = vec![invoice(
            "0005",
            8900,
            9,
            Some("MKT-302-551"),
            InvoiceSource::External,
        )];
        let accounts = HashMap::new();
        let mut tx = transaction(Provider::Marketplace, 8900);
        tx.external_order_id = Some("302-551".to_string());

        let matched =
            match_transaction(&tx, &context(&[], &all, &accounts), &MatchConfig::default())
                .expect("matched");
        assert_eq!(matched.method, MatchMethod::OrderLookup);
    }

    #[test]
    fn marketplace_fee_rows_map_to_accounts_only() {
        let all = vec![invoice("0006", 250, 10, None, InvoiceSource::Internal)];
        let accounts: HashMap<String, Account> = [(
            "4950".to_string(),
            Account {
                code: "4950".to_string(),
                label: "Fremdleistungen Fulfillment".to_string(),
                category: "expense".to_string(),
            },
        )]
        .into_iter()
        .collect();
        let mut tx = transaction(Provider::Marketplace, -250);
        tx.category = Some("fulfillment-fee".to_string());

        let matched =
            match_transaction(&tx, &context(&all, &all, &accounts), &MatchConfig::default())
                .expect("matched");
        assert_eq!(matched.target, MatchTargetKind::Account);
        assert_eq!(matched.target_id, "4950");
        assert_eq!(matched.target_label, "Fremdleistungen Fulfillment");
    }

    #[test]
    fn ambiguous_scoring_leaves_transaction_open() {
        let internal = vec![
            invoice("0007", 8010, 9, None, InvoiceSource::Internal),
            invoice("0008", 7995, 8, None, InvoiceSource::Internal),
        ];
        let accounts = HashMap::new();
        let tx = transaction(Provider::BankCredit, 8000);

        assert!(match_transaction(
            &tx,
            &context(&internal, &internal, &accounts),
            &MatchConfig::default()
        )
        .is_none());
    }
}
