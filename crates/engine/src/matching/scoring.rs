//! Amount/date proximity scoring against invoice candidates.

use serde::Deserialize;

use crate::invoices::Invoice;
use crate::transactions::Transaction;

use super::Confidence;

/// Tuning knobs for the matcher.
///
/// The defaults encode business tolerance decisions and should not be
/// changed casually; deployments can override them in `settings.toml`.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Absolute amount tolerance for the candidate filter, in minor units.
    pub amount_tolerance_minor: i64,
    /// Score contribution per day of distance between booking and invoice
    /// date.
    pub day_weight: f64,
    /// Loose acceptance threshold: a candidate scoring above this is never
    /// accepted.
    pub score_accept: f64,
    /// High-confidence sub-threshold.
    pub score_high: f64,
    /// Date window for the scored fallback on settlement-lag feeds (banks,
    /// processors).
    pub settlement_window_days: i64,
    /// Date window for marketplace sale proceeds.
    pub marketplace_window_days: i64,
    /// Reference-data load floor: invoices older than this many days are
    /// not loaded at all.
    pub invoice_floor_days: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            amount_tolerance_minor: 100,
            day_weight: 0.1,
            score_accept: 1.0,
            score_high: 0.5,
            settlement_window_days: 60,
            marketplace_window_days: 30,
            invoice_floor_days: 365,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScoredCandidate<'a> {
    pub invoice: &'a Invoice,
    pub score: f64,
}

/// Filters and ranks invoice candidates for a transaction.
///
/// Candidates survive when their gross amount is within the absolute
/// tolerance of the transaction amount and their issue date within
/// `max_day_spread` days of the booking date. Score is
/// `|amount diff| (in units) + day diff * day_weight`, ascending, so amount
/// proximity dominates.
pub fn score_candidates<'a>(
    transaction: &Transaction,
    invoices: &'a [Invoice],
    max_day_spread: i64,
    config: &MatchConfig,
) -> Vec<ScoredCandidate<'a>> {
    let amount = transaction.amount_minor.abs();
    let booked_on = transaction.booked_at.date_naive();

    let mut candidates: Vec<ScoredCandidate<'a>> = invoices
        .iter()
        .filter_map(|invoice| {
            let amount_diff = (invoice.gross_minor - amount).abs();
            if amount_diff > config.amount_tolerance_minor {
                return None;
            }
            let day_diff = (booked_on - invoice.issued_on).num_days().abs();
            if day_diff > max_day_spread {
                return None;
            }
            let score = amount_diff as f64 / 100.0 + day_diff as f64 * config.day_weight;
            Some(ScoredCandidate { invoice, score })
        })
        .collect();

    candidates.sort_by(|a, b| f64::total_cmp(&a.score, &b.score));
    candidates
}

/// Accepts the ranked candidates only when exactly one clears the loose
/// threshold.
///
/// Two or more acceptable candidates mean the amount cluster is ambiguous;
/// the policy is to decline rather than guess. A lone accepted candidate is
/// "high" confidence when its score also clears the strict sub-threshold,
/// "medium" otherwise.
pub fn pick_unique<'a>(
    candidates: &[ScoredCandidate<'a>],
    config: &MatchConfig,
) -> Option<(&'a Invoice, Confidence)> {
    let mut accepted = candidates.iter().filter(|c| c.score <= config.score_accept);

    let best = accepted.next()?;
    if accepted.next().is_some() {
        return None;
    }

    let confidence = if best.score <= config.score_high {
        Confidence::High
    } else {
        Confidence::Medium
    };
    Some((best.invoice, confidence))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::invoices::InvoiceSource;
    use crate::transactions::Provider;

    use super::*;

    fn transaction(amount_minor: i64, day: u32) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            provider: Provider::BankGiro,
            amount_minor,
            booked_at: Utc
                .with_ymd_and_hms(2025, 7, day, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            purpose: None,
            subject: None,
            merchant_reference: None,
            external_order_id: None,
            category: None,
            status: None,
            assigned: false,
        }
    }

    fn invoice(id: &str, gross_minor: i64, day: u32) -> Invoice {
        Invoice {
            id: id.to_string(),
            number: format!("RE2025-{id}"),
            gross_minor,
            issued_on: NaiveDate::from_ymd_opt(2025, 7, day).expect("valid date"),
            order_reference: None,
            source: InvoiceSource::Internal,
        }
    }

    #[test]
    fn lone_close_candidate_is_high_confidence() {
        // 0.08 units of amount distance + 3 days * 0.1 = 0.38.
        let config = MatchConfig::default();
        let tx = transaction(4998, 10);
        let invoices = vec![invoice("a", 4990, 7)];

        let ranked = score_candidates(&tx, &invoices, 60, &config);
        let (best, confidence) = pick_unique(&ranked, &config).expect("accepted");
        assert_eq!(best.id, "a");
        assert_eq!(confidence, Confidence::High);
        assert!((ranked[0].score - 0.38).abs() < 1e-9);
    }

    #[test]
    fn ambiguous_cluster_is_declined() {
        let config = MatchConfig::default();
        let tx = transaction(8000, 10);
        let invoices = vec![invoice("a", 8010, 9), invoice("b", 7995, 8)];

        let ranked = score_candidates(&tx, &invoices, 60, &config);
        assert_eq!(ranked.len(), 2);
        assert!(pick_unique(&ranked, &config).is_none());
    }

    #[test]
    fn amount_outside_tolerance_is_filtered() {
        let config = MatchConfig::default();
        let tx = transaction(8000, 10);
        let invoices = vec![invoice("a", 8150, 10)];

        assert!(score_candidates(&tx, &invoices, 60, &config).is_empty());
    }

    #[test]
    fn date_outside_spread_is_filtered() {
        let config = MatchConfig::default();
        let tx = transaction(8000, 31);
        let invoices = vec![invoice("a", 8000, 1)];

        assert_eq!(score_candidates(&tx, &invoices, 60, &config).len(), 1);
        assert!(score_candidates(&tx, &invoices, 15, &config).is_empty());
    }

    #[test]
    fn lone_distant_candidate_is_medium_confidence() {
        // 0.40 units + 3 days * 0.1 = 0.7, above the strict sub-threshold
        // but under the loose one.
        let config = MatchConfig::default();
        let tx = transaction(12040, 13);
        let invoices = vec![invoice("a", 12000, 10)];

        let ranked = score_candidates(&tx, &invoices, 60, &config);
        let (_, confidence) = pick_unique(&ranked, &config).expect("accepted");
        assert_eq!(confidence, Confidence::Medium);
    }

    #[test]
    fn lone_candidate_above_acceptance_threshold_is_declined() {
        // 0.60 units + 5 days * 0.1 = 1.1: survives the candidate filter
        // but clears no threshold, so the transaction stays open.
        let config = MatchConfig::default();
        let tx = transaction(12060, 15);
        let invoices = vec![invoice("a", 12000, 10)];

        let ranked = score_candidates(&tx, &invoices, 60, &config);
        assert_eq!(ranked.len(), 1);
        assert!(pick_unique(&ranked, &config).is_none());
    }

    #[test]
    fn negative_amounts_match_on_absolute_value() {
        let config = MatchConfig::default();
        let tx = transaction(-4990, 10);
        let invoices = vec![invoice("a", 4990, 10)];

        let ranked = score_candidates(&tx, &invoices, 60, &config);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 0.0);
    }

    #[test]
    fn ranking_is_ascending_by_score() {
        let config = MatchConfig::default();
        let tx = transaction(5000, 10);
        let invoices = vec![invoice("far", 5090, 5), invoice("near", 5005, 10)];

        let ranked = score_candidates(&tx, &invoices, 60, &config);
        assert_eq!(ranked[0].invoice.id, "near");
        assert_eq!(ranked[1].invoice.id, "far");
    }
}
