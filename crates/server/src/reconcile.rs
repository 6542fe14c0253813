use axum::{Json, extract::State};
use chrono::NaiveDate;

use api_types::reconcile::{
    Confidence, MatchTargetKind, MatchView, ProviderStats, ReconcileRequest, ReconcileResponse,
    RunStats, Window,
};
use engine::{ReportWindow, RunOptions, RunReport};

use crate::{ServerError, ServerState};

pub async fn run_reconciliation(
    State(state): State<ServerState>,
    Json(payload): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, ServerError> {
    let window = payload
        .zeitraum
        .as_deref()
        .map(parse_zeitraum)
        .transpose()?;

    let options = RunOptions {
        window,
        dry_run: payload.dry_run.unwrap_or(false),
        limit: payload.limit,
    };

    let report = state.engine.reconcile(options).await?;
    Ok(Json(response_from_report(report)))
}

/// Parses a reporting window of the form `YYYY-MM-DD_YYYY-MM-DD`.
fn parse_zeitraum(raw: &str) -> Result<ReportWindow, ServerError> {
    let invalid = || ServerError::Generic(format!("invalid zeitraum: {raw}"));

    let (from, to) = raw.split_once('_').ok_or_else(invalid)?;
    let from = NaiveDate::parse_from_str(from, "%Y-%m-%d").map_err(|_| invalid())?;
    let to = NaiveDate::parse_from_str(to, "%Y-%m-%d").map_err(|_| invalid())?;
    if from > to {
        return Err(invalid());
    }

    Ok(ReportWindow { from, to })
}

fn response_from_report(report: RunReport) -> ReconcileResponse {
    let stats = RunStats {
        total_zahlungen: report.total_transactions,
        matched: report.matched_count(),
        by_method: report
            .by_method
            .iter()
            .map(|(method, count)| (method.as_str().to_string(), *count))
            .collect(),
        by_anbieter: report
            .by_provider
            .iter()
            .map(|(provider, stats)| {
                (
                    provider.as_str().to_string(),
                    ProviderStats {
                        total: stats.total,
                        matched: stats.matched,
                    },
                )
            })
            .collect(),
        failed: report.failed.clone(),
        skipped: report
            .skipped_providers
            .iter()
            .map(|provider| provider.as_str().to_string())
            .collect(),
    };

    let matched = report
        .matched
        .into_iter()
        .map(|entry| MatchView {
            transaction_id: entry.transaction_id,
            provider: entry.provider.as_str().to_string(),
            target: match entry.matched.target {
                engine::MatchTargetKind::Invoice => MatchTargetKind::Invoice,
                engine::MatchTargetKind::Account => MatchTargetKind::Account,
            },
            target_id: entry.matched.target_id,
            target_label: entry.matched.target_label,
            confidence: match entry.matched.confidence {
                engine::Confidence::High => Confidence::High,
                engine::Confidence::Medium => Confidence::Medium,
            },
            method: entry.matched.method.as_str().to_string(),
        })
        .collect();

    ReconcileResponse {
        ok: true,
        zeitraum: Window {
            from: report.window.from,
            to: report.window.to,
        },
        matched,
        stats,
        dry_run: report.dry_run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeitraum_parses_a_valid_window() {
        let window = parse_zeitraum("2025-06-01_2025-06-30").expect("valid window");
        assert_eq!(
            window.from,
            NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
        );
        assert_eq!(
            window.to,
            NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
        );
    }

    #[test]
    fn zeitraum_rejects_missing_separator() {
        assert!(parse_zeitraum("2025-06-01").is_err());
    }

    #[test]
    fn zeitraum_rejects_reversed_bounds() {
        assert!(parse_zeitraum("2025-06-30_2025-06-01").is_err());
    }
}
