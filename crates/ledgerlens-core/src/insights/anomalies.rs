//! Anomaly Insight
//!
//! Flags transactions whose amount sits far from their category's mean.
//! Each category is scored independently using a population z-score, so a
//! $900 rent payment is only unusual if rent is normally much smaller.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::models::Transaction;
use crate::stats::{group_by_category, mean, population_std_dev};

use super::engine::{AnalysisContext, Analyzer};
use super::types::{Anomaly, AnalyzerKind, Insight, InsightKind, Severity};

/// Find outliers within each category.
///
/// Categories with fewer than `min_category_size` members are skipped. The
/// standard deviation is floored at 1 before dividing, so a category of
/// identical amounts never divides by zero and small jitter is ignored.
/// Results follow category first-appearance order, then input order.
pub fn detect_anomalies(transactions: &[Transaction], config: &AnalysisConfig) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for (category, members) in group_by_category(transactions) {
        if members.len() < config.min_category_size {
            continue;
        }

        let amounts: Vec<f64> = members.iter().map(|t| t.amount).collect();
        let avg = mean(&amounts);
        let divisor = population_std_dev(&amounts, avg).max(1.0);

        let before = anomalies.len();
        for tx in members {
            let z_score = (tx.amount - avg).abs() / divisor;
            if z_score <= config.z_score_threshold {
                continue;
            }

            let severity = if z_score > config.high_severity_z_score {
                Severity::High
            } else {
                Severity::Medium
            };
            let direction = if tx.amount >= avg { "above" } else { "below" };

            anomalies.push(Anomaly {
                transaction: tx.clone(),
                reason: format!(
                    "{:.1} standard deviations {} the {} average of ${:.2}",
                    z_score, direction, category, avg
                ),
                severity,
                z_score,
                expected_amount: avg,
            });
        }

        debug!(
            category,
            members = amounts.len(),
            flagged = anomalies.len() - before,
            "Scored category for anomalies"
        );
    }

    anomalies
}

/// Insight that surfaces each anomalous transaction as a warning
pub struct AnomalyInsight;

impl Analyzer for AnomalyInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Anomalies
    }

    fn name(&self) -> &'static str {
        "Anomaly Detection"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        detect_anomalies(ctx.transactions, ctx.config)
            .into_iter()
            .enumerate()
            .map(|(i, anomaly)| {
                let priority = match anomaly.severity {
                    Severity::High => 1,
                    Severity::Medium => 2,
                };
                let tx = &anomaly.transaction;

                Insight::new(
                    format!("anomaly-{}", i),
                    InsightKind::Warning,
                    anomaly.severity.impact(),
                    priority,
                    "Unusual Spending Detected",
                    format!("{} (${:.2}) is {}", tx.description, tx.amount, anomaly.reason),
                )
                .with_category(tx.category.clone())
                .with_amount(tx.amount)
                .with_actions(&["Review transaction", "Update budget", "Set alert"])
            })
            .collect()
    }
}
