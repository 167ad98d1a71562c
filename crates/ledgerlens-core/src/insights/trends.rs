//! Trend Insight
//!
//! Compares category totals between the current and previous period.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::models::Transaction;
use crate::stats::{group_by_category, total};

use super::engine::{AnalysisContext, Analyzer};
use super::types::{AnalyzerKind, CategoryTrend, Impact, Insight, InsightKind, TrendDirection};

/// Classify each current-period category against the previous period.
///
/// Without a previous period (absent or empty) there is nothing to compare
/// and no trends are produced. A category with no previous spend counts as
/// a 100% increase.
pub fn analyze_trends(
    current: &[Transaction],
    previous: Option<&[Transaction]>,
    config: &AnalysisConfig,
) -> Vec<CategoryTrend> {
    let previous = match previous {
        Some(p) if !p.is_empty() => p,
        _ => return vec![],
    };

    let previous_by_category = group_by_category(previous);

    let trends: Vec<CategoryTrend> = group_by_category(current)
        .into_iter()
        .map(|(category, members)| {
            let current_total = total(&members);
            let previous_total = previous_by_category
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, m)| total(m))
                .unwrap_or(0.0);

            let percent_change = if previous_total > 0.0 {
                (current_total - previous_total) / previous_total * 100.0
            } else {
                100.0
            };

            let trend = if percent_change > config.stable_band {
                TrendDirection::Increasing
            } else if percent_change < -config.stable_band {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            };

            CategoryTrend {
                category: category.to_string(),
                trend,
                percent_change,
                average_amount: current_total / members.len() as f64,
                frequency: members.len(),
            }
        })
        .collect();

    debug!(categories = trends.len(), "Computed category trends");
    trends
}

/// Insight that warns on sharp increases and celebrates decreases
pub struct TrendInsight;

impl Analyzer for TrendInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Trends
    }

    fn name(&self) -> &'static str {
        "Spending Trends"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let config = ctx.config;
        let mut insights = Vec::new();

        for (i, trend) in analyze_trends(ctx.transactions, ctx.previous, config)
            .iter()
            .enumerate()
        {
            if trend.percent_change > config.warning_increase {
                let (impact, priority) = if trend.percent_change > config.high_increase {
                    (Impact::High, 1)
                } else {
                    (Impact::Medium, 2)
                };

                insights.push(
                    Insight::new(
                        format!("trend-{}", i),
                        InsightKind::Warning,
                        impact,
                        priority,
                        format!("{} Spending Increased", trend.category),
                        format!(
                            "Your {} spending is up {:.0}% compared to last period. Average: ${:.2}",
                            trend.category, trend.percent_change, trend.average_amount
                        ),
                    )
                    .with_category(trend.category.clone())
                    .with_amount(trend.average_amount)
                    .with_actions(&["Review spending", "Adjust budget", "Find alternatives"]),
                );
            } else if trend.percent_change < -config.stable_band {
                insights.push(
                    Insight::new(
                        format!("trend-success-{}", i),
                        InsightKind::Success,
                        Impact::Medium,
                        3,
                        format!("Great Job! {} Spending Down", trend.category),
                        format!(
                            "You've reduced {} spending by {:.0}%! Keep it up!",
                            trend.category,
                            trend.percent_change.abs()
                        ),
                    )
                    .with_category(trend.category.clone()),
                );
            }
        }

        insights
    }
}
