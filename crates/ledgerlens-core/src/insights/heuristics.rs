//! Spending Pattern Insights
//!
//! Lightweight heuristics over the current period:
//! - Recurring payment summary (detected groups, else an edit-distance pair scan)
//! - Weekend share of spend
//! - Largest expense category
//! - Small discretionary purchases
//! - Lowest-average day of the week
//! - Subscription audit reminder
//!
//! Weekend share, top category and impulse buying measure spend, so they
//! only count EXPENSE transactions. Best day and the subscription audit look
//! at every transaction.

use std::collections::HashSet;

use chrono::Datelike;

use crate::config::AnalysisConfig;
use crate::models::{Frequency, Transaction};
use crate::normalize::edit_similarity;
use crate::stats::{group_by_category, mean, total};

use super::engine::{AnalysisContext, Analyzer};
use super::types::{AnalyzerKind, Impact, Insight, InsightKind};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const SUBSCRIPTION_MARKERS: [&str; 2] = ["subscription", "monthly"];

/// Split of expense spend between weekends and weekdays
#[derive(Debug, Clone, PartialEq)]
pub struct WeekendSplit {
    pub weekend_total: f64,
    pub weekday_total: f64,
    /// Weekend share of total spend, 0-100
    pub weekend_share: f64,
}

/// One category's slice of total expense spend
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    pub count: usize,
    /// 0-100
    pub share: f64,
}

/// Day of the week with the lowest average expense
#[derive(Debug, Clone, PartialEq)]
pub struct BestDay {
    pub day: &'static str,
    pub average: f64,
}

fn expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.is_expense())
}

/// Pairs that look like the same monthly charge: amounts within tolerance,
/// descriptions close by edit distance, and roughly a month apart.
///
/// Cheaper and looser than full recurring detection; it only needs two
/// occurrences. Returns each matching transaction once, in date order.
pub fn find_recurring_candidates<'a>(
    transactions: &'a [Transaction],
    config: &AnalysisConfig,
) -> Vec<&'a Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| t.date);

    let lowered: Vec<String> = sorted.iter().map(|t| t.description.to_lowercase()).collect();
    let (min_days, max_days) = Frequency::Monthly.day_range();

    let mut matched = vec![false; sorted.len()];
    for i in 0..sorted.len() {
        let first = sorted[i];
        if first.amount <= 0.0 {
            continue;
        }

        for j in (i + 1)..sorted.len() {
            let second = sorted[j];

            // Date order: every later candidate is further away still
            let days = (second.date - first.date).num_days() as f64;
            if days > max_days {
                break;
            }
            if days < min_days {
                continue;
            }

            let amount_diff = (first.amount - second.amount).abs() / first.amount;
            if amount_diff >= config.hint_amount_tolerance {
                continue;
            }

            if edit_similarity(&lowered[i], &lowered[j]) > config.hint_similarity {
                matched[i] = true;
                matched[j] = true;
            }
        }
    }

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .zip(matched)
        .filter(|&(t, hit)| hit && seen.insert(t.id.as_str()))
        .map(|(t, _)| t)
        .collect()
}

pub fn weekend_split(transactions: &[Transaction]) -> WeekendSplit {
    let (weekend_total, weekday_total) =
        expenses(transactions).fold((0.0, 0.0), |(weekend, weekday), t| {
            if t.is_weekend() {
                (weekend + t.amount, weekday)
            } else {
                (weekend, weekday + t.amount)
            }
        });

    let sum = weekend_total + weekday_total;
    WeekendSplit {
        weekend_total,
        weekday_total,
        weekend_share: if sum > 0.0 {
            weekend_total / sum * 100.0
        } else {
            0.0
        },
    }
}

/// Expense categories by total spend, largest first. Ties keep first-seen order.
pub fn top_categories(transactions: &[Transaction], limit: usize) -> Vec<CategoryShare> {
    let grouped = group_by_category(expenses(transactions));
    let grand_total: f64 = grouped.iter().map(|(_, m)| total(m)).sum();
    if grand_total <= 0.0 {
        return vec![];
    }

    let mut shares: Vec<CategoryShare> = grouped
        .into_iter()
        .map(|(category, members)| {
            let amount = total(&members);
            CategoryShare {
                category: category.to_string(),
                amount,
                count: members.len(),
                share: amount / grand_total * 100.0,
            }
        })
        .collect();

    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares.truncate(limit);
    shares
}

/// Small discretionary expenses that tend to add up
pub fn impulse_purchases<'a>(
    transactions: &'a [Transaction],
    config: &AnalysisConfig,
) -> Vec<&'a Transaction> {
    expenses(transactions)
        .filter(|t| t.amount < config.impulse_max_amount)
        .filter(|t| {
            !config
                .impulse_excluded_categories
                .iter()
                .any(|c| c == &t.category)
        })
        .collect()
}

/// The weekday with the lowest average transaction amount, income included.
/// Earlier days (from Sunday) win ties.
pub fn best_spending_day(transactions: &[Transaction]) -> Option<BestDay> {
    let mut by_day: [Vec<f64>; 7] = Default::default();
    for t in transactions {
        by_day[t.date.weekday().num_days_from_sunday() as usize].push(t.amount);
    }

    let mut best: Option<BestDay> = None;
    for (day, amounts) in DAY_NAMES.into_iter().zip(by_day.iter()) {
        if amounts.is_empty() {
            continue;
        }
        let average = mean(amounts);
        if best.as_ref().map_or(true, |b| average < b.average) {
            best = Some(BestDay { day, average });
        }
    }

    best
}

/// Transactions whose description reads like a subscription charge
pub fn subscription_mentions(transactions: &[Transaction]) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|t| {
            let description = t.description.to_lowercase();
            SUBSCRIPTION_MARKERS.iter().any(|m| description.contains(m))
        })
        .collect()
}

/// Summarizes recurring payments found in the period
pub struct RecurringInsight;

impl Analyzer for RecurringInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::Recurring
    }

    fn name(&self) -> &'static str {
        "Recurring Payments"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let message = if !ctx.recurring.is_empty() {
            format!(
                "Found {} recurring payment patterns. Consider setting up automatic tracking.",
                ctx.recurring.len()
            )
        } else {
            let candidates = find_recurring_candidates(ctx.transactions, ctx.config);
            if candidates.is_empty() {
                return vec![];
            }
            format!(
                "Found {} potential recurring transactions. Consider setting up automatic tracking.",
                candidates.len()
            )
        };

        vec![Insight::new(
            "recurring-found",
            InsightKind::Info,
            Impact::Low,
            4,
            "Recurring Transactions Detected",
            message,
        )
        .with_actions(&["Review recurring", "Set up auto-categorization"])]
    }
}

pub struct WeekendSpendingInsight;

impl Analyzer for WeekendSpendingInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::WeekendSpending
    }

    fn name(&self) -> &'static str {
        "Weekend Spending"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let split = weekend_split(ctx.transactions);
        if split.weekend_share <= ctx.config.weekend_share_threshold {
            return vec![];
        }

        vec![Insight::new(
            "weekend-spending",
            InsightKind::Tip,
            Impact::Low,
            5,
            "Weekend Spending Pattern",
            format!(
                "{:.0}% of your spending happens on weekends. Consider meal prepping or planning activities.",
                split.weekend_share
            ),
        )
        .with_amount(split.weekend_total)
        .with_actions(&["Plan weekend budget", "Try free activities"])]
    }
}

pub struct TopCategoryInsight;

impl Analyzer for TopCategoryInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::TopCategory
    }

    fn name(&self) -> &'static str {
        "Top Category"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let Some(top) = top_categories(ctx.transactions, 1).into_iter().next() else {
            return vec![];
        };
        if top.share <= ctx.config.top_category_share_threshold {
            return vec![];
        }

        vec![Insight::new(
            "top-category-0",
            InsightKind::Info,
            Impact::Medium,
            3,
            format!("{} is Your Largest Expense", top.category),
            format!(
                "{} accounts for {:.0}% of your spending (${:.2}).",
                top.category, top.share, top.amount
            ),
        )
        .with_category(top.category.clone())
        .with_amount(top.amount)
        .with_actions(&["Review category", "Find savings opportunities"])]
    }
}

pub struct ImpulseBuyingInsight;

impl Analyzer for ImpulseBuyingInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::ImpulseBuying
    }

    fn name(&self) -> &'static str {
        "Impulse Buying"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let small = impulse_purchases(ctx.transactions, ctx.config);
        if small.len() <= ctx.config.impulse_min_count {
            return vec![];
        }

        let sum = total(&small);
        vec![Insight::new(
            "impulse-buying",
            InsightKind::Warning,
            Impact::Medium,
            2,
            "Potential Impulse Purchases",
            format!(
                "Detected {} small transactions totaling ${:.2}. These add up quickly!",
                small.len(),
                sum
            ),
        )
        .with_amount(sum)
        .with_actions(&["Review small purchases", "Set spending rules", "Use 24-hour rule"])]
    }
}

pub struct BestDayInsight;

impl Analyzer for BestDayInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::BestDay
    }

    fn name(&self) -> &'static str {
        "Best Spending Day"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        best_spending_day(ctx.transactions)
            .map(|best| {
                Insight::new(
                    "best-day",
                    InsightKind::Success,
                    Impact::Low,
                    5,
                    "Your Best Spending Day",
                    format!(
                        "{} is your most controlled spending day with average of ${:.2}.",
                        best.day, best.average
                    ),
                )
            })
            .into_iter()
            .collect()
    }
}

pub struct SubscriptionAuditInsight;

impl Analyzer for SubscriptionAuditInsight {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::SubscriptionAudit
    }

    fn name(&self) -> &'static str {
        "Subscription Audit"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mentions = subscription_mentions(ctx.transactions);
        if mentions.is_empty() {
            return vec![];
        }

        let sum = total(&mentions);
        vec![Insight::new(
            "subscription-audit",
            InsightKind::Tip,
            Impact::Medium,
            2,
            "Time for Subscription Audit",
            format!(
                "You have {} subscriptions costing ${:.2}/month. Review for unused services.",
                mentions.len(),
                sum
            ),
        )
        .with_amount(sum)
        .with_actions(&["List all subscriptions", "Cancel unused", "Negotiate rates"])]
    }
}
