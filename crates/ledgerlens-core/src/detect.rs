//! Recurring payment detection
//!
//! Pipeline:
//! 1. Normalize descriptions and cluster by token-set (Jaccard) similarity
//! 2. Classify each cluster's average day-gap into a frequency bucket
//! 3. Score confidence from member count, interval and amount consistency
//! 4. Project the next expected date and a savings estimate
//!
//! Clusters are formed on description alone; amount only matters when
//! scoring. Two charges from the same merchant with wildly different amounts
//! therefore land in one cluster and are penalized, not split.

use chrono::{Datelike, Days, Months, NaiveDate};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::models::{Frequency, RecurringGroup, RecurringPattern, Transaction, TransactionType};
use crate::normalize::{jaccard_similarity, normalize_description};
use crate::stats::{mean, mean_absolute_deviation};

/// Member count at which the count component saturates
const FULL_COUNT: f64 = 6.0;
const COUNT_WEIGHT: f64 = 0.4;
const INTERVAL_WEIGHT: f64 = 0.4;
const AMOUNT_WEIGHT: f64 = 0.2;

/// A cluster of transactions with similar descriptions
#[derive(Debug, Clone)]
pub struct CandidateGroup<'a> {
    /// Normalized description of the transaction that started the group
    pub key: String,
    /// Members in date order
    pub members: Vec<&'a Transaction>,
}

/// Day-gap statistics for a candidate group
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalAnalysis {
    pub frequency: Frequency,
    pub intervals: Vec<i64>,
    pub avg_interval: f64,
}

/// Cluster transactions whose normalized descriptions are similar.
///
/// Transactions are visited oldest first. Each joins the first existing group
/// whose key it matches with Jaccard similarity strictly above `threshold`,
/// otherwise it starts a new group keyed by its own normalized description.
/// Quadratic in the number of distinct groups.
pub fn group_similar_transactions(
    transactions: &[Transaction],
    threshold: f64,
) -> Vec<CandidateGroup<'_>> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| t.date);

    let mut groups: Vec<CandidateGroup<'_>> = Vec::new();
    for tx in sorted {
        let normalized = normalize_description(&tx.description);

        match groups
            .iter_mut()
            .find(|g| jaccard_similarity(&normalized, &g.key) > threshold)
        {
            Some(group) => group.members.push(tx),
            None => groups.push(CandidateGroup {
                key: normalized,
                members: vec![tx],
            }),
        }
    }

    groups
}

/// Days between consecutive members (members must be in date order)
pub fn day_gaps(members: &[&Transaction]) -> Vec<i64> {
    members
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .collect()
}

/// Frequency bucket for an average day-gap, if any
pub fn classify_interval(avg_interval: f64) -> Option<Frequency> {
    Frequency::all()
        .iter()
        .copied()
        .find(|f| f.contains(avg_interval))
}

/// Measure the gaps of a date-ordered group and classify them.
///
/// Returns `None` for groups with fewer than two members or whose average
/// gap fits no bucket.
pub fn analyze_intervals(members: &[&Transaction]) -> Option<IntervalAnalysis> {
    let intervals = day_gaps(members);
    if intervals.is_empty() {
        return None;
    }

    let avg_interval = intervals.iter().sum::<i64>() as f64 / intervals.len() as f64;
    let frequency = classify_interval(avg_interval)?;

    Some(IntervalAnalysis {
        frequency,
        intervals,
        avg_interval,
    })
}

/// Confidence in [0, 1] that a classified group is a genuine recurring payment.
///
/// Weighted sum of a count component (saturating at six members), interval
/// consistency and amount consistency. Consistency is one minus the mean
/// absolute deviation relative to the mean, floored at zero.
pub fn score_confidence(members: &[&Transaction], intervals: &[i64], avg_interval: f64) -> f64 {
    if members.len() < 2 || intervals.is_empty() {
        return 0.0;
    }

    let count_score = (members.len() as f64 / FULL_COUNT).min(1.0) * COUNT_WEIGHT;

    let gaps: Vec<f64> = intervals.iter().map(|&i| i as f64).collect();
    let interval_mad = mean_absolute_deviation(&gaps, avg_interval);
    let interval_score = (1.0 - interval_mad / avg_interval.max(1.0)).max(0.0) * INTERVAL_WEIGHT;

    let amounts: Vec<f64> = members.iter().map(|t| t.amount).collect();
    let avg_amount = mean(&amounts);
    let amount_mad = mean_absolute_deviation(&amounts, avg_amount);
    let amount_consistency = if avg_amount <= f64::EPSILON {
        // All-zero amounts are perfectly consistent
        if amount_mad <= f64::EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        (1.0 - amount_mad / avg_amount).max(0.0)
    };
    let amount_score = amount_consistency * AMOUNT_WEIGHT;

    (count_score + interval_score + amount_score).min(1.0)
}

/// Next occurrence after `last`, using calendar months for monthly and longer
/// frequencies. Month ends clamp (Jan 31 + 1 month = Feb 28/29).
pub fn next_expected_date(last: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::Weekly => last.checked_add_days(Days::new(7)),
        Frequency::Biweekly => last.checked_add_days(Days::new(14)),
        Frequency::Monthly => last.checked_add_months(Months::new(1)),
        Frequency::Quarterly => last.checked_add_months(Months::new(3)),
        Frequency::Yearly => last.checked_add_months(Months::new(12)),
    }
}

/// Detect recurring payments in a transaction history.
///
/// Groups are returned highest confidence first. Every returned group has at
/// least `min_occurrences` members and confidence of at least `min_confidence`.
pub fn detect_recurring(
    transactions: &[Transaction],
    config: &AnalysisConfig,
) -> Result<Vec<RecurringGroup>> {
    let candidates = group_similar_transactions(transactions, config.similarity_threshold);
    debug!(
        transactions = transactions.len(),
        candidates = candidates.len(),
        "Grouped transactions by description"
    );

    let mut recurring = Vec::new();
    for candidate in candidates {
        if candidate.members.len() < config.min_occurrences {
            continue;
        }

        let Some(analysis) = analyze_intervals(&candidate.members) else {
            debug!(key = %candidate.key, "No frequency matches average interval");
            continue;
        };

        let confidence =
            score_confidence(&candidate.members, &analysis.intervals, analysis.avg_interval);
        if confidence < config.min_confidence {
            debug!(
                key = %candidate.key,
                confidence, "Dropping low-confidence group"
            );
            continue;
        }

        recurring.push(build_group(&candidate, &analysis, confidence, config)?);
    }

    recurring.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    info!(found = recurring.len(), "Recurring detection complete");
    Ok(recurring)
}

fn build_group(
    candidate: &CandidateGroup<'_>,
    analysis: &IntervalAnalysis,
    confidence: f64,
    config: &AnalysisConfig,
) -> Result<RecurringGroup> {
    let last = candidate
        .members
        .last()
        .ok_or_else(|| Error::DateOutOfRange(format!("empty group {}", candidate.key)))?;

    let amounts: Vec<f64> = candidate.members.iter().map(|t| t.amount).collect();
    let avg_amount = mean(&amounts);

    let next = next_expected_date(last.date, analysis.frequency).ok_or_else(|| {
        Error::DateOutOfRange(format!(
            "cannot project {} past {}",
            analysis.frequency, last.date
        ))
    })?;

    let savings = match last.kind {
        TransactionType::Expense => Some(avg_amount * 12.0 * config.savings_heuristic_rate),
        TransactionType::Income => None,
    };

    Ok(RecurringGroup {
        id: group_id(&candidate.members),
        pattern: RecurringPattern {
            description: last.description.clone(),
            amount: avg_amount,
            frequency: analysis.frequency,
            category: last.category.clone(),
            kind: last.kind,
            day_of_week: (analysis.frequency == Frequency::Weekly)
                .then(|| last.date.weekday().num_days_from_sunday()),
            day_of_month: (analysis.frequency == Frequency::Monthly).then(|| last.date.day()),
        },
        transactions: candidate.members.iter().map(|t| (*t).clone()).collect(),
        confidence,
        next_expected_date: next,
        savings,
    })
}

/// Stable id for a group: hash of its member ids in order
fn group_id(members: &[&Transaction]) -> String {
    let mut hasher = Sha256::new();
    for tx in members {
        hasher.update(tx.id.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("recurring-{}", &digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: &str, d: NaiveDate, amount: f64, desc: &str) -> Transaction {
        Transaction::new(id, d, amount, "Entertainment", desc, TransactionType::Expense)
    }

    fn spaced(desc: &str, amount: f64, start: NaiveDate, gap: u64, n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|i| {
                expense(
                    &format!("{}-{}", desc, i),
                    start + Days::new(gap * i as u64),
                    amount,
                    desc,
                )
            })
            .collect()
    }

    #[test]
    fn test_netflix_monthly() {
        let txs: Vec<Transaction> = [
            date(2024, 1, 1),
            date(2024, 2, 1),
            date(2024, 3, 1),
            date(2024, 4, 1),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, d)| expense(&i.to_string(), d, 15.99, "Netflix"))
        .collect();

        let groups = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.pattern.frequency, Frequency::Monthly);
        assert!((group.pattern.amount - 15.99).abs() < 1e-9);
        assert_eq!(group.pattern.day_of_month, Some(1));
        assert_eq!(group.pattern.day_of_week, None);
        assert!(group.confidence >= 0.6);
        assert_eq!(group.next_expected_date, date(2024, 5, 1));
        assert!((group.savings.unwrap() - 19.188).abs() < 1e-9);
        assert_eq!(group.transactions.len(), 4);
    }

    #[test]
    fn test_confidence_components() {
        // Four identical charges 30 days apart: count 4/6 * 0.4, full interval and amount scores
        let txs = spaced("Gym", 40.0, date(2024, 1, 5), 30, 4);
        let groups = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        let expected = 4.0 / 6.0 * 0.4 + 0.4 + 0.2;
        assert!((groups[0].confidence - expected).abs() < 1e-9);
        assert_eq!(groups[0].pattern.day_of_month, Some(date(2024, 4, 4).day()));

        // Count component saturates at six members
        let txs = spaced("Gym", 40.0, date(2024, 1, 5), 30, 6);
        let groups = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert!(groups[0].confidence >= 0.9);
        assert!(groups[0].confidence <= 1.0);
    }

    #[test]
    fn test_mean_absolute_deviation_not_variance() {
        let members = spaced("Rent", 1000.0, date(2024, 1, 1), 30, 3);
        let refs: Vec<&Transaction> = members.iter().collect();
        // Gaps 20 and 40 around a mean of 30: MAD is 10, variance would be 100
        let score = score_confidence(&refs, &[20, 40], 30.0);
        let expected = 3.0 / 6.0 * 0.4 + (1.0 - 10.0 / 30.0) * 0.4 + 0.2;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_members_dropped() {
        let txs = spaced("Hulu", 17.99, date(2024, 1, 1), 30, 2);
        assert!(detect_recurring(&txs, &AnalysisConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_irregular_interval_dropped() {
        // Average gap of 20 days fits no bucket
        let txs = spaced("Dry Cleaner", 25.0, date(2024, 1, 1), 20, 5);
        assert!(detect_recurring(&txs, &AnalysisConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_weekly_sets_day_of_week() {
        // 2024-01-06 is a Saturday; last member is 2024-01-27, also Saturday
        let txs = spaced("Farmers Market", 30.0, date(2024, 1, 6), 7, 4);
        let groups = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pattern.frequency, Frequency::Weekly);
        assert_eq!(groups[0].pattern.day_of_week, Some(6));
        assert_eq!(groups[0].pattern.day_of_month, None);
        assert_eq!(groups[0].next_expected_date, date(2024, 2, 3));
    }

    #[test]
    fn test_income_has_no_savings() {
        let txs: Vec<Transaction> = (0..4)
            .map(|i| {
                Transaction::new(
                    format!("pay-{}", i),
                    date(2024, 1, 5) + Days::new(14 * i),
                    2000.0,
                    "Salary",
                    "ACME PAYROLL",
                    TransactionType::Income,
                )
            })
            .collect();

        let groups = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].pattern.frequency, Frequency::Biweekly);
        assert_eq!(groups[0].savings, None);
    }

    #[test]
    fn test_savings_rate_is_configurable() {
        let txs = spaced("Netflix", 10.0, date(2024, 1, 1), 30, 4);
        let config = AnalysisConfig {
            savings_heuristic_rate: 0.25,
            ..Default::default()
        };
        let groups = detect_recurring(&txs, &config).unwrap();
        assert!((groups[0].savings.unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_next_expected_date_is_calendar_aware() {
        assert_eq!(
            next_expected_date(date(2024, 1, 31), Frequency::Monthly),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            next_expected_date(date(2023, 11, 30), Frequency::Quarterly),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            next_expected_date(date(2024, 2, 29), Frequency::Yearly),
            Some(date(2025, 2, 28))
        );
        assert_eq!(
            next_expected_date(date(2024, 12, 28), Frequency::Weekly),
            Some(date(2025, 1, 4))
        );
        assert_eq!(
            next_expected_date(date(2024, 12, 28), Frequency::Biweekly),
            Some(date(2025, 1, 11))
        );
    }

    #[test]
    fn test_grouping_threshold_is_strict() {
        let txs = vec![
            expense("1", date(2024, 1, 1), 5.0, "a b c d e"),
            expense("2", date(2024, 1, 2), 5.0, "a b c d"),
            expense("3", date(2024, 1, 3), 5.0, "A-B C D E!"),
        ];
        let groups = group_similar_transactions(&txs, 0.8);
        // Similarity of exactly 0.8 does not join
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key, "a b c d e");
        assert_eq!(groups[0].members.len(), 1);
        assert_eq!(groups[1].key, "a b c d");
        // Punctuation is dropped without splitting tokens
        assert_eq!(groups[2].key, "ab c d e");
    }

    #[test]
    fn test_grouping_joins_first_matching_group_in_date_order() {
        let txs = vec![
            expense("late", date(2024, 3, 1), 9.99, "SPOTIFY USA"),
            expense("early", date(2024, 1, 1), 9.99, "Spotify USA"),
            expense("mid", date(2024, 2, 1), 9.99, "spotify usa"),
        ];
        let groups = group_similar_transactions(&txs, 0.8);
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[0].members.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_grouping_ignores_amount() {
        // Same description, very different amounts: one candidate group whose
        // amount consistency collapses to zero during scoring
        let amounts = [10.0, 10.0, 10.0, 1000.0];
        let txs: Vec<Transaction> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                expense(
                    &i.to_string(),
                    date(2024, 1, 1) + Days::new(30 * i as u64),
                    a,
                    "City Gym",
                )
            })
            .collect();

        let groups = group_similar_transactions(&txs, 0.8);
        assert_eq!(groups.len(), 1);

        let detected = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert_eq!(detected.len(), 1);
        let expected = 4.0 / 6.0 * 0.4 + 0.4;
        assert!((detected[0].confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_emitted_groups_respect_thresholds() {
        let mut txs = Vec::new();
        txs.extend(spaced("Netflix", 15.99, date(2023, 1, 3), 30, 8));
        txs.extend(spaced("Spotify", 9.99, date(2023, 1, 9), 7, 5));
        txs.extend(spaced("Car Insurance", 310.0, date(2022, 2, 1), 91, 4));
        txs.extend(spaced("Domain Renewal", 12.0, date(2020, 6, 1), 365, 3));
        txs.extend(spaced("Coffee", 4.5, date(2023, 1, 1), 3, 10));
        txs.extend(spaced("Pharmacy", 22.0, date(2023, 1, 1), 47, 4));

        let config = AnalysisConfig::default();
        let groups = detect_recurring(&txs, &config).unwrap();
        assert_eq!(groups.len(), 4);

        for group in &groups {
            assert!(group.transactions.len() >= config.min_occurrences);
            assert!(group.confidence >= config.min_confidence && group.confidence <= 1.0);

            let refs: Vec<&Transaction> = group.transactions.iter().collect();
            let gaps = day_gaps(&refs);
            let avg = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
            assert!(group.pattern.frequency.contains(avg));
        }

        // Highest confidence first
        assert!(groups
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_group_ids_are_stable() {
        let txs = spaced("Netflix", 15.99, date(2024, 1, 1), 30, 4);
        let first = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        let second = detect_recurring(&txs, &AnalysisConfig::default()).unwrap();
        assert_eq!(first, second);
        assert!(first[0].id.starts_with("recurring-"));
        assert_eq!(first[0].id.len(), "recurring-".len() + 16);
    }

    #[test]
    fn test_to_rule() {
        let txs = spaced("Netflix", 15.99, date(2024, 1, 1), 30, 4);
        let group = detect_recurring(&txs, &AnalysisConfig::default())
            .unwrap()
            .remove(0);
        let rule = group.to_rule();
        assert_eq!(rule.pattern, "Netflix");
        assert_eq!(rule.frequency, Frequency::Monthly);
        assert_eq!(rule.confidence, group.confidence);
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_recurring(&[], &AnalysisConfig::default())
            .unwrap()
            .is_empty());
    }
}
