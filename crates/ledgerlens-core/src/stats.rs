//! Small numeric and grouping helpers shared by the analysis stages

use std::collections::HashMap;

use crate::models::Transaction;

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean of absolute deviations from `center`
pub fn mean_absolute_deviation(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - center).abs()).sum::<f64>() / values.len() as f64
}

/// Partition transactions by category, categories in order of first appearance
pub fn group_by_category<'a, I>(transactions: I) -> Vec<(&'a str, Vec<&'a Transaction>)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Transaction>)> = Vec::new();

    for tx in transactions {
        match index.get(tx.category.as_str()) {
            Some(&i) => groups[i].1.push(tx),
            None => {
                index.insert(tx.category.as_str(), groups.len());
                groups.push((tx.category.as_str(), vec![tx]));
            }
        }
    }

    groups
}

/// Sum of amounts
pub fn total(transactions: &[&Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}
