//! Description normalization and string similarity
//!
//! Two similarity measures live here:
//! - [`jaccard_similarity`] compares token sets and drives recurring grouping
//! - [`edit_similarity`] compares characters and drives recurring hints

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical form of a description for matching.
///
/// Lowercases, drops everything except ASCII letters, digits and whitespace,
/// collapses whitespace runs to a single space and trims.
pub fn normalize_description(description: &str) -> String {
    let lower = description.to_lowercase();
    let stripped = NON_ALPHANUMERIC.replace_all(&lower, "");
    WHITESPACE_RUN
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Jaccard similarity of the whitespace-separated token sets of two strings.
///
/// Two empty strings are identical (1.0).
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = left.intersection(&right).count();

    intersection as f64 / union as f64
}

/// Levenshtein distance counted in chars
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Edit-distance similarity: share of the longer string left unchanged
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }

    (longest - levenshtein_distance(a, b)) as f64 / longest as f64
}
