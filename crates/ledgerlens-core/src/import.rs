//! Transaction input parsing and pre-filtering
//!
//! Callers hand over JSON records whose dates may be plain dates or
//! date-times. Parsing validates each record and fails on the first bad one,
//! naming it, so the analysis stages only ever see well-typed data.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};

/// A transaction record as it arrives over the wire
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub date: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = Error;

    fn try_from(record: TransactionRecord) -> Result<Self> {
        let date = parse_date(&record.date).ok_or_else(|| Error::InvalidDate {
            id: record.id.clone(),
            value: record.date.clone(),
        })?;

        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(Error::InvalidAmount {
                id: record.id,
                amount: record.amount,
            });
        }

        Ok(Transaction {
            id: record.id,
            date,
            amount: record.amount,
            category: record.category,
            description: record.description,
            kind: record.kind,
        })
    }
}

/// Parse a JSON array of transaction records
pub fn parse_transactions(json: &str) -> Result<Vec<Transaction>> {
    let records: Vec<TransactionRecord> = serde_json::from_str(json)?;
    let transactions = records
        .into_iter()
        .map(Transaction::try_from)
        .collect::<Result<Vec<_>>>()?;

    debug!(count = transactions.len(), "Parsed transactions");
    Ok(transactions)
}

/// Parse an ISO-8601 calendar date or date-time, keeping only the date.
///
/// Date-times with an offset keep the calendar date as written rather than
/// converting to UTC.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    None
}

/// Keep only transactions dated within `months` calendar months up to `as_of`
/// (inclusive on both ends). Use this to bound very long histories before
/// recurring detection.
pub fn within_trailing_months(
    transactions: &[Transaction],
    as_of: NaiveDate,
    months: u32,
) -> Vec<Transaction> {
    let start = as_of
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);

    transactions
        .iter()
        .filter(|t| t.date >= start && t.date <= as_of)
        .cloned()
        .collect()
}

/// Reject inputs over the configured ceiling
pub fn check_input_size(count: usize, limit: Option<usize>) -> Result<()> {
    match limit {
        Some(limit) if count > limit => Err(Error::InputTooLarge { count, limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T10:30:00Z"), Some(date(2024, 1, 15)));
        assert_eq!(
            parse_date("2024-01-15T23:30:00-05:00"),
            Some(date(2024, 1, 15))
        );
        assert_eq!(parse_date("2024-01-15T10:30:00.123"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 10:30:00"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_transactions() {
        let json = r#"[
            {"id": "a", "date": "2024-01-01", "amount": 15.99, "category": "Entertainment",
             "description": "Netflix", "type": "EXPENSE"},
            {"id": "b", "date": "2024-01-02T09:00:00Z", "amount": 2500, "category": "Salary",
             "description": "Payroll", "type": "INCOME"}
        ]"#;

        let txs = parse_transactions(json).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind, TransactionType::Expense);
        assert_eq!(txs[1].date, date(2024, 1, 2));
    }

    #[test]
    fn test_parse_transactions_names_bad_date() {
        let json = r#"[
            {"id": "ok", "date": "2024-01-01", "amount": 1, "category": "c",
             "description": "d", "type": "EXPENSE"},
            {"id": "broken", "date": "yesterday", "amount": 1, "category": "c",
             "description": "d", "type": "EXPENSE"}
        ]"#;

        match parse_transactions(json).unwrap_err() {
            Error::InvalidDate { id, value } => {
                assert_eq!(id, "broken");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_transactions_rejects_negative_amount() {
        let json = r#"[{"id": "neg", "date": "2024-01-01", "amount": -5, "category": "c",
             "description": "d", "type": "EXPENSE"}]"#;
        assert!(matches!(
            parse_transactions(json).unwrap_err(),
            Error::InvalidAmount { .. }
        ));
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_transactions("[]").unwrap().is_empty());
    }

    #[test]
    fn test_within_trailing_months() {
        let txs: Vec<Transaction> = [date(2022, 12, 30), date(2023, 1, 31), date(2024, 12, 31)]
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                Transaction::new(i.to_string(), d, 1.0, "c", "d", TransactionType::Expense)
            })
            .collect();

        let kept = within_trailing_months(&txs, date(2024, 12, 31), 24);
        let ids: Vec<&str> = kept.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_check_input_size() {
        assert!(check_input_size(10, Some(10)).is_ok());
        assert!(check_input_size(10, None).is_ok());
        assert!(matches!(
            check_input_size(11, Some(10)),
            Err(Error::InputTooLarge { count: 11, limit: 10 })
        ));
    }
}
