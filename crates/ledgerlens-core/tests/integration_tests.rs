//! Integration tests for ledgerlens-core
//!
//! These tests exercise the full parse → detect → insight workflow through
//! the public API, using JSON fixtures in the shape callers send.

use chrono::NaiveDate;
use serde_json::{json, Value};

use ledgerlens_core::{
    parse_transactions, within_trailing_months, AnalysisConfig, Error, Frequency, InsightKind,
    Transaction, TransactionAnalyzer,
};

fn record(id: &str, date: &str, amount: f64, category: &str, description: &str) -> Value {
    json!({
        "id": id,
        "date": date,
        "amount": amount,
        "category": category,
        "description": description,
        "type": "EXPENSE",
    })
}

fn parse(records: Vec<Value>) -> Vec<Transaction> {
    parse_transactions(&Value::Array(records).to_string()).expect("fixture should parse")
}

/// Netflix on the 1st of Jan-Apr 2024, mixing date and date-time strings
fn netflix_fixture() -> Vec<Transaction> {
    parse(vec![
        record("nf-1", "2024-01-01", 15.99, "Entertainment", "NETFLIX.COM"),
        record("nf-2", "2024-02-01T08:15:00Z", 15.99, "Entertainment", "Netflix.com"),
        record("nf-3", "2024-03-01", 15.99, "Entertainment", "NETFLIX.COM"),
        record("nf-4", "2024-04-01T00:00:00", 15.99, "Entertainment", "NETFLIX.COM"),
    ])
}

/// A noisy month of shopping with one very large purchase, plus a quiet
/// previous month for comparison
fn shopping_fixture() -> (Vec<Transaction>, Vec<Transaction>) {
    let mut current: Vec<Value> = (1..=11)
        .map(|d| {
            record(
                &format!("s-{}", d),
                &format!("2024-03-{:02}", d),
                10.0,
                "Shopping",
                &format!("Store {}", d),
            )
        })
        .collect();
    current.push(record("s-big", "2024-03-12", 1000.0, "Shopping", "Electronics"));

    let previous = vec![
        record("p-1", "2024-02-05", 60.0, "Shopping", "Store"),
        record("p-2", "2024-02-06", 40.0, "Shopping", "Store"),
    ];

    (parse(current), parse(previous))
}

// =============================================================================
// Recurring Detection
// =============================================================================

#[test]
fn test_netflix_end_to_end() {
    let transactions = netflix_fixture();
    let report = TransactionAnalyzer::new()
        .analyze(&transactions, None)
        .expect("analysis should succeed");

    assert_eq!(report.recurring.len(), 1);
    let group = &report.recurring[0];

    assert_eq!(group.pattern.frequency, Frequency::Monthly);
    assert!((group.pattern.amount - 15.99).abs() < 1e-9);
    assert_eq!(group.pattern.day_of_month, Some(1));
    assert!(group.confidence >= 0.6 && group.confidence <= 1.0);
    assert!((group.savings.unwrap() - 19.188).abs() < 1e-9);
    assert_eq!(
        group.next_expected_date,
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    );

    let rule = group.to_rule();
    assert_eq!(rule.frequency, Frequency::Monthly);
    assert_eq!(rule.confidence, group.confidence);
}

#[test]
fn test_report_serializes_to_output_contract() {
    let report = TransactionAnalyzer::new()
        .analyze(&netflix_fixture(), None)
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    let group = &value["recurring"][0];
    assert_eq!(group["pattern"]["frequency"], "monthly");
    assert_eq!(group["pattern"]["type"], "EXPENSE");
    assert_eq!(group["pattern"]["dayOfMonth"], 1);
    assert_eq!(group["nextExpectedDate"], "2024-05-01");
    assert_eq!(group["transactions"].as_array().unwrap().len(), 4);

    for insight in value["insights"].as_array().unwrap() {
        assert!(insight["type"].is_string());
        assert!(insight["priority"].is_u64());
    }
}

#[test]
fn test_config_file_overrides_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.toml");
    std::fs::write(&path, "[recurring]\nmin_occurrences = 5\n").unwrap();

    let config = AnalysisConfig::load_from(&path).unwrap();
    assert_eq!(config.min_occurrences, 5);

    let groups = TransactionAnalyzer::with_config(config)
        .unwrap()
        .detect_recurring(&netflix_fixture())
        .unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_trailing_window_before_detection() {
    let mut transactions = netflix_fixture();
    transactions.extend(parse(vec![record(
        "old",
        "2020-06-01",
        15.99,
        "Entertainment",
        "NETFLIX.COM",
    )]));

    let as_of = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
    let recent = within_trailing_months(&transactions, as_of, 24);
    assert_eq!(recent.len(), 4);

    let groups = TransactionAnalyzer::new().detect_recurring(&recent).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].transactions.len(), 4);
}

// =============================================================================
// Insights
// =============================================================================

#[test]
fn test_anomaly_and_trend_lead_the_insights() {
    let (current, previous) = shopping_fixture();
    let insights = TransactionAnalyzer::new()
        .generate_insights(&current, Some(previous.as_slice()))
        .unwrap();

    // Both are priority 1; anomalies are generated before trends
    assert_eq!(insights[0].id, "anomaly-0");
    assert_eq!(insights[0].amount, Some(1000.0));
    assert_eq!(insights[1].id, "trend-0");
    assert_eq!(insights[1].kind, InsightKind::Warning);

    let ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();
    assert!(ids.contains(&"impulse-buying"));
    assert!(ids.contains(&"top-category-0"));
    assert!(ids.contains(&"best-day"));
}

#[test]
fn test_insights_sorted_by_priority() {
    let (mut current, previous) = shopping_fixture();
    current.extend(netflix_fixture());
    current.extend(parse(vec![
        record("sub-1", "2024-03-16", 12.0, "Software", "Cloud storage monthly"),
        record("wk-1", "2024-03-23", 300.0, "Dining", "Tasting menu"),
    ]));

    let insights = TransactionAnalyzer::new()
        .generate_insights(&current, Some(previous.as_slice()))
        .unwrap();

    assert!(!insights.is_empty());
    for pair in insights.windows(2) {
        assert!(pair[0].priority <= pair[1].priority);
    }
}

#[test]
fn test_analysis_is_idempotent() {
    let (mut current, previous) = shopping_fixture();
    current.extend(netflix_fixture());
    let analyzer = TransactionAnalyzer::new();

    let first = analyzer.analyze(&current, Some(previous.as_slice())).unwrap();
    let second = analyzer.analyze(&current, Some(previous.as_slice())).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_bad_date_names_the_record() {
    let json = Value::Array(vec![
        record("ok", "2024-01-01", 5.0, "Dining", "Lunch"),
        record("bad-1", "01/02/2024", 5.0, "Dining", "Lunch"),
    ])
    .to_string();

    match parse_transactions(&json) {
        Err(Error::InvalidDate { id, .. }) => assert_eq!(id, "bad-1"),
        other => panic!("expected InvalidDate, got {:?}", other),
    }
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        parse_transactions("{not json"),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_input_ceiling_rejects_large_batches() {
    let config = AnalysisConfig {
        max_transactions: Some(2),
        ..AnalysisConfig::default()
    };

    let result = TransactionAnalyzer::with_config(config)
        .unwrap()
        .analyze(&netflix_fixture(), None);
    assert!(matches!(
        result,
        Err(Error::InputTooLarge { count: 4, limit: 2 })
    ));
}
