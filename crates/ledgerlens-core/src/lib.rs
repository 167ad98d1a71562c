//! Ledgerlens Core Library
//!
//! Transaction analysis for personal finance data:
//! - Input parsing and validation for the transaction JSON contract
//! - Recurring payment detection (fuzzy grouping, interval classification,
//!   confidence scoring, next-date projection)
//! - Per-category anomaly detection
//! - Period-over-period category trends
//! - Pluggable insight engine that ranks findings by priority
//! - Layered analysis config (embedded defaults, TOML override)
//!
//! The engine performs no persistence. Callers hand it a snapshot of
//! transactions and render or store what comes back.

pub mod analysis;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;
pub mod normalize;
pub mod stats;

pub use analysis::{AnalysisReport, TransactionAnalyzer};
pub use config::AnalysisConfig;
pub use detect::{
    classify_interval, detect_recurring, group_similar_transactions, next_expected_date,
    score_confidence,
};
pub use error::{Error, Result};
pub use import::{parse_transactions, within_trailing_months};
pub use insights::{
    analyze_trends, detect_anomalies, find_recurring_candidates, Analyzer, Anomaly,
    CategoryTrend, Insight, InsightEngine, InsightKind,
};
pub use models::{
    Frequency, RecurringGroup, RecurringPattern, RecurringRule, Transaction, TransactionType,
};
pub use normalize::{edit_similarity, jaccard_similarity, normalize_description};
