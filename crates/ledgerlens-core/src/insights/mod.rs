//! Insight Engine - ranked, actionable spending insights
//!
//! A set of pluggable analyzers each look at the current period (plus the
//! previous period and detected recurring groups, when available) and emit
//! typed insights. The engine concatenates them in registration order and
//! stable-sorts by priority, so the most urgent findings come first.
//!
//! ## Built-in Analyzers
//!
//! - **Anomalies** - per-category z-score outliers
//! - **Trends** - period-over-period category changes
//! - **Recurring** - recurring payment summary
//! - **Spending patterns** - weekend share, top category, impulse buying,
//!   best spending day, subscription audit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledgerlens_core::insights::{AnalysisContext, InsightEngine};
//!
//! let engine = InsightEngine::new();
//! let ctx = AnalysisContext::new(&current, Some(previous.as_slice()), &recurring, &config);
//! let insights = engine.analyze_all(&ctx);
//! ```

pub mod anomalies;
pub mod engine;
pub mod heuristics;
pub mod trends;
pub mod types;

pub use anomalies::{detect_anomalies, AnomalyInsight};
pub use engine::{AnalysisContext, Analyzer, InsightEngine};
pub use heuristics::{
    best_spending_day, find_recurring_candidates, impulse_purchases, subscription_mentions,
    top_categories, weekend_split, BestDay, BestDayInsight, CategoryShare, ImpulseBuyingInsight,
    RecurringInsight, SubscriptionAuditInsight, TopCategoryInsight, WeekendSpendingInsight,
    WeekendSplit,
};
pub use trends::{analyze_trends, TrendInsight};
pub use types::{
    AnalyzerKind, Anomaly, CategoryTrend, Impact, Insight, InsightKind, Severity, TrendDirection,
};
