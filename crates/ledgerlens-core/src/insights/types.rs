//! Core types for the Insight Engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Transaction;

/// Analyzers that can contribute insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Anomalies,
    Trends,
    Recurring,
    WeekendSpending,
    TopCategory,
    ImpulseBuying,
    BestDay,
    SubscriptionAudit,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Anomalies => "anomalies",
            AnalyzerKind::Trends => "trends",
            AnalyzerKind::Recurring => "recurring",
            AnalyzerKind::WeekendSpending => "weekend_spending",
            AnalyzerKind::TopCategory => "top_category",
            AnalyzerKind::ImpulseBuying => "impulse_buying",
            AnalyzerKind::BestDay => "best_day",
            AnalyzerKind::SubscriptionAudit => "subscription_audit",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of insight, which drives how a caller presents it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
    Tip,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Success => "success",
            InsightKind::Info => "info",
            InsightKind::Tip => "tip",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(InsightKind::Warning),
            "success" => Ok(InsightKind::Success),
            "info" => Ok(InsightKind::Info),
            "tip" => Ok(InsightKind::Tip),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// How much an insight matters to the user's finances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Impact::High),
            "medium" => Ok(Impact::Medium),
            "low" => Ok(Impact::Low),
            _ => Err(format!("Unknown impact: {}", s)),
        }
    }
}

/// A ranked, human-readable finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Deterministic key, e.g. "anomaly-0" or "weekend-spending"
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub impact: Impact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub actionable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    /// Lower sorts first
    pub priority: u8,
}

impl Insight {
    /// Create a non-actionable insight with no category or amount
    pub fn new(
        id: impl Into<String>,
        kind: InsightKind,
        impact: Impact,
        priority: u8,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            impact,
            category: None,
            amount: None,
            actionable: false,
            actions: None,
            priority,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Mark actionable with suggested next steps, in order
    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actionable = true;
        self.actions = Some(actions.iter().map(|a| a.to_string()).collect());
        self
    }
}

/// How far outside its category an anomalous transaction sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn impact(&self) -> Impact {
        match self {
            Severity::Medium => Impact::Medium,
            Severity::High => Impact::High,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction flagged as a statistical outlier within its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub transaction: Transaction,
    pub reason: String,
    pub severity: Severity,
    pub z_score: f64,
    /// Category mean
    pub expected_amount: f64,
}

/// Direction of a category's spend between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Period-over-period change for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTrend {
    pub category: String,
    pub trend: TrendDirection,
    pub percent_change: f64,
    /// Current-period total divided by current-period count
    pub average_amount: f64,
    /// Current-period transaction count
    pub frequency: usize,
}
