//! Domain models for Ledgerlens

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Direction of a transaction. Amounts are always positive; the sign lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque caller-assigned identifier
    pub id: String,
    pub date: NaiveDate,
    /// Always non-negative; see `kind`
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        kind: TransactionType,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            category: category.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// How often a recurring payment repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn all() -> &'static [Frequency] {
        &[
            Self::Weekly,
            Self::Biweekly,
            Self::Monthly,
            Self::Quarterly,
            Self::Yearly,
        ]
    }

    /// Inclusive range of average day-gaps that classify as this frequency
    pub fn day_range(&self) -> (f64, f64) {
        match self {
            Self::Weekly => (6.0, 8.0),
            Self::Biweekly => (13.0, 15.0),
            Self::Monthly => (28.0, 32.0),
            Self::Quarterly => (88.0, 95.0),
            Self::Yearly => (360.0, 370.0),
        }
    }

    pub fn contains(&self, avg_interval: f64) -> bool {
        let (low, high) = self.day_range();
        avg_interval >= low && avg_interval <= high
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annual" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The repeating shape shared by a group of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPattern {
    /// Description of the most recent member
    pub description: String,
    /// Mean amount across members
    pub amount: f64,
    pub frequency: Frequency,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// 0 = Sunday; weekly patterns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    /// Monthly patterns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
}

/// A detected recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringGroup {
    /// Stable id derived from member transaction ids
    pub id: String,
    pub pattern: RecurringPattern,
    /// Members, oldest first
    pub transactions: Vec<Transaction>,
    pub confidence: f64,
    pub next_expected_date: NaiveDate,
    /// Annualized reducible-spend estimate, expenses only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
}

impl RecurringGroup {
    /// Build a rule the caller can persist to track this payment going forward
    pub fn to_rule(&self) -> RecurringRule {
        RecurringRule {
            pattern: self.pattern.description.clone(),
            amount: self.pattern.amount,
            frequency: self.pattern.frequency,
            category: self.pattern.category.clone(),
            kind: self.pattern.kind,
            day_of_week: self.pattern.day_of_week,
            day_of_month: self.pattern.day_of_month,
            confidence: self.confidence,
        }
    }
}

/// A recurring-payment rule exported from a detected group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub pattern: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    pub confidence: f64,
}
