//! Top-level analysis entry point
//!
//! Runs recurring detection and insight generation over an immutable
//! snapshot of transactions. The analyzer holds no per-run state, so the
//! same input always produces the same report.

use serde::Serialize;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::detect;
use crate::error::Result;
use crate::import::check_input_size;
use crate::insights::{AnalysisContext, Insight, InsightEngine};
use crate::models::{RecurringGroup, Transaction};

/// Everything produced by one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Highest confidence first
    pub recurring: Vec<RecurringGroup>,
    /// Lowest priority value first
    pub insights: Vec<Insight>,
}

/// Detects recurring payments and synthesizes insights
pub struct TransactionAnalyzer {
    config: AnalysisConfig,
    engine: InsightEngine,
}

impl Default for TransactionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionAnalyzer {
    /// Analyzer with default thresholds and the built-in insight analyzers
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            engine: InsightEngine::new(),
        }
    }

    /// Analyzer with caller-supplied thresholds, rejected if out of range
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            engine: InsightEngine::new(),
        })
    }

    /// Replace the insight engine, e.g. to register extra analyzers
    pub fn with_engine(mut self, engine: InsightEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the full pipeline over the current period, comparing against
    /// `previous` for trends when given.
    pub fn analyze(
        &self,
        current: &[Transaction],
        previous: Option<&[Transaction]>,
    ) -> Result<AnalysisReport> {
        check_input_size(current.len(), self.config.max_transactions)?;
        if let Some(previous) = previous {
            check_input_size(previous.len(), self.config.max_transactions)?;
        }

        let recurring = detect::detect_recurring(current, &self.config)?;
        let insights = self.insights_for(current, previous, &recurring);

        info!(
            transactions = current.len(),
            previous = previous.map_or(0, |p| p.len()),
            recurring = recurring.len(),
            insights = insights.len(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            recurring,
            insights,
        })
    }

    /// Recurring detection only
    pub fn detect_recurring(&self, transactions: &[Transaction]) -> Result<Vec<RecurringGroup>> {
        check_input_size(transactions.len(), self.config.max_transactions)?;
        detect::detect_recurring(transactions, &self.config)
    }

    /// Insight generation only. Recurring groups are still detected so the
    /// recurring summary reflects full detection rather than the pair scan.
    pub fn generate_insights(
        &self,
        current: &[Transaction],
        previous: Option<&[Transaction]>,
    ) -> Result<Vec<Insight>> {
        Ok(self.analyze(current, previous)?.insights)
    }

    fn insights_for(
        &self,
        current: &[Transaction],
        previous: Option<&[Transaction]>,
        recurring: &[RecurringGroup],
    ) -> Vec<Insight> {
        let ctx = AnalysisContext::new(current, previous, recurring, &self.config);
        self.engine.analyze_all(&ctx)
    }
}
