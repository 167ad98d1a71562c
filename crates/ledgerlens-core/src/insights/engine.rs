//! Insight Engine - orchestrates insight generation and ranking

use crate::config::AnalysisConfig;
use crate::models::{RecurringGroup, Transaction};

use super::types::{AnalyzerKind, Insight};
use super::{
    AnomalyInsight, BestDayInsight, ImpulseBuyingInsight, RecurringInsight,
    SubscriptionAuditInsight, TopCategoryInsight, TrendInsight, WeekendSpendingInsight,
};

/// Context provided to insight analyzers
pub struct AnalysisContext<'a> {
    /// Current-period transactions
    pub transactions: &'a [Transaction],
    /// Previous-period transactions, for trend comparison
    pub previous: Option<&'a [Transaction]>,
    /// Recurring groups already detected for the current period
    pub recurring: &'a [RecurringGroup],
    pub config: &'a AnalysisConfig,
}

impl<'a> AnalysisContext<'a> {
    /// Create a new analysis context
    pub fn new(
        transactions: &'a [Transaction],
        previous: Option<&'a [Transaction]>,
        recurring: &'a [RecurringGroup],
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            transactions,
            previous,
            recurring,
            config,
        }
    }
}

/// Trait for insight analyzers
pub trait Analyzer: Send + Sync {
    /// Unique identifier for this analyzer
    fn id(&self) -> AnalyzerKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze data and produce insights
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight>;
}

/// The main insight engine that orchestrates analysis
pub struct InsightEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create a new insight engine with the built-in analyzers.
    ///
    /// Registration order is generation order, which breaks priority ties.
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register(Box::new(AnomalyInsight));
        engine.register(Box::new(TrendInsight));
        engine.register(Box::new(RecurringInsight));
        engine.register(Box::new(WeekendSpendingInsight));
        engine.register(Box::new(TopCategoryInsight));
        engine.register(Box::new(ImpulseBuyingInsight));
        engine.register(Box::new(BestDayInsight));
        engine.register(Box::new(SubscriptionAuditInsight));

        engine
    }

    /// Create an engine with no analyzers registered
    pub fn empty() -> Self {
        Self { analyzers: vec![] }
    }

    /// Register an insight analyzer
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Run all analyzers and return their insights, most urgent first.
    ///
    /// The sort is stable: insights with equal priority keep generation order.
    pub fn analyze_all(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        let mut all_insights = vec![];

        for analyzer in &self.analyzers {
            let insights = analyzer.analyze(ctx);
            tracing::debug!(
                analyzer = analyzer.id().as_str(),
                count = insights.len(),
                "Insight analysis complete"
            );
            all_insights.extend(insights);
        }

        all_insights.sort_by_key(|i| i.priority);
        all_insights
    }

    /// Get list of registered analyzers
    pub fn analyzer_kinds(&self) -> Vec<AnalyzerKind> {
        self.analyzers.iter().map(|a| a.id()).collect()
    }
}
