//! Analysis configuration
//!
//! Every threshold the engine uses lives in [`AnalysisConfig`]. Defaults match
//! the long-standing behavior; callers may override any of them.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/ledgerlens/config/analysis.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analysis.toml");

/// Tunable thresholds for every analysis stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    // Recurring detection
    /// Minimum members for a recurring group to be reported
    pub min_occurrences: usize,
    /// Minimum confidence for a recurring group to be reported
    pub min_confidence: f64,
    /// Jaccard similarity a description must exceed to join a group
    pub similarity_threshold: f64,
    /// Fraction of annualized expense assumed reducible
    pub savings_heuristic_rate: f64,

    // Anomaly detection
    /// Categories with fewer members are skipped
    pub min_category_size: usize,
    /// z-score above which a transaction is anomalous
    pub z_score_threshold: f64,
    /// z-score above which an anomaly is high severity
    pub high_severity_z_score: f64,

    // Trend analysis (percent)
    /// Changes within +/- this band are stable
    pub stable_band: f64,
    /// Increase above which a warning insight is raised
    pub warning_increase: f64,
    /// Increase above which the warning is high impact
    pub high_increase: f64,

    // Heuristics
    /// Expenses below this amount count as potential impulse buys
    pub impulse_max_amount: f64,
    /// More than this many impulse buys raises a warning
    pub impulse_min_count: usize,
    pub impulse_excluded_categories: Vec<String>,
    /// Weekend share of spend (percent) above which a tip is raised
    pub weekend_share_threshold: f64,
    /// Top category share of spend (percent) above which it is called out
    pub top_category_share_threshold: f64,
    /// Edit-distance similarity for recurring hints
    pub hint_similarity: f64,
    /// Relative amount difference tolerated for recurring hints
    pub hint_amount_tolerance: f64,

    // Limits
    /// Reject inputs larger than this (grouping is quadratic)
    pub max_transactions: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            min_confidence: 0.6,
            similarity_threshold: 0.8,
            savings_heuristic_rate: 0.1,
            min_category_size: 3,
            z_score_threshold: 2.0,
            high_severity_z_score: 3.0,
            stable_band: 10.0,
            warning_increase: 20.0,
            high_increase: 50.0,
            impulse_max_amount: 50.0,
            impulse_min_count: 5,
            impulse_excluded_categories: vec![
                "Bills & Utilities".to_string(),
                "Healthcare".to_string(),
                "Transportation".to_string(),
            ],
            weekend_share_threshold: 60.0,
            top_category_share_threshold: 30.0,
            hint_similarity: 0.7,
            hint_amount_tolerance: 0.05,
            max_transactions: Some(50_000),
        }
    }
}

impl AnalysisConfig {
    /// Load from the data-dir override if present, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path, falling back to embedded defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse a TOML document; keys that are absent keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Check that thresholds are within meaningful ranges
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_confidence", self.min_confidence),
            ("similarity_threshold", self.similarity_threshold),
            ("hint_similarity", self.hint_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("savings_heuristic_rate", self.savings_heuristic_rate),
            ("z_score_threshold", self.z_score_threshold),
            ("high_severity_z_score", self.high_severity_z_score),
            ("stable_band", self.stable_band),
            ("impulse_max_amount", self.impulse_max_amount),
            ("hint_amount_tolerance", self.hint_amount_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.min_occurrences < 2 {
            return Err(Error::Config(
                "min_occurrences must be at least 2 to measure an interval".to_string(),
            ));
        }
        if self.high_severity_z_score < self.z_score_threshold {
            return Err(Error::Config(format!(
                "high_severity_z_score ({}) must not be below z_score_threshold ({})",
                self.high_severity_z_score, self.z_score_threshold
            )));
        }
        if self.high_increase < self.warning_increase {
            return Err(Error::Config(format!(
                "high_increase ({}) must not be below warning_increase ({})",
                self.high_increase, self.warning_increase
            )));
        }
        if self.max_transactions == Some(0) {
            return Err(Error::Config(
                "max_transactions must be positive when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ledgerlens").join("config").join("analysis.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AnalysisConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "Loading analysis config override");
            fs::read_to_string(&path)?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    recurring: Option<RawRecurring>,
    anomalies: Option<RawAnomalies>,
    trends: Option<RawTrends>,
    heuristics: Option<RawHeuristics>,
    limits: Option<RawLimits>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecurring {
    min_occurrences: Option<usize>,
    min_confidence: Option<f64>,
    similarity_threshold: Option<f64>,
    savings_heuristic_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnomalies {
    min_category_size: Option<usize>,
    z_score_threshold: Option<f64>,
    high_severity_z_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTrends {
    stable_band: Option<f64>,
    warning_increase: Option<f64>,
    high_increase: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHeuristics {
    impulse_max_amount: Option<f64>,
    impulse_min_count: Option<usize>,
    impulse_excluded_categories: Option<Vec<String>>,
    weekend_share_threshold: Option<f64>,
    top_category_share_threshold: Option<f64>,
    hint_similarity: Option<f64>,
    hint_amount_tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLimits {
    /// 0 disables the limit
    max_transactions: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AnalysisConfig::default();

    if let Some(recurring) = raw.recurring {
        if let Some(v) = recurring.min_occurrences {
            config.min_occurrences = v;
        }
        if let Some(v) = recurring.min_confidence {
            config.min_confidence = v;
        }
        if let Some(v) = recurring.similarity_threshold {
            config.similarity_threshold = v;
        }
        if let Some(v) = recurring.savings_heuristic_rate {
            config.savings_heuristic_rate = v;
        }
    }

    if let Some(anomalies) = raw.anomalies {
        if let Some(v) = anomalies.min_category_size {
            config.min_category_size = v;
        }
        if let Some(v) = anomalies.z_score_threshold {
            config.z_score_threshold = v;
        }
        if let Some(v) = anomalies.high_severity_z_score {
            config.high_severity_z_score = v;
        }
    }

    if let Some(trends) = raw.trends {
        if let Some(v) = trends.stable_band {
            config.stable_band = v;
        }
        if let Some(v) = trends.warning_increase {
            config.warning_increase = v;
        }
        if let Some(v) = trends.high_increase {
            config.high_increase = v;
        }
    }

    if let Some(heuristics) = raw.heuristics {
        if let Some(v) = heuristics.impulse_max_amount {
            config.impulse_max_amount = v;
        }
        if let Some(v) = heuristics.impulse_min_count {
            config.impulse_min_count = v;
        }
        if let Some(v) = heuristics.impulse_excluded_categories {
            config.impulse_excluded_categories = v;
        }
        if let Some(v) = heuristics.weekend_share_threshold {
            config.weekend_share_threshold = v;
        }
        if let Some(v) = heuristics.top_category_share_threshold {
            config.top_category_share_threshold = v;
        }
        if let Some(v) = heuristics.hint_similarity {
            config.hint_similarity = v;
        }
        if let Some(v) = heuristics.hint_amount_tolerance {
            config.hint_amount_tolerance = v;
        }
    }

    if let Some(limits) = raw.limits {
        if let Some(v) = limits.max_transactions {
            config.max_transactions = if v == 0 { None } else { Some(v) };
        }
    }

    config.validate()?;
    Ok(config)
}
