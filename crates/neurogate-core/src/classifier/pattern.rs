//! Pattern classification pipeline.
//!
//! Runs the fast-path gate first and short-circuits on any hit. On a miss the
//! full catalog is scanned and aggregated into a per-category verdict.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::aggregator::ConfidenceAggregator;
use super::fast_path::{FastPathGate, FastPathScoring};
use super::scanner::{LexicalScanner, MatchMode};
use super::{MisuseCategory, PatternAnalysisResult};
use crate::detection::DetectionResult;
use crate::error::Result;
use crate::settings::{AppSettings, SensitivityLevel};

/// Trait for anything that can turn a prompt into a detection result.
///
/// The orchestrator only talks to this trait, so remote or ML-backed analyzers
/// can be swapped in for the pattern classifier.
pub trait PromptAnalyzer: Send + Sync {
    /// Analyzes a prompt under the given settings.
    fn analyze(&self, prompt: &str, settings: &AppSettings) -> Result<DetectionResult>;

    /// Returns the name of this analyzer for logging.
    fn name(&self) -> &'static str;
}

/// Configuration for the pattern classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// How catalog terms are matched.
    #[serde(default)]
    pub match_mode: MatchMode,
    /// How non-winning categories are scored on a fast-path hit.
    #[serde(default)]
    pub fast_path_scoring: FastPathScoring,
    /// Sensitivity used when the caller does not supply one.
    #[serde(default)]
    pub sensitivity: SensitivityLevel,
}

/// Layered keyword classifier: fast-path gate, then full scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier {
    scanner: LexicalScanner,
    gate: FastPathGate,
    config: AnalyzerConfig,
}

impl PatternClassifier {
    /// Creates a classifier with the given configuration.
    pub fn new(config: AnalyzerConfig) -> Self {
        let scanner = LexicalScanner::new(config.match_mode);
        Self {
            scanner,
            gate: FastPathGate::new(scanner),
            config,
        }
    }

    /// Creates a classifier with default settings (substring matching,
    /// legacy fast-path scores, medium sensitivity).
    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Fast path first, full analysis on a miss, using the configured sensitivity.
    pub fn fast_analyze(&self, text: &str) -> PatternAnalysisResult {
        self.fast_analyze_with(text, self.config.sensitivity)
    }

    /// Fast path first, full analysis on a miss.
    pub fn fast_analyze_with(
        &self,
        text: &str,
        sensitivity: SensitivityLevel,
    ) -> PatternAnalysisResult {
        let start = Instant::now();
        let normalized = LexicalScanner::normalize(text);

        let Some(hit) = self.gate.check(&normalized) else {
            trace!("Fast path miss, running full scan");
            return self.full_analysis(&normalized, sensitivity, start);
        };

        trace!(matches = hit.match_count(), "Fast path hit");
        let scores = match self.config.fast_path_scoring {
            FastPathScoring::Legacy => hit.legacy_scores(),
            FastPathScoring::Computed => {
                let scan = self.scanner.scan_normalized(&normalized);
                hit.computed_scores(ConfidenceAggregator::category_scores(&scan))
            }
        };

        PatternAnalysisResult::new(
            MisuseCategory::OtherMisuse,
            scores,
            hit.matched_terms.iter().map(|t| t.to_string()).collect(),
            true,
            start.elapsed().as_micros() as u64,
        )
    }

    /// Full multi-category analysis, skipping the fast path.
    pub fn analyze(&self, text: &str) -> PatternAnalysisResult {
        self.analyze_with(text, self.config.sensitivity)
    }

    /// Full multi-category analysis at the given sensitivity.
    pub fn analyze_with(&self, text: &str, sensitivity: SensitivityLevel) -> PatternAnalysisResult {
        let start = Instant::now();
        let normalized = LexicalScanner::normalize(text);
        self.full_analysis(&normalized, sensitivity, start)
    }

    fn full_analysis(
        &self,
        normalized: &str,
        sensitivity: SensitivityLevel,
        start: Instant,
    ) -> PatternAnalysisResult {
        let scan = self.scanner.scan_normalized(normalized);
        let verdict = ConfidenceAggregator::new(sensitivity.threshold()).aggregate(&scan);

        let matched_terms = scan.matched_terms.iter().map(|t| t.to_string()).collect();

        PatternAnalysisResult::new(
            verdict.category,
            verdict.scores,
            matched_terms,
            false,
            start.elapsed().as_micros() as u64,
        )
    }
}

impl PromptAnalyzer for PatternClassifier {
    fn analyze(&self, prompt: &str, settings: &AppSettings) -> Result<DetectionResult> {
        let analysis = self.fast_analyze_with(prompt, settings.sensitivity_level);
        Ok(DetectionResult::from_analysis(prompt, analysis))
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}
