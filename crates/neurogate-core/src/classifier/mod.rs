//! Prompt misuse classification.
//!
//! This module provides the layered keyword classifier that flags prompts
//! into one of four misuse categories.

mod aggregator;
mod catalog;
mod category;
mod fast_path;
mod pattern;
mod scanner;

pub use aggregator::{ConfidenceAggregator, Verdict, HIGH_TIER_WEIGHT, MEDIUM_TIER_WEIGHT};
pub use catalog::{CategoryCatalog, Tier, CATALOG, FAST_PATH_TERMS};
pub use category::{CategoryScores, MisuseCategory, PatternAnalysisResult};
pub use fast_path::{
    fast_path_confidence, FastPathGate, FastPathHit, FastPathScoring, FAST_PATH_BASE_CONFIDENCE,
    FAST_PATH_STEP,
};
pub use pattern::{AnalyzerConfig, PatternClassifier, PromptAnalyzer};
pub use scanner::{LexicalScanner, MatchMode, ScanCounts, TierCounts};
