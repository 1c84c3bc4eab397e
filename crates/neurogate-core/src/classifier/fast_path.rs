//! Fast-path gate.
//!
//! Checks a flat set of high-signal terms before the full catalog scan. Any hit
//! is reported as [`MisuseCategory::OtherMisuse`] with at least 0.9 confidence.

use serde::{Deserialize, Serialize};

use super::scanner::LexicalScanner;
use super::{CategoryScores, MisuseCategory};

/// Confidence for a single fast-path hit, before per-match increments.
pub const FAST_PATH_BASE_CONFIDENCE: f32 = 0.9;

/// Confidence added per fast-path match.
pub const FAST_PATH_STEP: f32 = 0.05;

/// How non-winning categories are scored on a fast-path hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastPathScoring {
    /// Fixed placeholder scores: harmful 0.7, personal 0.3, deepfake 0.2, none 0.1.
    #[default]
    Legacy,
    /// Other categories get their full-scan confidence; `None` gets `1 - confidence`.
    Computed,
}

/// A fast-path hit.
#[derive(Debug, Clone, PartialEq)]
pub struct FastPathHit {
    /// Confidence for [`MisuseCategory::OtherMisuse`].
    pub confidence: f32,
    /// Terms that matched.
    pub matched_terms: Vec<&'static str>,
}

impl FastPathHit {
    /// Number of distinct terms that matched.
    pub fn match_count(&self) -> usize {
        self.matched_terms.len()
    }

    /// Placeholder score table used by [`FastPathScoring::Legacy`].
    pub fn legacy_scores(&self) -> CategoryScores {
        CategoryScores::new()
            .with(MisuseCategory::OtherMisuse, self.confidence)
            .with(MisuseCategory::HarmfulContent, 0.7)
            .with(MisuseCategory::PersonalDetails, 0.3)
            .with(MisuseCategory::DeepfakeImpersonation, 0.2)
            .with(MisuseCategory::None, 0.1)
    }

    /// Overlays the fast-path verdict onto computed category scores.
    pub fn computed_scores(&self, mut scores: CategoryScores) -> CategoryScores {
        scores.set(MisuseCategory::OtherMisuse, self.confidence);
        scores.set(MisuseCategory::None, 1.0 - self.confidence);
        scores
    }
}

/// Confidence for `matches` fast-path hits: `min(0.9 + 0.05 * matches, 1.0)`.
pub fn fast_path_confidence(matches: usize) -> f32 {
    (FAST_PATH_BASE_CONFIDENCE + FAST_PATH_STEP * matches as f32).min(1.0)
}

/// Low-latency pre-check against [`FAST_PATH_TERMS`](super::catalog::FAST_PATH_TERMS).
#[derive(Debug, Clone, Copy, Default)]
pub struct FastPathGate {
    scanner: LexicalScanner,
}

impl FastPathGate {
    /// Creates a gate that matches with the given scanner's mode.
    pub fn new(scanner: LexicalScanner) -> Self {
        Self { scanner }
    }

    /// Checks already-normalized text. Returns `None` on a miss.
    pub fn check(&self, normalized: &str) -> Option<FastPathHit> {
        let matched_terms = self.scanner.fast_path_matches(normalized);
        if matched_terms.is_empty() {
            return None;
        }

        Some(FastPathHit {
            confidence: fast_path_confidence(matched_terms.len()),
            matched_terms,
        })
    }
}
