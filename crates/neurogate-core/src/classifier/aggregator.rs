//! Confidence aggregation.
//!
//! Turns per-tier match counts into a bounded confidence per category and
//! picks the winning category.

use super::scanner::{ScanCounts, TierCounts};
use super::{CategoryScores, MisuseCategory};

/// Confidence contributed by each high-tier match.
pub const HIGH_TIER_WEIGHT: f32 = 0.6;

/// Confidence contributed by each medium-tier match.
pub const MEDIUM_TIER_WEIGHT: f32 = 0.2;

/// The chosen category and the full score table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Winning category (`None` below threshold).
    pub category: MisuseCategory,
    /// Scores for every category.
    pub scores: CategoryScores,
}

/// Maps tier counts to confidences and selects a category.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceAggregator {
    threshold: f32,
}

impl ConfidenceAggregator {
    /// Creates an aggregator that flags categories at or above `threshold`.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Returns the flagging threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Confidence for one category's counts: a weighted sum clamped to 1.0.
    pub fn confidence(counts: TierCounts) -> f32 {
        let raw = HIGH_TIER_WEIGHT * counts.high as f32 + MEDIUM_TIER_WEIGHT * counts.medium as f32;
        raw.min(1.0)
    }

    /// Scores every misuse category without choosing a winner.
    ///
    /// The `None` slot is left at zero.
    pub fn category_scores(scan: &ScanCounts) -> CategoryScores {
        let mut scores = CategoryScores::new();
        for category in MisuseCategory::misuse() {
            scores.set(*category, Self::confidence(scan.get(*category)));
        }
        scores
    }

    /// Scores every category and selects the winner.
    ///
    /// The highest-scoring misuse category wins; ties go to the category
    /// declared first in [`MisuseCategory::all`]. If the best score is below
    /// the threshold the verdict is `None`. The `None` slot always holds
    /// `1 - best`.
    pub fn aggregate(&self, scan: &ScanCounts) -> Verdict {
        let mut scores = Self::category_scores(scan);

        let mut best = MisuseCategory::None;
        let mut best_score = 0.0_f32;
        for category in MisuseCategory::misuse() {
            let score = scores.get(*category);
            // Strict comparison keeps the earlier (higher-priority) category on ties.
            if score > best_score {
                best = *category;
                best_score = score;
            }
        }

        scores.set(MisuseCategory::None, 1.0 - best_score);

        let category = if best_score > 0.0 && best_score >= self.threshold {
            best
        } else {
            MisuseCategory::None
        };

        Verdict { category, scores }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LexicalScanner;

    fn counts(high: usize, medium: usize) -> TierCounts {
        TierCounts { high, medium }
    }

    #[test]
    fn confidence_is_weighted_sum() {
        assert_eq!(ConfidenceAggregator::confidence(counts(0, 0)), 0.0);
        assert!((ConfidenceAggregator::confidence(counts(1, 0)) - 0.6).abs() < 1e-6);
        assert!((ConfidenceAggregator::confidence(counts(0, 2)) - 0.4).abs() < 1e-6);
        assert!((ConfidenceAggregator::confidence(counts(1, 1)) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(ConfidenceAggregator::confidence(counts(20, 0)), 1.0);
        assert_eq!(ConfidenceAggregator::confidence(counts(0, 50)), 1.0);
    }

    #[test]
    fn confidence_is_monotonic() {
        let mut last = 0.0;
        for high in 0..4 {
            for medium in 0..8 {
                let c = ConfidenceAggregator::confidence(counts(high, medium));
                assert!((0.0..=1.0).contains(&c));
                if medium > 0 {
                    assert!(c >= ConfidenceAggregator::confidence(counts(high, medium - 1)));
                }
                if high > 0 {
                    assert!(c >= ConfidenceAggregator::confidence(counts(high - 1, medium)));
                }
                last = c;
            }
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(ConfidenceAggregator::new(3.0).threshold(), 1.0);
        assert_eq!(ConfidenceAggregator::new(-1.0).threshold(), 0.0);
    }

    #[test]
    fn no_matches_yields_none() {
        let scan = LexicalScanner::default().scan("How do I bake sourdough bread?");
        let verdict = ConfidenceAggregator::new(0.5).aggregate(&scan);
        assert_eq!(verdict.category, MisuseCategory::None);
        assert_eq!(verdict.scores[MisuseCategory::None], 1.0);
    }

    #[test]
    fn below_threshold_yields_none() {
        // Two medium matches: 0.4 < 0.5
        let scan = LexicalScanner::default().scan("check my email and website");
        let verdict = ConfidenceAggregator::new(0.5).aggregate(&scan);
        assert_eq!(verdict.category, MisuseCategory::None);
        assert!(verdict.scores[MisuseCategory::OtherMisuse] > 0.0);
    }

    #[test]
    fn lower_threshold_flags_weaker_signal() {
        let scan = LexicalScanner::default().scan("check my email and website");
        let verdict = ConfidenceAggregator::new(0.3).aggregate(&scan);
        assert_eq!(verdict.category, MisuseCategory::OtherMisuse);
    }

    #[test]
    fn highest_score_wins() {
        let scan = LexicalScanner::default().scan("my password is hunter2 and my pin is 1234");
        let verdict = ConfidenceAggregator::new(0.5).aggregate(&scan);
        assert_eq!(verdict.category, MisuseCategory::PersonalDetails);
        assert!(
            verdict.scores[MisuseCategory::PersonalDetails]
                > verdict.scores[MisuseCategory::OtherMisuse]
        );
    }

    #[test]
    fn ties_follow_priority_order() {
        // One high match each for HarmfulContent and DeepfakeImpersonation.
        let scan = LexicalScanner::default().scan("naked face swap");
        let verdict = ConfidenceAggregator::new(0.5).aggregate(&scan);
        assert_eq!(
            verdict.scores[MisuseCategory::HarmfulContent],
            verdict.scores[MisuseCategory::DeepfakeImpersonation]
        );
        assert_eq!(verdict.category, MisuseCategory::HarmfulContent);
    }

    #[test]
    fn none_score_complements_winner() {
        let scan = LexicalScanner::default().scan("naked face swap");
        let verdict = ConfidenceAggregator::new(0.5).aggregate(&scan);
        let winner = verdict.scores[verdict.category];
        assert!((verdict.scores[MisuseCategory::None] - (1.0 - winner)).abs() < 1e-6);
    }
}
