//! Misuse categories and analysis results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Misuse categories a prompt can be classified into.
///
/// Declaration order doubles as the tie-break priority: when two categories
/// reach the same confidence, the one declared first wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisuseCategory {
    /// Violence, weapons, explicit or self-harm content.
    HarmfulContent,
    /// Face swaps, deepfakes and impersonation of real people.
    DeepfakeImpersonation,
    /// Disclosure of passwords, card numbers, addresses and similar data.
    PersonalDetails,
    /// Hacking, fraud, drugs and other misuse.
    OtherMisuse,
    /// No misuse detected.
    #[default]
    None,
}

impl MisuseCategory {
    /// Number of declared categories, including `None`.
    pub const COUNT: usize = 5;

    /// Returns all categories in priority order, `None` last.
    pub fn all() -> &'static [MisuseCategory] {
        &[
            MisuseCategory::HarmfulContent,
            MisuseCategory::DeepfakeImpersonation,
            MisuseCategory::PersonalDetails,
            MisuseCategory::OtherMisuse,
            MisuseCategory::None,
        ]
    }

    /// Returns the misuse categories (everything except `None`) in priority order.
    pub fn misuse() -> &'static [MisuseCategory] {
        &Self::all()[..Self::COUNT - 1]
    }

    /// Returns a human-readable name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            MisuseCategory::HarmfulContent => "Harmful Content",
            MisuseCategory::DeepfakeImpersonation => "Deepfake / Impersonation",
            MisuseCategory::PersonalDetails => "Personal Details",
            MisuseCategory::OtherMisuse => "Other Misuse",
            MisuseCategory::None => "None",
        }
    }

    /// Returns the storage key for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            MisuseCategory::HarmfulContent => "harmful_content",
            MisuseCategory::DeepfakeImpersonation => "deepfake_impersonation",
            MisuseCategory::PersonalDetails => "personal_details",
            MisuseCategory::OtherMisuse => "other_misuse",
            MisuseCategory::None => "none",
        }
    }

    /// Parses a storage key (or its kebab-case form).
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
    }

    /// Position in the priority order.
    fn index(self) -> usize {
        match self {
            MisuseCategory::HarmfulContent => 0,
            MisuseCategory::DeepfakeImpersonation => 1,
            MisuseCategory::PersonalDetails => 2,
            MisuseCategory::OtherMisuse => 3,
            MisuseCategory::None => 4,
        }
    }
}

impl fmt::Display for MisuseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-category confidence scores.
///
/// Holds exactly one slot per [`MisuseCategory`], so every category always has
/// a score. Values are clamped to `0.0..=1.0` on write.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScores([f32; MisuseCategory::COUNT]);

impl CategoryScores {
    /// Creates scores with every category at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the score for a category.
    pub fn get(&self, category: MisuseCategory) -> f32 {
        self.0[category.index()]
    }

    /// Sets the score for a category.
    pub fn set(&mut self, category: MisuseCategory, score: f32) {
        self.0[category.index()] = score.clamp(0.0, 1.0);
    }

    /// Builder-style variant of [`CategoryScores::set`].
    pub fn with(mut self, category: MisuseCategory, score: f32) -> Self {
        self.set(category, score);
        self
    }

    /// Iterates over `(category, score)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (MisuseCategory, f32)> + '_ {
        MisuseCategory::all().iter().map(move |c| (*c, self.get(*c)))
    }
}

impl Index<MisuseCategory> for CategoryScores {
    type Output = f32;

    fn index(&self, category: MisuseCategory) -> &f32 {
        &self.0[category.index()]
    }
}

/// Result of running the pattern classifier over one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysisResult {
    /// Whether the prompt was flagged as misuse.
    pub is_misuse: bool,
    /// The winning category (`None` when not flagged).
    pub category: MisuseCategory,
    /// Confidence in the winning category (0.0 to 1.0).
    pub confidence: f32,
    /// Scores for every category.
    pub scores: CategoryScores,
    /// Catalog terms that matched.
    pub matched_terms: Vec<String>,
    /// Whether the verdict came from the fast-path gate.
    pub fast_path: bool,
    /// Analysis duration in microseconds.
    pub duration_us: u64,
}

impl PatternAnalysisResult {
    /// Creates a result for the given winning category.
    ///
    /// `confidence` is read back from `scores` so the two never disagree.
    pub fn new(
        category: MisuseCategory,
        scores: CategoryScores,
        matched_terms: Vec<String>,
        fast_path: bool,
        duration_us: u64,
    ) -> Self {
        Self {
            is_misuse: category != MisuseCategory::None,
            category,
            confidence: scores.get(category),
            scores,
            matched_terms,
            fast_path,
            duration_us,
        }
    }

    /// Creates a negative result for empty input.
    pub fn safe(duration_us: u64) -> Self {
        Self::new(
            MisuseCategory::None,
            CategoryScores::new().with(MisuseCategory::None, 1.0),
            Vec::new(),
            false,
            duration_us,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_every_variant_with_none_last() {
        let all = MisuseCategory::all();
        assert_eq!(all.len(), MisuseCategory::COUNT);
        assert_eq!(all.last(), Some(&MisuseCategory::None));
        assert!(!MisuseCategory::misuse().contains(&MisuseCategory::None));
    }

    #[test]
    fn parse_accepts_storage_and_kebab_keys() {
        assert_eq!(
            MisuseCategory::parse("personal_details"),
            Some(MisuseCategory::PersonalDetails)
        );
        assert_eq!(
            MisuseCategory::parse("Deepfake-Impersonation"),
            Some(MisuseCategory::DeepfakeImpersonation)
        );
        assert_eq!(MisuseCategory::parse("violence"), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for category in MisuseCategory::all() {
            assert_eq!(MisuseCategory::parse(category.as_str()), Some(*category));
        }
    }

    #[test]
    fn scores_clamp_on_write() {
        let scores = CategoryScores::new()
            .with(MisuseCategory::OtherMisuse, 1.9)
            .with(MisuseCategory::None, -0.2);
        assert_eq!(scores[MisuseCategory::OtherMisuse], 1.0);
        assert_eq!(scores[MisuseCategory::None], 0.0);
    }

    #[test]
    fn scores_iter_covers_every_category() {
        let scores = CategoryScores::new();
        let categories: Vec<_> = scores.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, MisuseCategory::all());
    }

    #[test]
    fn result_confidence_matches_winning_score() {
        let scores = CategoryScores::new()
            .with(MisuseCategory::HarmfulContent, 0.8)
            .with(MisuseCategory::None, 0.2);
        let result =
            PatternAnalysisResult::new(MisuseCategory::HarmfulContent, scores, vec![], false, 10);
        assert!(result.is_misuse);
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn safe_result_is_not_misuse() {
        let result = PatternAnalysisResult::safe(5);
        assert!(!result.is_misuse);
        assert_eq!(result.category, MisuseCategory::None);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&MisuseCategory::DeepfakeImpersonation).unwrap();
        assert_eq!(json, "\"deepfake_impersonation\"");
    }
}
