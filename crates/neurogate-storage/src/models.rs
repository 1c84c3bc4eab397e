//! Data models for storage.

use chrono::{DateTime, Utc};
use neurogate_core::{MisuseCategory, UserAction};
use serde::{Deserialize, Serialize};

/// A flagged interaction. Stores a hash and a short preview, never the full
/// prompt. Previews of personal details are redacted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedInteraction {
    /// Unique identifier.
    pub id: i64,
    /// SHA-256 hash of the prompt.
    pub prompt_hash: String,
    /// Short preview of the prompt.
    pub preview: String,
    /// Detected category.
    pub category: MisuseCategory,
    /// Confidence score (0.0 to 1.0).
    pub confidence: f32,
    /// Why the prompt was flagged.
    pub reason: String,
    /// Catalog terms that matched.
    pub matched_terms: Vec<String>,
    /// Source application.
    pub source: Option<String>,
    /// How the user responded.
    pub user_action: UserAction,
    /// Whether the user undid this flag.
    pub undone: bool,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

/// Parameters for recording a new flagged interaction.
#[derive(Debug, Clone)]
pub struct NewFlaggedInteraction {
    /// SHA-256 hash of the prompt.
    pub prompt_hash: String,
    /// Short preview of the prompt.
    pub preview: String,
    /// Detected category.
    pub category: MisuseCategory,
    /// Confidence score.
    pub confidence: f32,
    /// Why the prompt was flagged.
    pub reason: String,
    /// Catalog terms that matched.
    pub matched_terms: Vec<String>,
    /// Source application.
    pub source: Option<String>,
}

/// Filter options for querying flagged interactions.
#[derive(Debug, Clone, Default)]
pub struct FlaggedFilter {
    /// Filter by category.
    pub category: Option<MisuseCategory>,
    /// Filter by source application.
    pub source: Option<String>,
    /// Filter by user action.
    pub user_action: Option<UserAction>,
    /// Include interactions the user undid.
    pub include_undone: bool,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}

/// Summary statistics for flagged interactions. Undone rows are excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlaggedStats {
    /// Total flagged interactions.
    pub total: i64,
    /// Interactions the user has not responded to.
    pub unresolved: i64,
    /// Breakdown by category.
    pub by_category: CategoryCounts,
}

/// Breakdown of flagged interactions by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub harmful_content: i64,
    pub deepfake_impersonation: i64,
    pub personal_details: i64,
    pub other_misuse: i64,
}

impl CategoryCounts {
    /// Adds `count` to a category. `None` is ignored.
    pub fn add(&mut self, category: MisuseCategory, count: i64) {
        match category {
            MisuseCategory::HarmfulContent => self.harmful_content += count,
            MisuseCategory::DeepfakeImpersonation => self.deepfake_impersonation += count,
            MisuseCategory::PersonalDetails => self.personal_details += count,
            MisuseCategory::OtherMisuse => self.other_misuse += count,
            MisuseCategory::None => {}
        }
    }

    /// Returns the count for a category.
    pub fn get(&self, category: MisuseCategory) -> i64 {
        match category {
            MisuseCategory::HarmfulContent => self.harmful_content,
            MisuseCategory::DeepfakeImpersonation => self.deepfake_impersonation,
            MisuseCategory::PersonalDetails => self.personal_details,
            MisuseCategory::OtherMisuse => self.other_misuse,
            MisuseCategory::None => 0,
        }
    }
}

/// Configuration key-value pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration key.
    pub key: String,
    /// Configuration value (JSON).
    pub value: serde_json::Value,
}
