//! Detection results presented to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::{MisuseCategory, PatternAnalysisResult};

/// A classified prompt with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// The analyzed prompt.
    pub prompt: String,
    /// Classifier output.
    pub analysis: PatternAnalysisResult,
    /// Short explanation of the verdict.
    pub reason: String,
    /// Advice shown alongside the verdict.
    pub suggestions: Vec<String>,
    /// When the analysis finished.
    pub timestamp: DateTime<Utc>,
}

impl DetectionResult {
    /// Wraps a classifier result with its reason and suggestions.
    pub fn from_analysis(prompt: impl Into<String>, analysis: PatternAnalysisResult) -> Self {
        Self {
            prompt: prompt.into(),
            reason: reason_for(&analysis),
            suggestions: suggestions_for(analysis.category),
            analysis,
            timestamp: Utc::now(),
        }
    }

    /// Whether the prompt was flagged.
    pub fn is_misuse(&self) -> bool {
        self.analysis.is_misuse
    }

    /// The winning category.
    pub fn category(&self) -> MisuseCategory {
        self.analysis.category
    }

    /// Confidence in the winning category.
    pub fn confidence(&self) -> f32 {
        self.analysis.confidence
    }
}

/// Explains a verdict in one sentence.
pub fn reason_for(analysis: &PatternAnalysisResult) -> String {
    if !analysis.is_misuse {
        return "Content appears safe for AI generation".to_string();
    }

    let what = match analysis.category {
        MisuseCategory::HarmfulContent => "potentially harmful content",
        MisuseCategory::DeepfakeImpersonation => "a potential deepfake or impersonation request",
        MisuseCategory::PersonalDetails => "personal details that should not be shared",
        MisuseCategory::OtherMisuse | MisuseCategory::None => "potential misuse",
    };

    let mut reason = format!(
        "Detected {what} ({:.0}% confidence)",
        analysis.confidence * 100.0
    );
    if !analysis.matched_terms.is_empty() {
        reason.push_str(": ");
        reason.push_str(&analysis.matched_terms.join(", "));
    }
    reason
}

/// Advice for a category.
pub fn suggestions_for(category: MisuseCategory) -> Vec<String> {
    let suggestions: &[&str] = match category {
        MisuseCategory::HarmfulContent => &[
            "Avoid generating harmful or explicit content",
            "Consider the impact on others",
            "Follow community guidelines and laws",
        ],
        MisuseCategory::DeepfakeImpersonation => &[
            "Avoid impersonating real people without consent",
            "Consider using original photos or artwork instead",
            "Consider the legal and ethical implications",
        ],
        MisuseCategory::PersonalDetails => &[
            "Avoid sharing passwords, card numbers or account details",
            "Remove personal identifiers from your prompt",
            "Use placeholder values instead of real data",
        ],
        MisuseCategory::OtherMisuse => &[
            "Make sure your request is legal and authorized",
            "Rephrase your request to focus on legitimate use",
            "Follow community guidelines and laws",
        ],
        MisuseCategory::None => &[],
    };
    suggestions.iter().map(|s| s.to_string()).collect()
}

/// How the user responded to a flagged prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    /// No response recorded.
    #[default]
    None,
    /// The user acknowledged the alert.
    Acknowledged,
    /// The user rewrote the prompt.
    ModifiedPrompt,
    /// The user sent the prompt anyway.
    ProceededAnyway,
}

impl UserAction {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::None => "none",
            UserAction::Acknowledged => "acknowledged",
            UserAction::ModifiedPrompt => "modified_prompt",
            UserAction::ProceededAnyway => "proceeded_anyway",
        }
    }

    /// Parse from database string. Kebab-case is accepted too.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Some(UserAction::None),
            "acknowledged" => Some(UserAction::Acknowledged),
            "modified_prompt" => Some(UserAction::ModifiedPrompt),
            "proceeded_anyway" => Some(UserAction::ProceededAnyway),
            _ => None,
        }
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
