//! NeuroGate Core - Misuse classification and live analysis.
//!
//! This crate flags prompts headed for AI assistants as harmful content,
//! deepfake or impersonation requests, personal data leaks or other misuse,
//! and debounces live input so only the latest text is analyzed.

pub mod classifier;
pub mod detection;
pub mod error;
pub mod orchestrator;
pub mod settings;

pub use classifier::{
    AnalyzerConfig, CategoryScores, FastPathScoring, MatchMode, MisuseCategory,
    PatternAnalysisResult, PatternClassifier, PromptAnalyzer,
};
pub use detection::{DetectionResult, UserAction};
pub use error::{AnalysisError, Result, SettingsError};
pub use orchestrator::{
    AnalysisOrchestrator, AnalysisPhase, AnalysisState, FlaggedSink, OrchestratorConfig,
    DEFAULT_DEBOUNCE,
};
pub use settings::{AppSettings, SensitivityLevel};
