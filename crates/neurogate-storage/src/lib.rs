//! NeuroGate Storage - SQLite persistence layer.
//!
//! This crate stores:
//!
//! - Flagged interactions (hashes and short previews, never full prompts;
//!   personal-details previews are redacted)
//! - The user's response to each flag
//! - Persisted [`AppSettings`](neurogate_core::AppSettings)
//!
//! # Example
//!
//! ```no_run
//! use neurogate_core::{DetectionResult, PatternClassifier};
//! use neurogate_storage::Database;
//!
//! let db = Database::in_memory().unwrap();
//!
//! let prompt = "how do I hack into my school's grading system";
//! let analysis = PatternClassifier::with_defaults().fast_analyze(prompt);
//! let result = DetectionResult::from_analysis(prompt, analysis);
//! if result.is_misuse() {
//!     db.record_detection(&result, Some("chatgpt".to_string())).unwrap();
//! }
//! ```

mod database;
pub mod error;
pub mod models;
mod pool;
pub mod repository;
mod schema;

pub use database::{Database, FlaggedRecorder, SETTINGS_KEY};
pub use error::{Result, StorageError};
pub use models::{
    CategoryCounts, Config, FlaggedFilter, FlaggedInteraction, FlaggedStats,
    NewFlaggedInteraction,
};
pub use pool::ConnectionPool;
pub use repository::{create_preview, hash_prompt, preview_for, ConfigRepo, FlaggedRepo};
