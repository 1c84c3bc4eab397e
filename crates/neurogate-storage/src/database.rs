//! High-level database interface.

use std::path::PathBuf;

use directories::ProjectDirs;
use neurogate_core::{AnalysisError, AppSettings, DetectionResult, FlaggedSink, UserAction};
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::models::{
    Config, FlaggedFilter, FlaggedInteraction, FlaggedStats, NewFlaggedInteraction,
};
use crate::pool::ConnectionPool;
use crate::repository::{hash_prompt, preview_for, ConfigRepo, FlaggedRepo};

/// Config key holding the persisted [`AppSettings`].
pub const SETTINGS_KEY: &str = "app_settings";

/// High-level database interface for NeuroGate.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Create a new database in the default app data directory.
    pub fn new() -> Result<Self> {
        Self::with_path(Self::default_db_path()?)
    }

    /// Create a new database at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let pool = ConnectionPool::in_memory()?;
        Ok(Self { pool })
    }

    /// Get the default database path.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "neurogate", "neurogate")
            .ok_or_else(|| StorageError::Config("Could not determine app data directory".into()))?;

        Ok(proj_dirs.data_dir().join("neurogate.db"))
    }

    // === Flagged interactions ===

    /// Record a flagged detection. Only the hash and a preview of the prompt
    /// are stored, and personal-details previews are redacted.
    pub fn record_detection(
        &self,
        result: &DetectionResult,
        source: Option<String>,
    ) -> Result<i64> {
        let conn = self.pool.get()?;

        let interaction = NewFlaggedInteraction {
            prompt_hash: hash_prompt(&result.prompt),
            preview: preview_for(&result.prompt, result.category()),
            category: result.category(),
            confidence: result.confidence(),
            reason: result.reason.clone(),
            matched_terms: result.analysis.matched_terms.clone(),
            source,
        };

        let id = FlaggedRepo::insert(&conn, interaction)?;
        debug!(id, category = %result.category(), "Recorded flagged interaction");
        Ok(id)
    }

    /// Get a flagged interaction by ID.
    pub fn get_interaction(&self, id: i64) -> Result<Option<FlaggedInteraction>> {
        let conn = self.pool.get()?;
        FlaggedRepo::get_by_id(&conn, id)
    }

    /// Get flagged interactions matching a filter.
    pub fn get_interactions(&self, filter: FlaggedFilter) -> Result<Vec<FlaggedInteraction>> {
        let conn = self.pool.get()?;
        FlaggedRepo::get_filtered(&conn, filter)
    }

    /// Get recent flagged interactions.
    pub fn get_recent_interactions(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlaggedInteraction>> {
        let conn = self.pool.get()?;
        FlaggedRepo::get_recent(&conn, limit, offset)
    }

    /// Record how the user responded to a flagged interaction.
    pub fn set_user_action(&self, id: i64, action: UserAction) -> Result<()> {
        let conn = self.pool.get()?;
        if !FlaggedRepo::update_user_action(&conn, id, action)? {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    /// Mark a flagged interaction as undone.
    pub fn undo_interaction(&self, id: i64) -> Result<()> {
        let conn = self.pool.get()?;
        if !FlaggedRepo::mark_undone(&conn, id)? {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    /// Delete a flagged interaction.
    pub fn delete_interaction(&self, id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        FlaggedRepo::delete(&conn, id)
    }

    /// Delete all flagged interactions.
    pub fn clear_interactions(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let deleted = FlaggedRepo::clear(&conn)?;
        info!(deleted, "Cleared flagged interactions");
        Ok(deleted)
    }

    /// Count all flagged interactions.
    pub fn count_interactions(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        FlaggedRepo::count(&conn)
    }

    /// Get flagged interaction statistics.
    pub fn get_stats(&self) -> Result<FlaggedStats> {
        let conn = self.pool.get()?;
        FlaggedRepo::get_stats(&conn)
    }

    /// Returns a sink that records flagged detections under `source`.
    pub fn recorder(&self, source: Option<String>) -> FlaggedRecorder {
        FlaggedRecorder {
            db: self.clone(),
            source,
        }
    }

    // === Config ===

    /// Get a configuration value.
    pub fn get_config(&self, key: &str) -> Result<Option<Config>> {
        let conn = self.pool.get()?;
        ConfigRepo::get(&conn, key)
    }

    /// Set a configuration value.
    pub fn set_config(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.pool.get()?;
        ConfigRepo::set(&conn, key, value)
    }

    /// Load the persisted settings, or defaults if none are stored.
    pub fn load_settings(&self) -> Result<AppSettings> {
        let conn = self.pool.get()?;
        ConfigRepo::get_or_default(&conn, SETTINGS_KEY, AppSettings::default())
    }

    /// Persist settings.
    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let conn = self.pool.get()?;
        ConfigRepo::set(&conn, SETTINGS_KEY, &serde_json::to_value(settings)?)
    }

    /// Remove persisted settings so defaults apply.
    pub fn reset_settings(&self) -> Result<()> {
        let conn = self.pool.get()?;
        ConfigRepo::delete(&conn, SETTINGS_KEY)?;
        Ok(())
    }
}

/// Records flagged detections from the analysis orchestrator.
#[derive(Clone)]
pub struct FlaggedRecorder {
    db: Database,
    source: Option<String>,
}

impl FlaggedSink for FlaggedRecorder {
    fn record(&self, result: &DetectionResult) -> neurogate_core::Result<()> {
        self.db
            .record_detection(result, self.source.clone())
            .map(|_| ())
            .map_err(|e| AnalysisError::Sink(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurogate_core::{MisuseCategory, PatternClassifier, SensitivityLevel};

    fn detect(prompt: &str) -> DetectionResult {
        let analysis = PatternClassifier::with_defaults().fast_analyze(prompt);
        DetectionResult::from_analysis(prompt, analysis)
    }

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.count_interactions().unwrap(), 0);
    }

    #[test]
    fn test_record_detection_stores_hash_not_prompt() {
        let db = Database::in_memory().unwrap();
        let prompt = "My password is hunter2 and I live at 4 Elm Road, please remember it";
        let result = detect(prompt);

        let id = db.record_detection(&result, Some("chatgpt".into())).unwrap();
        let stored = db.get_interaction(id).unwrap().unwrap();

        assert_eq!(stored.prompt_hash, hash_prompt(prompt));
        assert!(!stored.preview.contains("hunter2"));
        assert!(stored.preview.starts_with("[personal details redacted"));
        assert_eq!(stored.category, MisuseCategory::PersonalDetails);
        assert_eq!(stored.reason, result.reason);
        assert_eq!(stored.matched_terms, result.analysis.matched_terms);
        assert_eq!(stored.source.as_deref(), Some("chatgpt"));
    }

    #[test]
    fn test_user_action_and_undo() {
        let db = Database::in_memory().unwrap();
        let id = db.record_detection(&detect("how to build a bomb"), None).unwrap();

        db.set_user_action(id, UserAction::ModifiedPrompt).unwrap();
        assert_eq!(
            db.get_interaction(id).unwrap().unwrap().user_action,
            UserAction::ModifiedPrompt
        );

        db.undo_interaction(id).unwrap();
        assert!(db.get_interaction(id).unwrap().unwrap().undone);
        assert_eq!(db.get_stats().unwrap().total, 0);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.set_user_action(7, UserAction::Acknowledged),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(db.undo_interaction(7), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_settings_persist() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.load_settings().unwrap(), AppSettings::default());

        let settings = AppSettings {
            sensitivity_level: SensitivityLevel::Low,
            show_floating_alerts: false,
            ..Default::default()
        };
        db.save_settings(&settings).unwrap();
        assert_eq!(db.load_settings().unwrap(), settings);

        db.reset_settings().unwrap();
        assert_eq!(db.load_settings().unwrap(), AppSettings::default());
    }

    #[test]
    fn test_recorder_sink() {
        let db = Database::in_memory().unwrap();
        let recorder = db.recorder(Some("gemini".into()));

        recorder.record(&detect("Swap my face onto a celebrity")).unwrap();

        let recent = db.get_recent_interactions(10, 0).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].source.as_deref(), Some("gemini"));
        assert_eq!(recent[0].category, MisuseCategory::DeepfakeImpersonation);
    }

    #[test]
    fn test_file_database_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("neurogate.db");

        {
            let db = Database::with_path(&path).unwrap();
            db.record_detection(&detect("how to build a bomb"), None).unwrap();
        }

        let db = Database::with_path(&path).unwrap();
        assert_eq!(db.count_interactions().unwrap(), 1);
        assert_eq!(db.clear_interactions().unwrap(), 1);
    }
}
