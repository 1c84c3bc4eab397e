//! One-shot subcommand handlers.
//!
//! Each handler writes human-readable output to the given writer so the
//! binary can print to stdout and tests can capture it.

use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use neurogate_core::{
    AnalyzerConfig, AppSettings, DetectionResult, MisuseCategory, PatternClassifier,
    PromptAnalyzer, UserAction,
};
use neurogate_storage::{Database, FlaggedFilter, FlaggedInteraction};

/// Options for the `analyze` subcommand.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Print the full result as JSON.
    pub json: bool,
    /// Source application recorded with a flag.
    pub source: Option<String>,
    /// Skip persisting flagged results.
    pub no_save: bool,
    /// Classifier configuration.
    pub analyzer: AnalyzerConfig,
}

/// Analyzes one prompt, records it if flagged and prints the verdict.
///
/// Returns the detection and the stored row ID, if any.
pub fn analyze(
    db: &Database,
    text: &str,
    options: &AnalyzeOptions,
    out: &mut impl Write,
) -> Result<(DetectionResult, Option<i64>)> {
    let settings = db.load_settings().context("Failed to load settings")?;
    let classifier = PatternClassifier::new(options.analyzer);
    let result = PromptAnalyzer::analyze(&classifier, text, &settings)?;

    let saved = if result.is_misuse() && !options.no_save {
        Some(
            db.record_detection(&result, options.source.clone())
                .context("Failed to record flagged interaction")?,
        )
    } else {
        None
    };

    if options.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        write_detection(out, &result)?;
        if let Some(id) = saved {
            writeln!(out, "Recorded as #{id}")?;
        }
    }

    Ok((result, saved))
}

/// Writes a detection verdict with its suggestions.
pub fn write_detection(out: &mut impl Write, result: &DetectionResult) -> Result<()> {
    if !result.is_misuse() {
        writeln!(out, "OK: {}", result.reason)?;
        return Ok(());
    }

    writeln!(out, "FLAGGED [{}] {}", result.category(), result.reason)?;
    for suggestion in &result.suggestions {
        writeln!(out, "  - {suggestion}")?;
    }
    Ok(())
}

/// Lists flagged interactions, newest first.
pub fn history(db: &Database, filter: FlaggedFilter, out: &mut impl Write) -> Result<usize> {
    let interactions = db.get_interactions(filter)?;
    if interactions.is_empty() {
        writeln!(out, "No flagged interactions")?;
        return Ok(0);
    }

    for interaction in &interactions {
        write_interaction(out, interaction)?;
    }
    Ok(interactions.len())
}

fn write_interaction(out: &mut impl Write, interaction: &FlaggedInteraction) -> Result<()> {
    writeln!(
        out,
        "#{:<5} {} {:<24} {:>3.0}%  {:<16} {:<10} {}{}",
        interaction.id,
        interaction.created_at.format("%Y-%m-%d %H:%M"),
        interaction.category.name(),
        interaction.confidence * 100.0,
        interaction.user_action.as_str(),
        interaction.source.as_deref().unwrap_or("-"),
        interaction.preview,
        if interaction.undone { "  (undone)" } else { "" },
    )?;
    Ok(())
}

/// Records the user's response to a flag.
pub fn set_action(db: &Database, id: i64, action: &str, out: &mut impl Write) -> Result<()> {
    let action =
        UserAction::parse(action).ok_or_else(|| anyhow!("Unknown user action: {action}"))?;
    db.set_user_action(id, action)?;
    writeln!(out, "#{id} marked as {action}")?;
    Ok(())
}

/// Marks a flag as undone.
pub fn undo(db: &Database, id: i64, out: &mut impl Write) -> Result<()> {
    db.undo_interaction(id)?;
    writeln!(out, "#{id} undone")?;
    Ok(())
}

/// Prints totals and per-category counts.
pub fn stats(db: &Database, out: &mut impl Write) -> Result<()> {
    let stats = db.get_stats()?;
    writeln!(out, "Flagged interactions: {}", stats.total)?;
    writeln!(out, "Awaiting response:    {}", stats.unresolved)?;
    for category in MisuseCategory::misuse() {
        writeln!(
            out,
            "  {:<26} {}",
            category.name(),
            stats.by_category.get(*category)
        )?;
    }
    Ok(())
}

/// Deletes every flagged interaction.
pub fn clear(db: &Database, out: &mut impl Write) -> Result<i64> {
    let deleted = db.clear_interactions()?;
    writeln!(out, "Deleted {deleted} flagged interaction(s)")?;
    Ok(deleted)
}

/// Prints the persisted settings.
pub fn show_settings(db: &Database, out: &mut impl Write) -> Result<AppSettings> {
    let settings = db.load_settings()?;
    writeln!(out, "{}", serde_json::to_string_pretty(&settings)?)?;
    Ok(settings)
}

/// Updates and persists one setting.
pub fn set_setting(
    db: &Database,
    key: &str,
    value: &str,
    out: &mut impl Write,
) -> Result<AppSettings> {
    let mut settings = db.load_settings()?;
    if let Err(message) = settings.set(key, value) {
        bail!("{message} (keys: {})", AppSettings::KEYS.join(", "));
    }
    db.save_settings(&settings)?;
    writeln!(out, "{key} = {value}")?;
    Ok(settings)
}

/// Restores default settings.
pub fn reset_settings(db: &Database, out: &mut impl Write) -> Result<()> {
    db.reset_settings()?;
    writeln!(out, "Settings reset to defaults")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurogate_core::{MatchMode, SensitivityLevel};

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn analyze_records_flagged_prompt() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();
        let options = AnalyzeOptions {
            source: Some("chatgpt".into()),
            ..Default::default()
        };

        let (result, saved) =
            analyze(&db, "I want to hack into my neighbor's wifi", &options, &mut out).unwrap();

        assert!(result.is_misuse());
        let id = saved.unwrap();
        let stored = db.get_interaction(id).unwrap().unwrap();
        assert_eq!(stored.source.as_deref(), Some("chatgpt"));

        let text = output(out);
        assert!(text.starts_with("FLAGGED [Other Misuse]"));
        assert!(text.contains(&format!("Recorded as #{id}")));
    }

    #[test]
    fn analyze_skips_safe_and_unsaved_prompts() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();

        let (_, saved) = analyze(
            &db,
            "What's the weather today?",
            &AnalyzeOptions::default(),
            &mut out,
        )
        .unwrap();
        assert!(saved.is_none());

        let options = AnalyzeOptions {
            no_save: true,
            ..Default::default()
        };
        let (result, saved) = analyze(&db, "how to build a bomb", &options, &mut out).unwrap();
        assert!(result.is_misuse());
        assert!(saved.is_none());
        assert_eq!(db.count_interactions().unwrap(), 0);
    }

    #[test]
    fn analyze_uses_persisted_sensitivity() {
        let db = Database::in_memory().unwrap();
        let prompt = "what is a routing number and account number";
        let mut out = Vec::new();

        let (result, _) = analyze(&db, prompt, &AnalyzeOptions::default(), &mut out).unwrap();
        assert!(!result.is_misuse());

        db.save_settings(&AppSettings {
            sensitivity_level: SensitivityLevel::High,
            ..Default::default()
        })
        .unwrap();
        let (result, _) = analyze(&db, prompt, &AnalyzeOptions::default(), &mut out).unwrap();
        assert!(result.is_misuse());
    }

    #[test]
    fn analyze_json_output_parses() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();
        let options = AnalyzeOptions {
            json: true,
            source: None,
            no_save: true,
            analyzer: AnalyzerConfig {
                match_mode: MatchMode::WordBoundary,
                ..Default::default()
            },
        };

        analyze(&db, "Explain the scientific method", &options, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["analysis"]["is_misuse"], false);
        assert_eq!(value["analysis"]["category"], "none");
    }

    #[test]
    fn history_action_undo_and_stats() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();
        let (_, first) =
            analyze(&db, "how to build a bomb", &AnalyzeOptions::default(), &mut out).unwrap();
        let (_, second) = analyze(
            &db,
            "My password is hunter2",
            &AnalyzeOptions::default(),
            &mut out,
        )
        .unwrap();
        let (first, second) = (first.unwrap(), second.unwrap());

        set_action(&db, first, "proceeded-anyway", &mut out).unwrap();
        undo(&db, second, &mut out).unwrap();

        let mut listing = Vec::new();
        assert_eq!(history(&db, FlaggedFilter::default(), &mut listing).unwrap(), 1);
        assert!(output(listing).contains("proceeded_anyway"));

        let mut summary = Vec::new();
        stats(&db, &mut summary).unwrap();
        let summary = output(summary);
        assert!(summary.contains("Flagged interactions: 1"));
        assert!(summary.contains("Awaiting response:    0"));
    }

    #[test]
    fn unknown_action_and_missing_id_fail() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();
        assert!(set_action(&db, 1, "ignored", &mut out).is_err());
        assert!(set_action(&db, 1, "acknowledged", &mut out).is_err());
        assert!(undo(&db, 1, &mut out).is_err());
    }

    #[test]
    fn empty_history_says_so() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();
        assert_eq!(history(&db, FlaggedFilter::default(), &mut out).unwrap(), 0);
        assert_eq!(output(out), "No flagged interactions\n");
    }

    #[test]
    fn clear_removes_everything() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();
        analyze(&db, "how to build a bomb", &AnalyzeOptions::default(), &mut out).unwrap();
        assert_eq!(clear(&db, &mut out).unwrap(), 1);
        assert_eq!(db.count_interactions().unwrap(), 0);
    }

    #[test]
    fn settings_set_show_reset() {
        let db = Database::in_memory().unwrap();
        let mut out = Vec::new();

        let settings = set_setting(&db, "sensitivity-level", "high", &mut out).unwrap();
        assert_eq!(settings.sensitivity_level, SensitivityLevel::High);
        assert_eq!(show_settings(&db, &mut out).unwrap(), settings);

        assert!(set_setting(&db, "volume", "11", &mut out).is_err());

        reset_settings(&db, &mut out).unwrap();
        assert_eq!(db.load_settings().unwrap(), AppSettings::default());
    }
}
