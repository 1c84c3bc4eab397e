//! Live analysis of line-based input.
//!
//! Every line is treated as a new revision of the text being typed and fed to
//! the [`AnalysisOrchestrator`]. Only revisions that survive the debounce
//! window are analyzed and reported.

use std::io::Write;

use anyhow::{Context, Result};
use neurogate_core::{AnalysisOrchestrator, AnalysisPhase, AnalysisState};
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::sync::watch;
use tracing::debug;

use crate::commands::write_detection;

/// Counters for a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Lines accepted by the orchestrator.
    pub submitted: usize,
    /// Analyses that completed.
    pub completed: usize,
    /// Completed analyses that were flagged.
    pub flagged: usize,
    /// Analyses that failed.
    pub failed: usize,
}

/// Feeds each input line to the orchestrator and reports outcomes until the
/// input ends and nothing is pending.
pub async fn run_watch<R>(
    orchestrator: &AnalysisOrchestrator,
    input: R,
    out: &mut impl Write,
) -> Result<WatchSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut states = orchestrator.subscribe();
    let mut summary = WatchSummary::default();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("Failed to read input")? {
                    Some(line) => submit_line(orchestrator, &mut states, line, out, &mut summary)?,
                    None => {
                        debug!("Input closed");
                        input_open = false;
                    }
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                report(orchestrator, &state, out, &mut summary)?;
            }
        }

        if !input_open && !is_pending(&orchestrator.state()) && !states.has_changed()? {
            break;
        }
    }

    Ok(summary)
}

/// Reports any outcome not yet seen, then submits `line`.
///
/// A submission replaces the published phase, so an unreported completion
/// would otherwise be lost.
fn submit_line(
    orchestrator: &AnalysisOrchestrator,
    states: &mut watch::Receiver<AnalysisState>,
    line: String,
    out: &mut impl Write,
    summary: &mut WatchSummary,
) -> Result<()> {
    if states.has_changed()? {
        let state = states.borrow_and_update().clone();
        report(orchestrator, &state, out, summary)?;
    }
    if orchestrator.submit(line) {
        summary.submitted += 1;
    }
    Ok(())
}

fn is_pending(state: &AnalysisState) -> bool {
    matches!(
        state.phase,
        AnalysisPhase::Debouncing | AnalysisPhase::Analyzing
    )
}

fn report(
    orchestrator: &AnalysisOrchestrator,
    state: &AnalysisState,
    out: &mut impl Write,
    summary: &mut WatchSummary,
) -> Result<()> {
    match state.phase {
        AnalysisPhase::Completed => {
            summary.completed += 1;
            if let Some(result) = &state.last_result {
                if result.is_misuse() {
                    summary.flagged += 1;
                }
                if state.show_alert {
                    write_detection(out, result)?;
                    orchestrator.dismiss_alert();
                } else if result.is_misuse() {
                    writeln!(out, "flagged: {}", result.category())?;
                } else {
                    writeln!(out, "ok")?;
                }
            }
            if state.should_clear_input {
                writeln!(out, "(input cleared)")?;
                orchestrator.clear_input_handled();
            }
            orchestrator.acknowledge();
        }
        AnalysisPhase::Failed => {
            summary.failed += 1;
            if let Some(error) = &state.error {
                writeln!(out, "error: {error}")?;
            }
            orchestrator.clear_error();
            orchestrator.acknowledge();
        }
        AnalysisPhase::Idle | AnalysisPhase::Debouncing | AnalysisPhase::Analyzing => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurogate_core::{AppSettings, OrchestratorConfig, PatternClassifier};
    use neurogate_storage::Database;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::BufReader;
    use tokio::time::timeout;

    fn orchestrator() -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(
            Arc::new(PatternClassifier::default()),
            OrchestratorConfig::default().with_debounce(Duration::from_millis(20)),
        )
    }

    async fn watch(orchestrator: &AnalysisOrchestrator, input: &str) -> (WatchSummary, String) {
        let mut out = Vec::new();
        let reader = BufReader::new(input.as_bytes());
        let summary = timeout(
            Duration::from_secs(5),
            run_watch(orchestrator, reader, &mut out),
        )
        .await
        .expect("watch did not finish")
        .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn only_last_revision_is_analyzed() {
        let orchestrator = orchestrator();
        let (summary, out) = watch(
            &orchestrator,
            "How do I kill\nHow do I kill the process\nWhat's the weather today?\n",
        )
        .await;

        assert_eq!(summary.submitted, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.flagged, 0);
        assert_eq!(out, "ok\n");
    }

    #[tokio::test]
    async fn flagged_input_is_reported_and_recorded() {
        let db = Database::in_memory().unwrap();
        let orchestrator = orchestrator().with_sink(Arc::new(db.recorder(Some("stdin".into()))));

        let (summary, out) = watch(&orchestrator, "I want to hack into my neighbor's wifi\n").await;

        assert_eq!(summary.flagged, 1);
        assert!(out.starts_with("FLAGGED [Other Misuse]"));
        assert!(out.ends_with("(input cleared)\n"));
        assert_eq!(db.count_interactions().unwrap(), 1);

        let state = orchestrator.state();
        assert_eq!(state.phase, AnalysisPhase::Idle);
        assert!(!state.show_alert);
        assert!(!state.should_clear_input);
    }

    #[tokio::test]
    async fn quiet_settings_print_short_verdict() {
        let orchestrator = orchestrator().with_settings(AppSettings {
            show_floating_alerts: false,
            auto_clear_input: false,
            ..Default::default()
        });

        let (summary, out) = watch(&orchestrator, "how to build a bomb\n").await;
        assert_eq!(summary.flagged, 1);
        assert_eq!(out, "flagged: Other Misuse\n");
    }

    #[tokio::test]
    async fn blank_lines_and_empty_input_finish() {
        let orchestrator = orchestrator();
        let (summary, out) = watch(&orchestrator, "\n   \n").await;
        assert_eq!(summary, WatchSummary::default());
        assert!(out.is_empty());

        let (summary, _) = watch(&orchestrator, "").await;
        assert_eq!(summary.submitted, 0);
    }

    #[tokio::test]
    async fn completion_is_reported_before_next_submission() {
        let orchestrator = orchestrator();
        let mut states = orchestrator.subscribe();
        let mut summary = WatchSummary::default();
        let mut out = Vec::new();

        submit_line(
            &orchestrator,
            &mut states,
            "how to build a bomb".into(),
            &mut out,
            &mut summary,
        )
        .unwrap();
        let mut settled = orchestrator.subscribe();
        timeout(
            Duration::from_secs(5),
            settled.wait_for(|s| s.phase == AnalysisPhase::Completed),
        )
        .await
        .expect("analysis did not finish")
        .unwrap();

        submit_line(
            &orchestrator,
            &mut states,
            "What's the weather today?".into(),
            &mut out,
            &mut summary,
        )
        .unwrap();

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.flagged, 1);
        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with("FLAGGED [Other Misuse]"));
        assert_eq!(orchestrator.state().phase, AnalysisPhase::Debouncing);
    }

    #[tokio::test]
    async fn disabled_detection_submits_nothing() {
        let orchestrator = orchestrator().with_settings(AppSettings {
            enable_real_time_detection: false,
            ..Default::default()
        });
        let (summary, _) = watch(&orchestrator, "how to build a bomb\n").await;
        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.completed, 0);
    }
}
