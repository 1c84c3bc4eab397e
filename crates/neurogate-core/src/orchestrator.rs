//! Debounced, cancellable analysis of live input.
//!
//! Each submission replaces the previous one. A request waits out the quiet
//! period, runs the analyzer on a blocking thread and publishes its outcome
//! only if no newer submission arrived in the meantime.
//!
//! State lives in a [`tokio::sync::watch`] channel. Every update is a
//! read-modify-write closure on the sender, and the request generation is only
//! read or bumped inside those closures.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::classifier::PromptAnalyzer;
use crate::detection::DetectionResult;
use crate::error::{AnalysisError, Result};
use crate::settings::AppSettings;

/// Default quiet period before a submission is analyzed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Receives flagged detections once they are published.
pub trait FlaggedSink: Send + Sync {
    /// Records a flagged detection.
    fn record(&self, result: &DetectionResult) -> Result<()>;
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Quiet period after the last submission.
    pub debounce: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl OrchestratorConfig {
    /// Sets the debounce period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Where the current request is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisPhase {
    /// Nothing pending.
    #[default]
    Idle,
    /// Waiting out the quiet period.
    Debouncing,
    /// The analyzer is running.
    Analyzing,
    /// A result was published.
    Completed,
    /// The analyzer failed.
    Failed,
}

/// Snapshot of the orchestrator state.
#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    /// Lifecycle phase.
    pub phase: AnalysisPhase,
    /// True while the analyzer is running.
    pub is_analyzing: bool,
    /// Most recent published result.
    pub last_result: Option<DetectionResult>,
    /// Most recent failure message.
    pub error: Option<String>,
    /// Whether the caller should show an alert for `last_result`.
    pub show_alert: bool,
    /// Whether the caller should clear the input field.
    pub should_clear_input: bool,
    /// Settings in effect.
    pub settings: AppSettings,
    /// Generation of the latest request. Older requests never publish.
    pub generation: u64,
}

/// Debounces live input and runs analysis for the latest submission only.
///
/// Must be used from within a Tokio runtime.
pub struct AnalysisOrchestrator {
    analyzer: Arc<dyn PromptAnalyzer>,
    sink: Option<Arc<dyn FlaggedSink>>,
    config: OrchestratorConfig,
    state: Arc<watch::Sender<AnalysisState>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AnalysisOrchestrator {
    /// Creates an orchestrator with default settings.
    pub fn new(analyzer: Arc<dyn PromptAnalyzer>, config: OrchestratorConfig) -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self {
            analyzer,
            sink: None,
            config,
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    /// Records flagged detections to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn FlaggedSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Starts with the given settings.
    pub fn with_settings(self, settings: AppSettings) -> Self {
        self.state.send_modify(|state| state.settings = settings);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Submits new input, superseding any pending request.
    ///
    /// Returns `false` without touching state when the input is blank or
    /// real-time detection is disabled.
    pub fn submit(&self, prompt: impl Into<String>) -> bool {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return false;
        }

        // Held across bump and spawn so concurrent submits install tasks in
        // generation order.
        let mut task = self.task.lock();

        let mut generation = 0;
        let accepted = self.state.send_if_modified(|state| {
            if !state.settings.enable_real_time_detection {
                return false;
            }
            state.generation += 1;
            generation = state.generation;
            state.phase = AnalysisPhase::Debouncing;
            state.is_analyzing = false;
            true
        });
        if !accepted {
            debug!("Real-time detection disabled, ignoring input");
            return false;
        }

        debug!(generation, len = prompt.len(), "Input submitted");
        let request = Request {
            generation,
            prompt,
            debounce: self.config.debounce,
            analyzer: Arc::clone(&self.analyzer),
            sink: self.sink.clone(),
            state: Arc::clone(&self.state),
        };
        if let Some(previous) = task.replace(tokio::spawn(request.run())) {
            previous.abort();
        }
        true
    }

    /// Drops the pending request, if any, and returns to idle.
    ///
    /// Returns `true` if a request was pending.
    pub fn cancel(&self) -> bool {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let mut pending = false;
        self.state.send_if_modified(|state| {
            pending = matches!(
                state.phase,
                AnalysisPhase::Debouncing | AnalysisPhase::Analyzing
            );
            if !pending {
                return false;
            }
            state.generation += 1;
            state.phase = AnalysisPhase::Idle;
            state.is_analyzing = false;
            true
        });
        if pending {
            debug!("Pending analysis cancelled");
        }
        pending
    }

    /// Hides the alert for the current result.
    pub fn dismiss_alert(&self) {
        self.state.send_if_modified(|state| {
            std::mem::replace(&mut state.show_alert, false)
        });
    }

    /// Marks the input-clear request as handled.
    pub fn clear_input_handled(&self) {
        self.state.send_if_modified(|state| {
            std::mem::replace(&mut state.should_clear_input, false)
        });
    }

    /// Clears the failure message.
    pub fn clear_error(&self) {
        self.state
            .send_if_modified(|state| state.error.take().is_some());
    }

    /// Acknowledges a finished request and returns to idle.
    ///
    /// The last result is kept. Has no effect while a request is pending.
    pub fn acknowledge(&self) {
        self.state.send_if_modified(|state| {
            if !matches!(
                state.phase,
                AnalysisPhase::Completed | AnalysisPhase::Failed
            ) {
                return false;
            }
            state.phase = AnalysisPhase::Idle;
            state.show_alert = false;
            state.should_clear_input = false;
            state.error = None;
            true
        });
    }

    /// Replaces the settings. Disabling real-time detection cancels any
    /// pending request.
    pub fn update_settings(&self, settings: AppSettings) {
        self.state.send_if_modified(|state| {
            let changed = state.settings != settings;
            state.settings = settings;
            changed
        });
        info!(
            real_time = settings.enable_real_time_detection,
            sensitivity = %settings.sensitivity_level,
            "Settings updated"
        );
        if !settings.enable_real_time_detection {
            self.cancel();
        }
    }

    /// Returns the settings in effect.
    pub fn settings(&self) -> AppSettings {
        self.state.borrow().settings
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }
}

impl Drop for AnalysisOrchestrator {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

/// A single submission travelling through debounce and analysis.
struct Request {
    generation: u64,
    prompt: String,
    debounce: Duration,
    analyzer: Arc<dyn PromptAnalyzer>,
    sink: Option<Arc<dyn FlaggedSink>>,
    state: Arc<watch::Sender<AnalysisState>>,
}

impl Request {
    async fn run(self) {
        tokio::time::sleep(self.debounce).await;

        let Some(settings) = self.begin_analysis() else {
            debug!(generation = self.generation, "Superseded during debounce");
            return;
        };

        let analyzer = Arc::clone(&self.analyzer);
        let prompt = self.prompt.clone();
        let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&prompt, &settings))
            .await
            .unwrap_or_else(|e| Err(AnalysisError::Panicked(panic_message(e))));

        // No await between publish and record, so an abort cannot split them.
        if !self.publish(&outcome) {
            debug!(generation = self.generation, "Superseded during analysis");
            return;
        }

        match outcome {
            Ok(result) if result.is_misuse() => self.record(&result),
            Ok(_) => {}
            Err(e) => warn!(generation = self.generation, error = %e, "Analysis failed"),
        }
    }

    fn begin_analysis(&self) -> Option<AppSettings> {
        let mut settings = None;
        self.state.send_if_modified(|state| {
            if state.generation != self.generation {
                return false;
            }
            state.phase = AnalysisPhase::Analyzing;
            state.is_analyzing = true;
            settings = Some(state.settings);
            true
        });
        settings
    }

    fn publish(&self, outcome: &Result<DetectionResult>) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != self.generation {
                return false;
            }
            state.is_analyzing = false;
            match outcome {
                Ok(result) => {
                    let flagged = result.is_misuse();
                    state.phase = AnalysisPhase::Completed;
                    state.show_alert = flagged && state.settings.show_floating_alerts;
                    state.should_clear_input = flagged && state.settings.auto_clear_input;
                    state.error = None;
                    state.last_result = Some(result.clone());
                    debug!(
                        generation = self.generation,
                        category = %result.category(),
                        confidence = result.confidence(),
                        "Analysis completed"
                    );
                }
                Err(e) => {
                    state.phase = AnalysisPhase::Failed;
                    state.show_alert = false;
                    state.should_clear_input = false;
                    state.error = Some(format!("Analysis failed: {e}"));
                }
            }
            true
        })
    }

    fn record(&self, result: &DetectionResult) {
        let Some(sink) = &self.sink else {
            return;
        };
        match sink.record(result) {
            Ok(()) => info!(category = %result.category(), "Flagged interaction recorded"),
            Err(e) => warn!(error = %e, "Failed to record flagged interaction"),
        }
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
