//! NeuroGate - flags prompts that misuse AI assistants.
//!
//! Analyzes prompts one at a time or live from standard input, records
//! flagged interactions and manages detection settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use neurogate_app::commands::{self, AnalyzeOptions};
use neurogate_app::watch::run_watch;
use neurogate_core::{
    AnalysisOrchestrator, AnalyzerConfig, MatchMode, MisuseCategory, OrchestratorConfig,
    PatternClassifier, DEFAULT_DEBOUNCE,
};
use neurogate_storage::{Database, FlaggedFilter};
use tokio::io::BufReader;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// NeuroGate - misuse detection for AI prompts
#[derive(Parser, Debug)]
#[command(name = "neurogate", version, about)]
struct Cli {
    /// Database file (defaults to the app data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a single prompt
    Analyze {
        /// Prompt text
        text: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Source application recorded with a flag
        #[arg(long)]
        source: Option<String>,

        /// Do not record flagged results
        #[arg(long)]
        no_save: bool,

        /// Match terms on word boundaries only
        #[arg(long)]
        word_boundary: bool,
    },

    /// Analyze standard input live, one line per revision
    Watch {
        /// Quiet period before a revision is analyzed
        #[arg(long, default_value_t = DEFAULT_DEBOUNCE.as_millis() as u64)]
        debounce_ms: u64,

        /// Source application recorded with a flag
        #[arg(long)]
        source: Option<String>,

        /// Match terms on word boundaries only
        #[arg(long)]
        word_boundary: bool,
    },

    /// List flagged interactions
    History {
        /// Maximum number of entries
        #[arg(long, default_value_t = 20)]
        limit: i64,

        /// Only this category (e.g. harmful_content)
        #[arg(long)]
        category: Option<String>,

        /// Only this source application
        #[arg(long)]
        source: Option<String>,

        /// Include undone interactions
        #[arg(long)]
        all: bool,
    },

    /// Record the response to a flag
    Action {
        /// Interaction ID
        id: i64,

        /// none, acknowledged, modified-prompt or proceeded-anyway
        action: String,
    },

    /// Mark a flag as undone
    Undo {
        /// Interaction ID
        id: i64,
    },

    /// Show flag statistics
    Stats,

    /// Delete all flagged interactions
    Clear,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommand>,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// Restore defaults
    Reset,
}

/// Get the logs directory path.
fn logs_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "neurogate", "neurogate").map(|dirs| dirs.data_dir().join("logs"))
}

/// Initialize logging with file output.
/// Returns a guard that must be kept alive for the duration of the program.
fn init_logging(cli: &Cli) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_level = if cli.debug { "debug" } else { &cli.log_level };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("neurogate={},warn", log_level)));

    if let Some(log_dir) = logs_dir() {
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(5)
                .filename_prefix("neurogate")
                .filename_suffix("log")
                .build(&log_dir)
                .ok();

            if let Some(appender) = file_appender {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);

                // Stdout carries command output, so console logs go to stderr.
                if cli.debug {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(std::io::stderr))
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                } else {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                }

                tracing::debug!("Logging to {:?}", log_dir);
                return Some(guard);
            }
        }
    }

    // Fallback: console logging only
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::warn!("File logging unavailable, using console only");
    None
}

fn analyzer_config(word_boundary: bool) -> AnalyzerConfig {
    AnalyzerConfig {
        match_mode: if word_boundary {
            MatchMode::WordBoundary
        } else {
            MatchMode::Substring
        },
        ..Default::default()
    }
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::with_path(path),
        None => Database::new(),
    };
    db.map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep guard alive for the duration of the program
    let _log_guard = init_logging(&cli);
    tracing::debug!("Args: {:?}", cli);

    let db = open_database(cli.db.clone())?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Analyze {
            text,
            json,
            source,
            no_save,
            word_boundary,
        } => {
            let options = AnalyzeOptions {
                json,
                source,
                no_save,
                analyzer: analyzer_config(word_boundary),
            };
            commands::analyze(&db, &text, &options, &mut out)?;
        }
        Commands::Watch {
            debounce_ms,
            source,
            word_boundary,
        } => {
            let settings = db.load_settings().context("Failed to load settings")?;
            let classifier = PatternClassifier::new(analyzer_config(word_boundary));
            let orchestrator = AnalysisOrchestrator::new(
                Arc::new(classifier),
                OrchestratorConfig::default().with_debounce(Duration::from_millis(debounce_ms)),
            )
            .with_settings(settings)
            .with_sink(Arc::new(db.recorder(source)));

            tracing::info!(debounce_ms, "Watching standard input");
            let stdin = BufReader::new(tokio::io::stdin());
            let summary = run_watch(&orchestrator, stdin, &mut out).await?;
            tracing::info!(
                submitted = summary.submitted,
                completed = summary.completed,
                flagged = summary.flagged,
                failed = summary.failed,
                "Watch finished"
            );
        }
        Commands::History {
            limit,
            category,
            source,
            all,
        } => {
            let category = category
                .map(|name| {
                    MisuseCategory::parse(&name)
                        .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", name))
                })
                .transpose()?;
            let filter = FlaggedFilter {
                category,
                source,
                include_undone: all,
                limit: Some(limit),
                ..Default::default()
            };
            commands::history(&db, filter, &mut out)?;
        }
        Commands::Action { id, action } => commands::set_action(&db, id, &action, &mut out)?,
        Commands::Undo { id } => commands::undo(&db, id, &mut out)?,
        Commands::Stats => commands::stats(&db, &mut out)?,
        Commands::Clear => {
            commands::clear(&db, &mut out)?;
        }
        Commands::Settings { command } => match command.unwrap_or(SettingsCommand::Show) {
            SettingsCommand::Show => {
                commands::show_settings(&db, &mut out)?;
            }
            SettingsCommand::Set { key, value } => {
                commands::set_setting(&db, &key, &value, &mut out)?;
            }
            SettingsCommand::Reset => commands::reset_settings(&db, &mut out)?,
        },
    }

    Ok(())
}
