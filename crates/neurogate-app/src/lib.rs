//! NeuroGate command-line front end.
//!
//! - [`commands`]: one-shot subcommands over the flagged-interaction store
//! - [`watch`]: debounced live analysis of line-based input

pub mod commands;
pub mod watch;
