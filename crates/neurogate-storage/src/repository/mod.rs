//! Database repositories for each table.

pub mod config;
pub mod flagged;

pub use config::ConfigRepo;
pub use flagged::{create_preview, hash_prompt, preview_for, FlaggedRepo};
