//! Database schema.
//!
//! Tables are created idempotently when a connection is opened. There is a
//! single schema version and no upgrade path.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Creates all tables and indexes if they do not exist.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS flagged_interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            prompt_hash TEXT NOT NULL,
            preview TEXT NOT NULL,
            category TEXT NOT NULL,
            confidence REAL NOT NULL,
            reason TEXT NOT NULL,
            matched_terms TEXT NOT NULL DEFAULT '[]',
            source TEXT,
            user_action TEXT NOT NULL DEFAULT 'none',
            undone INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_flagged_created_at ON flagged_interactions(created_at);
        CREATE INDEX IF NOT EXISTS idx_flagged_category ON flagged_interactions(category);
        CREATE INDEX IF NOT EXISTS idx_flagged_source ON flagged_interactions(source);
        "#,
    )?;

    debug!("Schema ready");
    Ok(())
}
