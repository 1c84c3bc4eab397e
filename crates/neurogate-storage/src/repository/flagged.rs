//! Flagged interactions repository.

use chrono::{DateTime, SecondsFormat, Utc};
use neurogate_core::{MisuseCategory, UserAction};
use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{
    CategoryCounts, FlaggedFilter, FlaggedInteraction, FlaggedStats, NewFlaggedInteraction,
};

/// Maximum preview length in characters.
const PREVIEW_MAX_LEN: usize = 80;

const SELECT_COLUMNS: &str = "SELECT id, prompt_hash, preview, category, confidence, reason,
        matched_terms, source, user_action, undone, created_at
 FROM flagged_interactions";

/// Repository for flagged interaction operations.
pub struct FlaggedRepo;

impl FlaggedRepo {
    /// Insert a new flagged interaction.
    pub fn insert(conn: &Connection, interaction: NewFlaggedInteraction) -> Result<i64> {
        let matched_terms = serde_json::to_string(&interaction.matched_terms)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        conn.execute(
            "INSERT INTO flagged_interactions
                (prompt_hash, preview, category, confidence, reason, matched_terms, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                interaction.prompt_hash,
                interaction.preview,
                interaction.category.as_str(),
                interaction.confidence,
                interaction.reason,
                matched_terms,
                interaction.source,
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a flagged interaction by ID.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<FlaggedInteraction>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let interaction = conn.query_row(&sql, [id], row_to_interaction).optional()?;
        Ok(interaction)
    }

    /// Get flagged interactions with filtering, newest first.
    pub fn get_filtered(
        conn: &Connection,
        filter: FlaggedFilter,
    ) -> Result<Vec<FlaggedInteraction>> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = filter.category {
            sql.push_str(" AND category = ?");
            params_vec.push(Box::new(category.as_str()));
        }

        if let Some(source) = filter.source {
            sql.push_str(" AND source = ?");
            params_vec.push(Box::new(source));
        }

        if let Some(action) = filter.user_action {
            sql.push_str(" AND user_action = ?");
            params_vec.push(Box::new(action.as_str()));
        }

        if !filter.include_undone {
            sql.push_str(" AND undone = 0");
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        if filter.limit.is_some() || filter.offset.is_some() {
            sql.push_str(" LIMIT ?");
            params_vec.push(Box::new(filter.limit.unwrap_or(-1)));
        }

        if let Some(offset) = filter.offset {
            sql.push_str(" OFFSET ?");
            params_vec.push(Box::new(offset));
        }

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let interactions = stmt
            .query_map(params_refs.as_slice(), row_to_interaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(interactions)
    }

    /// Get recent flagged interactions with pagination.
    pub fn get_recent(
        conn: &Connection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FlaggedInteraction>> {
        Self::get_filtered(
            conn,
            FlaggedFilter {
                limit: Some(limit),
                offset: Some(offset),
                ..Default::default()
            },
        )
    }

    /// Record how the user responded. Returns false if the ID does not exist.
    pub fn update_user_action(conn: &Connection, id: i64, action: UserAction) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE flagged_interactions SET user_action = ?1 WHERE id = ?2",
            params![action.as_str(), id],
        )?;
        Ok(updated > 0)
    }

    /// Mark an interaction as undone. Returns false if the ID does not exist.
    pub fn mark_undone(conn: &Connection, id: i64) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE flagged_interactions SET undone = 1 WHERE id = ?1",
            [id],
        )?;
        Ok(updated > 0)
    }

    /// Delete a flagged interaction.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM flagged_interactions WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Delete every flagged interaction. Returns the number removed.
    pub fn clear(conn: &Connection) -> Result<i64> {
        let deleted = conn.execute("DELETE FROM flagged_interactions", [])?;
        Ok(deleted as i64)
    }

    /// Count all flagged interactions, undone included.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM flagged_interactions",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get statistics, excluding undone interactions.
    pub fn get_stats(conn: &Connection) -> Result<FlaggedStats> {
        let (total, unresolved): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(user_action = 'none'), 0)
             FROM flagged_interactions WHERE undone = 0",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM flagged_interactions
             WHERE undone = 0 GROUP BY category",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut by_category = CategoryCounts::default();
        for row in rows {
            let (category, count) = row?;
            if let Some(category) = MisuseCategory::parse(&category) {
                by_category.add(category, count);
            }
        }

        Ok(FlaggedStats {
            total,
            unresolved,
            by_category,
        })
    }
}

fn row_to_interaction(row: &Row<'_>) -> rusqlite::Result<FlaggedInteraction> {
    Ok(FlaggedInteraction {
        id: row.get(0)?,
        prompt_hash: row.get(1)?,
        preview: row.get(2)?,
        category: MisuseCategory::parse(&row.get::<_, String>(3)?)
            .unwrap_or(MisuseCategory::OtherMisuse),
        confidence: row.get(4)?,
        reason: row.get(5)?,
        matched_terms: parse_json_array(&row.get::<_, String>(6)?),
        source: row.get(7)?,
        user_action: UserAction::parse(&row.get::<_, String>(8)?).unwrap_or_default(),
        undone: row.get::<_, i64>(9)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

/// Hash a prompt for storage.
pub fn hash_prompt(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}

/// Create a preview from a prompt (truncated, control characters replaced by spaces).
pub fn create_preview(prompt: &str) -> String {
    let mut chars = prompt
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c });
    let cleaned: String = chars.by_ref().take(PREVIEW_MAX_LEN).collect();

    if chars.next().is_some() {
        format!("{cleaned}...")
    } else {
        cleaned
    }
}

/// Preview stored for a flagged prompt. Personal details are never stored,
/// only their length.
pub fn preview_for(prompt: &str, category: MisuseCategory) -> String {
    match category {
        MisuseCategory::PersonalDetails => {
            format!("[personal details redacted, {} chars]", prompt.chars().count())
        }
        _ => create_preview(prompt),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| Utc::now())
}
