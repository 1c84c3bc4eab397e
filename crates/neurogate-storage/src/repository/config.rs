//! Configuration repository.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Result;
use crate::models::Config;

/// Repository for configuration operations.
pub struct ConfigRepo;

impl ConfigRepo {
    /// Get a configuration value.
    pub fn get(conn: &Connection, key: &str) -> Result<Option<Config>> {
        let row = conn
            .query_row(
                "SELECT key, value FROM config WHERE key = ?1",
                [key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        match row {
            Some((key, value)) => Ok(Some(Config {
                key,
                value: serde_json::from_str(&value)?,
            })),
            None => Ok(None),
        }
    }

    /// Set a configuration value (insert or update).
    pub fn set(conn: &Connection, key: &str, value: &serde_json::Value) -> Result<()> {
        let value_json = serde_json::to_string(value)?;

        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value_json],
        )?;

        Ok(())
    }

    /// Delete a configuration value.
    pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    /// Get a typed configuration value, falling back to `default` when the
    /// key is missing or holds an incompatible value.
    pub fn get_or_default<T: DeserializeOwned>(
        conn: &Connection,
        key: &str,
        default: T,
    ) -> Result<T> {
        match Self::get(conn, key)? {
            Some(config) => match serde_json::from_value(config.value) {
                Ok(value) => Ok(value),
                Err(e) => {
                    warn!(key, error = %e, "Stored config is invalid, using default");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;
    use neurogate_core::{AppSettings, SensitivityLevel};
    use serde_json::json;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_set_and_get() {
        let conn = setup_db();

        ConfigRepo::set(&conn, "test_key", &json!("test_value")).unwrap();
        let config = ConfigRepo::get(&conn, "test_key").unwrap().unwrap();

        assert_eq!(config.key, "test_key");
        assert_eq!(config.value, json!("test_value"));
    }

    #[test]
    fn test_update_existing() {
        let conn = setup_db();

        ConfigRepo::set(&conn, "key", &json!("original")).unwrap();
        ConfigRepo::set(&conn, "key", &json!("updated")).unwrap();

        let config = ConfigRepo::get(&conn, "key").unwrap().unwrap();
        assert_eq!(config.value, json!("updated"));
    }

    #[test]
    fn test_get_nonexistent() {
        let conn = setup_db();
        assert!(ConfigRepo::get(&conn, "nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let conn = setup_db();

        ConfigRepo::set(&conn, "to_delete", &json!("value")).unwrap();
        assert!(ConfigRepo::delete(&conn, "to_delete").unwrap());
        assert!(!ConfigRepo::delete(&conn, "to_delete").unwrap());
        assert!(ConfigRepo::get(&conn, "to_delete").unwrap().is_none());
    }

    #[test]
    fn test_settings_round_trip() {
        let conn = setup_db();
        let settings = AppSettings {
            sensitivity_level: SensitivityLevel::High,
            auto_clear_input: false,
            ..Default::default()
        };

        ConfigRepo::set(&conn, "app_settings", &serde_json::to_value(settings).unwrap()).unwrap();
        let loaded: AppSettings =
            ConfigRepo::get_or_default(&conn, "app_settings", AppSettings::default()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_get_or_default() {
        let conn = setup_db();

        let value: i32 = ConfigRepo::get_or_default(&conn, "missing", 42).unwrap();
        assert_eq!(value, 42);

        ConfigRepo::set(&conn, "wrong_type", &json!("not a number")).unwrap();
        let value: i32 = ConfigRepo::get_or_default(&conn, "wrong_type", 42).unwrap();
        assert_eq!(value, 42);
    }
}
