//! Storage error types.

use thiserror::Error;

/// Errors from the flagged-interaction store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored JSON value (settings, matched terms) could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Creating the data directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No flagged interaction with this ID.
    #[error("Flagged interaction #{0} not found")]
    NotFound(i64),

    /// The store could not be located or opened.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// True for a missing interaction.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_interaction() {
        let err = StorageError::NotFound(42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Flagged interaction #42 not found");
    }

    #[test]
    fn json_errors_convert() {
        let err: StorageError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(!err.is_not_found());
        assert!(err.to_string().starts_with("JSON error"));
    }
}
