//! Error types for listall.

use thiserror::Error;

/// Errors produced by the listall library.
#[derive(Debug, Error)]
pub enum ListAllError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Image error: {0}")]
    Image(String),
}

impl ListAllError {
    /// Wrap a rusqlite error with a short description of what was attempted.
    pub fn db(context: &str, err: &rusqlite::Error) -> Self {
        Self::Database(format!("{context}: {err}"))
    }

    /// Whether the error was caused by bad user input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidInput(_) | Self::Import(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ListAllError::NotFound("List 'Groceries'".to_string());
        assert_eq!(err.to_string(), "Not found: List 'Groceries'");

        let err = ListAllError::Import("line 3: unexpected token".to_string());
        assert_eq!(err.to_string(), "Import failed: line 3: unexpected token");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ListAllError = io.into();
        assert!(matches!(err, ListAllError::Io(_)));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_user_errors() {
        assert!(ListAllError::InvalidInput("empty".into()).is_user_error());
        assert!(!ListAllError::Database("locked".into()).is_user_error());
    }
}
