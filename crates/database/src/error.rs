//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A value failed validation before it reached the database.
    #[error("invalid {entity}: {reason}")]
    InvalidData { entity: &'static str, reason: String },
}

impl DatabaseError {
    /// Whether this error means a relation or column does not exist yet.
    ///
    /// Schema is rolled out incrementally, so this is an expected state rather
    /// than a failure.
    pub fn is_missing_schema(&self) -> bool {
        match self {
            DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => {
                let message = db_err.message();
                message.starts_with("no such table") || message.starts_with("no such column")
            }
            _ => false,
        }
    }

    /// Short machine-readable code for logging.
    pub fn code(&self) -> String {
        match self {
            DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => db_err
                .code()
                .map(|code| code.into_owned())
                .unwrap_or_else(|| "database".to_string()),
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => "pool_timed_out".to_string(),
            DatabaseError::Sqlx(_) => "sqlx".to_string(),
            DatabaseError::Migration(_) => "migration".to_string(),
            DatabaseError::InvalidData { .. } => "invalid_data".to_string(),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
