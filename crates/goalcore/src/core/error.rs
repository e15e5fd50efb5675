use thiserror::Error;

/// Centralized error types for the application
///
/// Store, transport and validation failures are all converted to this enum so the
/// command router can decide in one place what the user gets to see.
///
/// # Example
///
/// ```no_run
/// use goalcore::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// Input rejected by the store (bad date, empty title, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist or is not visible to the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Outbound message delivery failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::DatabasePool(_) => "database_pool",
            AppError::Migration(_) => "migration",
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Transport(_) => "transport",
            AppError::Anyhow(_) => "other",
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
