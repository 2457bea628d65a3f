use thiserror::Error;

/// Core error type for faculty workflow operations.
#[derive(Error, Debug)]
pub enum FacultyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// The record moved to another workflow state between load and update.
    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FacultyError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<serde_json::Error> for FacultyError {
    fn from(e: serde_json::Error) -> Self {
        FacultyError::Serialization(e.to_string())
    }
}

/// Result type alias using FacultyError.
pub type Result<T> = std::result::Result<T, FacultyError>;
