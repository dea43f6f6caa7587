use thiserror::Error;
use tracing::warn;

/// Error types for the domain workflows.
///
/// The variants follow the API's error taxonomy; the HTTP layer maps each one
/// onto a status code without inspecting the message.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Malformed or conflicting input, e.g. a second pending change request
    #[error("{0}")]
    Validation(String),

    /// Missing entity, or one the caller must not learn about
    #[error("{0}")]
    NotFound(String),

    /// The entity exists but the caller lacks the relationship to it
    #[error("{0}")]
    Authorization(String),

    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Validation failed");
        DomainError::Validation(message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Entity not found");
        DomainError::NotFound(message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Authorization failed");
        DomainError::Authorization(message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(%message, "Conflict");
        DomainError::Conflict(message)
    }
}

/// Type alias for Result with DomainError
pub type Result<T> = std::result::Result<T, DomainError>;
