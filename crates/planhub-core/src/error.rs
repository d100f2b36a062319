//! Error types for the Planhub system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanhubError {
    #[error("{entity} not found with id {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} with {field} '{value}' already exists")]
    AlreadyExists {
        entity: String,
        field: String,
        value: String,
    },

    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Insufficient permissions to {operation}")]
    InsufficientPermissions { operation: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Business rule violated: {message}")]
    BusinessLogic { message: String },

    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlanhubError {
    /// Shorthand for the not-found case, which every lookup path hits.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn access_denied(reason: &str) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }
}

pub type PlanhubResult<T> = Result<T, PlanhubError>;
