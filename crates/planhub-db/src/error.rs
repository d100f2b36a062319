//! Database-specific error types and conversions.

use planhub_core::error::PlanhubError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(surrealdb::Error),

    /// A unique index rejected the write. Kept distinct so the core can
    /// surface duplicate names/order indexes as validation failures.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        classify(err.to_string()).unwrap_or(DbError::Surreal(err))
    }
}

impl DbError {
    /// Classifies a statement-level failure reported through
    /// `Response::check`, which yields the same messages as the
    /// transport-level error path.
    pub(crate) fn from_check(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        classify(msg.clone()).unwrap_or(DbError::Query(msg))
    }
}

/// SurrealDB reports unique-index rejections only through the error
/// message ("index `…` already contains …"), so the kind is recovered by
/// inspection.
fn classify(msg: String) -> Option<DbError> {
    if msg.contains("already contains") {
        Some(DbError::UniqueViolation(msg))
    } else {
        None
    }
}

impl From<DbError> for PlanhubError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PlanhubError::NotFound { entity, id },
            DbError::UniqueViolation(msg) => PlanhubError::Validation { message: msg },
            other => PlanhubError::Database(other.to_string()),
        }
    }
}
