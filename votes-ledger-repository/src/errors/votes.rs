//! Error types for the votes repository.
//! Defines specific errors that can occur during ledger and counter operations.
use thiserror::Error;
use uuid::Uuid;
use votes_ledger_shared::types::Target;

/// SQLSTATE codes raised when PostgreSQL aborts a transaction because of
/// a concurrent one (serialization failure, deadlock).
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

/// Represents errors that can occur within the votes repository.
///
/// Conflicts are kept apart from other database errors because they are the
/// only failures a caller can recover from by retrying the whole operation.
#[derive(Debug, Error)]
pub enum VotesRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[source] sqlx::Error),

    #[error("Conflicting concurrent write: {0}")]
    Conflict(String),

    #[error("Vote record not found: {0}")]
    VoteNotFound(Uuid),

    #[error("Target not found: {0}")]
    TargetNotFound(Target),

    #[error("Counter would become negative on {0}")]
    NegativeCount(Target),

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(i16),

    #[error("Invalid target type: {0}")]
    InvalidTargetType(i16),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl VotesRepositoryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, VotesRepositoryError::Conflict(_))
    }
}

impl From<sqlx::Error> for VotesRepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                return VotesRepositoryError::Conflict(db_error.message().to_string());
            }
            let code = db_error.code();
            if code
                .as_deref()
                .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code))
            {
                return VotesRepositoryError::Conflict(db_error.message().to_string());
            }
        }
        VotesRepositoryError::DatabaseError(error)
    }
}
