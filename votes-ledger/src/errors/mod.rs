//! Error types for the Votes Ledger service.
//! Covers process-level failures: configuration, database connectivity,
//! schema setup and the HTTP listener. Per-request failures are `VoteError`s
//! and never abort the process.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] votes_ledger_repository::VotesRepositoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn config(message: impl Into<String>) -> Self {
        ServiceError::Config(message.into())
    }
}
