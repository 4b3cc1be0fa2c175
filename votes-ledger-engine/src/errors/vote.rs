//! Error types for vote operations.
//! Every failure of the coordinator or the query surfaces as a `VoteError`;
//! `VoteFailure` is the structured form handed back to callers.
use serde::{Deserialize, Serialize};
use thiserror::Error;
use votes_ledger_repository::VotesRepositoryError;

/// Represents errors that can occur while casting or reading a vote.
///
/// Only `Conflict` is worth retrying: it means a concurrent request for the
/// same voter and target won the race. Everything else is terminal for the
/// request. No variant is ever returned with partial state committed.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Only logged-in users can vote")]
    Unauthorized,

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(#[source] VotesRepositoryError),

    #[error("Concurrent vote conflict: {0}")]
    Conflict(#[source] VotesRepositoryError),

    #[error("Transaction failed: {0}")]
    Transaction(#[source] VotesRepositoryError),
}

/// The category of a `VoteError`, for callers that branch on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoteErrorKind {
    Unauthorized,
    Validation,
    NotFound,
    Conflict,
    Transaction,
}

/// Structured failure result: kind plus a human readable message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteFailure {
    pub kind: VoteErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl VoteError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        VoteError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> VoteErrorKind {
        match self {
            VoteError::Unauthorized => VoteErrorKind::Unauthorized,
            VoteError::Validation { .. } => VoteErrorKind::Validation,
            VoteError::NotFound(_) => VoteErrorKind::NotFound,
            VoteError::Conflict(_) => VoteErrorKind::Conflict,
            VoteError::Transaction(_) => VoteErrorKind::Transaction,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == VoteErrorKind::Conflict
    }

    pub fn failure(&self) -> VoteFailure {
        VoteFailure {
            kind: self.kind(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

impl From<VotesRepositoryError> for VoteError {
    fn from(error: VotesRepositoryError) -> Self {
        match error {
            VotesRepositoryError::Conflict(_) => VoteError::Conflict(error),
            VotesRepositoryError::VoteNotFound(_) | VotesRepositoryError::TargetNotFound(_) => {
                VoteError::NotFound(error)
            }
            _ => VoteError::Transaction(error),
        }
    }
}
