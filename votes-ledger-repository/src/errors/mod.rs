//! Error types for the votes ledger repository.
//! Consolidates and re-exports error types related to ledger and counter operations.
mod votes;

pub use votes::VotesRepositoryError;
