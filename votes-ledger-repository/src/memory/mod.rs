//! In-memory implementation of the votes ledger repository.
//!
//! Transactions are optimistic: reads remember the row version they saw,
//! writes are staged on the transaction and applied at commit, which fails
//! with `VotesRepositoryError::Conflict` when another transaction committed a
//! change to a row this one depends on. This mirrors what the PostgreSQL
//! implementation guarantees through row locks and the unique constraint.
mod votes_repository;

pub use votes_repository::{InMemoryTransaction, InMemoryVotesRepository};
