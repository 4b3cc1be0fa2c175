//! # Votes Ledger Repository
//! This crate provides traits and implementations for interacting with the
//! vote ledger and the denormalized vote counters. It includes definitions for
//! errors, interfaces, and concrete implementations for PostgreSQL and memory.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VotesRepositoryError;
pub use interfaces::{CounterUpdater, TransactionProvider, VoteRecordStore, VotesRepository};
pub use memory::{InMemoryTransaction, InMemoryVotesRepository};
pub use postgres::PostgresVotesRepository;
