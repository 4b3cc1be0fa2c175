//! PostgreSQL implementation of the votes ledger repository.
//!
//! Provides a production-ready PostgreSQL backend for the `VoteRecordStore` and
//! `CounterUpdater` traits with connection pooling and transaction safety.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - ACID transactions handed out as `sqlx::Transaction<'static, Postgres>`
//! - Row locks (`SELECT ... FOR UPDATE`) on existing ledger rows
//! - Unique index on (voter_id, target_id, target_type) as the backstop for
//!   concurrent first votes
//! - Single-statement counter increments
//!
//! ## Database Tables
//!
//! - `votes`: One row per (voter, target) pair
//! - `questions`, `answers`: Denormalized `upvotes` / `downvotes` counters
mod votes_repository;

pub use votes_repository::PostgresVotesRepository;
