//! # Votes Ledger Shared
//! This crate defines shared data structures and types used across the votes ledger crates.
//! It includes common definitions for vote targets, vote records, vote counts and vote states.
pub mod types;
