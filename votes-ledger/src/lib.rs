//! Votes Ledger Service
//!
//! Wires the vote engine to PostgreSQL and exposes it over HTTP: settings,
//! dependency injection, the router and the process-level error type.

pub mod config;
pub mod errors;
pub mod server;

pub use config::{ConnectionMode, Dependencies, Settings};
pub use errors::ServiceError;
