//! Configuration module for the Votes Ledger service.
//! Reads settings from the environment and wires up dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{ConnectionMode, Settings};
