//! # Votes Ledger Engine
//! This crate holds the voting logic on top of the repository traits: the
//! transition table, the coordinator that applies a vote atomically, the
//! read side used to render vote buttons, and cache invalidation.
pub mod coordinator;
pub mod errors;
pub mod invalidation;
pub mod query;
pub mod transition;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use coordinator::{VoteCoordinator, VoteReceipt};
pub use errors::{VoteError, VoteErrorKind, VoteFailure};
pub use invalidation::{BroadcastInvalidator, InvalidateVotes, InvalidationFanout, VotesInvalidated};
pub use query::{CountsCache, VoteQuery};
pub use validation::{CastVoteParams, VoteRequest, VoteTargetParams};
