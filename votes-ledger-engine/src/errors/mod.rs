mod vote;

pub use vote::{VoteError, VoteErrorKind, VoteFailure};
