use serde::{Deserialize, Serialize};

use crate::types::VoteType;

/// One of the two denormalized counters kept on a votable entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CounterField {
    Upvotes,
    Downvotes,
}

impl From<VoteType> for CounterField {
    fn from(vote_type: VoteType) -> Self {
        match vote_type {
            VoteType::Upvote => CounterField::Upvotes,
            VoteType::Downvote => CounterField::Downvotes,
        }
    }
}

/// A unit change applied to a counter. Counters only ever move by one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CountDelta {
    Increment,
    Decrement,
}

impl CountDelta {
    pub fn as_i64(&self) -> i64 {
        match self {
            CountDelta::Increment => 1,
            CountDelta::Decrement => -1,
        }
    }
}
