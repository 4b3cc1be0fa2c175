use serde::{Deserialize, Serialize};

use crate::types::{VoteRecord, VoteType};

/// The vote a voter currently holds on a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VoteState {
    NoVote,
    Upvoted,
    Downvoted,
}

impl VoteState {
    pub fn from_record(record: Option<&VoteRecord>) -> Self {
        match record.map(|r| r.vote_type) {
            None => VoteState::NoVote,
            Some(VoteType::Upvote) => VoteState::Upvoted,
            Some(VoteType::Downvote) => VoteState::Downvoted,
        }
    }

    pub fn vote_type(&self) -> Option<VoteType> {
        match self {
            VoteState::NoVote => None,
            VoteState::Upvoted => Some(VoteType::Upvote),
            VoteState::Downvoted => Some(VoteType::Downvote),
        }
    }
}

impl From<VoteType> for VoteState {
    fn from(vote_type: VoteType) -> Self {
        match vote_type {
            VoteType::Upvote => VoteState::Upvoted,
            VoteType::Downvote => VoteState::Downvoted,
        }
    }
}

/// The "has this user voted, and how" answer rendered by the UI.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub has_upvoted: bool,
    pub has_downvoted: bool,
}

impl From<VoteState> for VoteStatus {
    fn from(state: VoteState) -> Self {
        Self {
            has_upvoted: state == VoteState::Upvoted,
            has_downvoted: state == VoteState::Downvoted,
        }
    }
}
