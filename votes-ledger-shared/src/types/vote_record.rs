use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Target, TargetId, TargetType, VoteType};

/// Identifier of the authenticated user casting a vote.
pub type VoterId = String;

/// The natural key of the ledger: at most one record exists per key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct VoteKey {
    pub voter_id: VoterId,
    pub target_id: TargetId,
    pub target_type: TargetType,
}

impl VoteKey {
    pub fn new(voter_id: impl Into<VoterId>, target: &Target) -> Self {
        Self {
            voter_id: voter_id.into(),
            target_id: target.id.clone(),
            target_type: target.target_type,
        }
    }

    pub fn target(&self) -> Target {
        Target::new(self.target_id.clone(), self.target_type)
    }
}

/// Represents a user's vote on a question or answer.
///
/// Created on the first vote, mutated in place when the voter switches
/// direction and deleted when the voter repeats the same vote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub id: Uuid,
    pub voter_id: VoterId,
    pub target_id: TargetId,
    pub target_type: TargetType,
    pub vote_type: VoteType,
    pub created_at: u64,
    pub updated_at: u64,
}

impl VoteRecord {
    /// Builds a fresh record for `key` with a new random id.
    pub fn new(key: &VoteKey, vote_type: VoteType, now: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            voter_id: key.voter_id.clone(),
            target_id: key.target_id.clone(),
            target_type: key.target_type,
            vote_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> VoteKey {
        VoteKey {
            voter_id: self.voter_id.clone(),
            target_id: self.target_id.clone(),
            target_type: self.target_type,
        }
    }
}
