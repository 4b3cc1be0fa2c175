//! Input validation for vote requests.
//!
//! Parameters arrive as raw strings from the action layer and are turned into
//! typed requests here, before any storage is touched.
use serde::{Deserialize, Serialize};
use votes_ledger_shared::types::{Target, TargetType, VoteType, VoterId};

use crate::errors::VoteError;

/// Upper bound on identifier length; ids are opaque but never this long.
pub const MAX_ID_LENGTH: usize = 128;

/// Raw parameters of a vote request. Missing fields deserialize as empty
/// strings and are rejected by `validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CastVoteParams {
    pub target_id: String,
    pub target_type: String,
    pub vote_type: String,
}

/// Raw parameters addressing a target, used by the read side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteTargetParams {
    pub target_id: String,
    pub target_type: String,
}

/// A validated vote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub target: Target,
    pub vote_type: VoteType,
}

impl CastVoteParams {
    pub fn new(
        target_id: impl Into<String>,
        target_type: impl Into<String>,
        vote_type: impl Into<String>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            target_type: target_type.into(),
            vote_type: vote_type.into(),
        }
    }

    pub fn validate(&self) -> Result<VoteRequest, VoteError> {
        Ok(VoteRequest {
            target: validate_target(&self.target_id, &self.target_type)?,
            vote_type: parse_vote_type(&self.vote_type)?,
        })
    }
}

impl VoteTargetParams {
    pub fn new(target_id: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            target_type: target_type.into(),
        }
    }

    pub fn validate(&self) -> Result<Target, VoteError> {
        validate_target(&self.target_id, &self.target_type)
    }
}

/// Resolves the caller's identity. An absent or blank voter id means the
/// caller is not logged in.
pub fn authenticate(voter: Option<&str>) -> Result<VoterId, VoteError> {
    match voter {
        Some(voter_id) if !voter_id.trim().is_empty() => {
            validate_id("voterId", voter_id)?;
            Ok(voter_id.to_string())
        }
        _ => Err(VoteError::Unauthorized),
    }
}

fn validate_target(target_id: &str, target_type: &str) -> Result<Target, VoteError> {
    validate_id("targetId", target_id)?;
    Ok(Target::new(target_id, parse_target_type(target_type)?))
}

fn validate_id(field: &'static str, id: &str) -> Result<(), VoteError> {
    if id.trim().is_empty() {
        return Err(VoteError::validation(field, "must not be empty"));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(VoteError::validation(
            field,
            format!("must be at most {MAX_ID_LENGTH} characters"),
        ));
    }
    Ok(())
}

fn parse_target_type(value: &str) -> Result<TargetType, VoteError> {
    TargetType::ALL
        .into_iter()
        .find(|t| t.as_str() == value)
        .ok_or_else(|| {
            VoteError::validation("targetType", format!("expected question or answer, got {value:?}"))
        })
}

fn parse_vote_type(value: &str) -> Result<VoteType, VoteError> {
    match value {
        "upvote" => Ok(VoteType::Upvote),
        "downvote" => Ok(VoteType::Downvote),
        _ => Err(VoteError::validation(
            "voteType",
            format!("expected upvote or downvote, got {value:?}"),
        )),
    }
}
