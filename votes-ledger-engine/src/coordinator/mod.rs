//! This module defines the `VoteCoordinator`, which applies one vote request
//! as a single atomic unit: read the voter's ledger record, resolve the
//! transition, write the ledger, adjust the counters, commit.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use votes_ledger_repository::VotesRepository;
use votes_ledger_shared::types::{Target, VoteKey, VoteRecord, VoteState};

use crate::errors::VoteError;
use crate::invalidation::InvalidateVotes;
use crate::transition::{LedgerOp, Transition, resolve};
use crate::validation::{CastVoteParams, VoteRequest, authenticate};

/// Outcome of a successful vote request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub target: Target,
    pub previous: VoteState,
    pub current: VoteState,
}

impl VoteReceipt {
    /// Short confirmation to show the voter.
    pub fn summary(&self) -> String {
        match (self.previous.vote_type(), self.current.vote_type()) {
            (_, Some(vote_type)) => format!("{} added", capitalize(vote_type.as_str())),
            (Some(vote_type), None) => format!("{} removed", capitalize(vote_type.as_str())),
            (None, None) => "No vote recorded".to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `VoteCoordinator` resolves toggle and switch semantics and keeps the
/// ledger and the counters in step.
///
/// It holds no locks of its own; the repository transaction is the only
/// mutual exclusion between concurrent requests.
pub struct VoteCoordinator<R: VotesRepository> {
    repository: Arc<R>,
    invalidator: Arc<dyn InvalidateVotes>,
}

impl<R: VotesRepository> VoteCoordinator<R> {
    /// Creates a new `VoteCoordinator`.
    ///
    /// # Arguments
    ///
    /// * `repository` - Storage for the ledger and the counters
    /// * `invalidator` - Notified after every committed vote
    pub fn new(repository: Arc<R>, invalidator: Arc<dyn InvalidateVotes>) -> Self {
        Self {
            repository,
            invalidator,
        }
    }

    /// Casts, switches or withdraws `voter`'s vote on a question or answer.
    ///
    /// # Arguments
    ///
    /// * `voter` - The authenticated voter, `None` for anonymous callers
    /// * `params` - Target and requested vote type, as received
    ///
    /// # Returns
    ///
    /// * `Ok(VoteReceipt)` - Ledger and counters reached the new state
    /// * `Err(VoteError)` - Nothing was changed; only `VoteError::Conflict`
    ///   is worth retrying
    pub async fn cast_vote(
        &self,
        voter: Option<&str>,
        params: &CastVoteParams,
    ) -> Result<VoteReceipt, VoteError> {
        let result = self.try_cast_vote(voter, params).await;
        match &result {
            Ok(receipt) => info!(
                voter_id = voter.unwrap_or_default(),
                vote_target = %receipt.target,
                previous = ?receipt.previous,
                current = ?receipt.current,
                "Vote recorded"
            ),
            Err(e) => warn!(
                voter_id = voter.unwrap_or_default(),
                target_id = %params.target_id,
                kind = ?e.kind(),
                error = %e,
                "Vote rejected"
            ),
        }
        result
    }

    async fn try_cast_vote(
        &self,
        voter: Option<&str>,
        params: &CastVoteParams,
    ) -> Result<VoteReceipt, VoteError> {
        let voter_id = authenticate(voter)?;
        let request = params.validate()?;
        let key = VoteKey::new(voter_id, &request.target);

        let mut tx = self.repository.begin().await?;
        let transition = match self.apply(&mut tx, &key, &request).await {
            Ok(transition) => transition,
            Err(e) => {
                if let Err(rollback_error) = self.repository.rollback(tx).await {
                    warn!(error = %rollback_error, "Failed to roll back vote transaction");
                }
                return Err(e);
            }
        };
        self.repository.commit(tx).await?;

        self.invalidator.invalidate(&request.target).await;

        Ok(VoteReceipt {
            target: request.target,
            previous: transition.previous,
            current: transition.next,
        })
    }

    /// Runs the read-decide-write sequence inside `tx`.
    async fn apply(
        &self,
        tx: &mut R::Tx,
        key: &VoteKey,
        request: &VoteRequest,
    ) -> Result<Transition, VoteError> {
        let existing = self.repository.find_vote(tx, key).await?;
        let transition = resolve(existing.as_ref(), request.vote_type);
        debug!(
            voter_id = %key.voter_id,
            vote_target = %request.target,
            ?transition,
            "Resolved vote transition"
        );

        let now = now();
        match transition.ledger {
            LedgerOp::Insert(vote_type) => {
                let record = VoteRecord::new(key, vote_type, now);
                self.repository.insert_vote(tx, &record).await?;
            }
            LedgerOp::UpdateType { id, vote_type } => {
                self.repository.update_vote_type(tx, id, vote_type, now).await?;
            }
            LedgerOp::Delete { id } => {
                self.repository.delete_vote(tx, id).await?;
            }
        }

        for adjustment in &transition.adjustments {
            self.repository
                .adjust_count(tx, &request.target, adjustment.field, adjustment.delta)
                .await?;
        }

        Ok(transition)
    }
}

fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
