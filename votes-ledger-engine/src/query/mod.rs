//! Read side of the vote subsystem: whether a user has voted on a target and
//! the counters to render next to the vote buttons.
mod cache;

pub use cache::{CountsCache, DEFAULT_CACHE_CAPACITY};

use std::sync::Arc;

use votes_ledger_repository::{VotesRepository, VotesRepositoryError};
use votes_ledger_shared::types::{VoteKey, VoteState, VoteStatus, VotesCount};

use crate::errors::VoteError;
use crate::validation::{VoteTargetParams, authenticate};

/// Answers vote queries without opening a transaction.
pub struct VoteQuery<R: VotesRepository> {
    repository: Arc<R>,
    cache: Arc<CountsCache>,
}

impl<R: VotesRepository> VoteQuery<R> {
    pub fn new(repository: Arc<R>, cache: Arc<CountsCache>) -> Self {
        Self { repository, cache }
    }

    /// Reports how `voter` has voted on the target.
    ///
    /// An anonymous caller has no opinion: both flags are `false` and the
    /// result is `Ok`. An `Err` always means the lookup itself failed, which
    /// callers must not mistake for "has not voted".
    pub async fn get_vote_state(
        &self,
        voter: Option<&str>,
        params: &VoteTargetParams,
    ) -> Result<VoteStatus, VoteError> {
        let target = params.validate()?;
        let Ok(voter_id) = authenticate(voter) else {
            return Ok(VoteStatus::default());
        };

        let record = self
            .repository
            .get_vote(&VoteKey::new(voter_id, &target))
            .await?;
        Ok(VoteStatus::from(VoteState::from_record(record.as_ref())))
    }

    /// Reads the target's counters, through the cache.
    pub async fn get_votes_count(&self, params: &VoteTargetParams) -> Result<VotesCount, VoteError> {
        let target = params.validate()?;
        if let Some(count) = self.cache.get(&target).await {
            return Ok(count);
        }

        let generation = self.cache.generation().await;
        let count = self
            .repository
            .get_votes_count(&target)
            .await?
            .ok_or_else(|| VoteError::NotFound(VotesRepositoryError::TargetNotFound(target.clone())))?;
        self.cache.insert_if_current(count.clone(), generation).await;
        Ok(count)
    }
}
