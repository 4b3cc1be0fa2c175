use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;
use votes_ledger_shared::types::{
    CountDelta, CounterField, Target, VoteKey, VoteRecord, VoteType, VotesCount,
};

use crate::{CounterUpdater, TransactionProvider, VoteRecordStore, VotesRepositoryError};

struct VersionedRecord {
    record: VoteRecord,
    version: u64,
}

#[derive(Default)]
struct LedgerState {
    votes: HashMap<VoteKey, VersionedRecord>,
    counts: HashMap<Target, VotesCount>,
    next_version: u64,
}

impl LedgerState {
    fn version_of(&self, key: &VoteKey) -> Option<u64> {
        self.votes.get(key).map(|v| v.version)
    }
}

/// Pending work of one in-memory transaction.
#[derive(Default)]
pub struct InMemoryTransaction {
    /// Version of each ledger row as first seen by this transaction.
    observed: HashMap<VoteKey, Option<u64>>,
    /// `Some` replaces the row, `None` deletes it.
    staged: HashMap<VoteKey, Option<VoteRecord>>,
    deltas: HashMap<(Target, CounterField), i64>,
}

impl InMemoryTransaction {
    fn observe(&mut self, key: &VoteKey, version: Option<u64>) {
        self.observed.entry(key.clone()).or_insert(version);
    }
}

/// Repository keeping the ledger and the counters in process memory.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone, Default)]
pub struct InMemoryVotesRepository {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryVotesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `target` votable with zeroed counters. Existing counters are kept.
    pub async fn register_target(&self, target: &Target) {
        let mut state = self.state.lock().await;
        state
            .counts
            .entry(target.clone())
            .or_insert_with(|| VotesCount::zero(target));
    }

    /// Removes `target` as if its question or answer had been deleted.
    /// Ledger records pointing at it are left alone.
    pub async fn remove_target(&self, target: &Target) {
        self.state.lock().await.counts.remove(target);
    }

    /// Snapshot of every committed ledger record.
    pub async fn records(&self) -> Vec<VoteRecord> {
        let state = self.state.lock().await;
        state.votes.values().map(|v| v.record.clone()).collect()
    }

    /// Resolves `id` to its key and current record as seen by `tx`.
    fn locate(
        state: &LedgerState,
        tx: &mut InMemoryTransaction,
        id: Uuid,
    ) -> Result<(VoteKey, VoteRecord), VotesRepositoryError> {
        for (key, staged) in &tx.staged {
            match staged {
                Some(record) if record.id == id => return Ok((key.clone(), record.clone())),
                None if state.votes.get(key).is_some_and(|v| v.record.id == id) => {
                    return Err(VotesRepositoryError::VoteNotFound(id));
                }
                _ => {}
            }
        }

        let (key, versioned) = state
            .votes
            .iter()
            .find(|(key, v)| v.record.id == id && !tx.staged.contains_key(*key))
            .ok_or(VotesRepositoryError::VoteNotFound(id))?;
        tx.observe(key, Some(versioned.version));
        Ok((key.clone(), versioned.record.clone()))
    }
}

#[async_trait]
impl TransactionProvider for InMemoryVotesRepository {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, VotesRepositoryError> {
        Ok(InMemoryTransaction::default())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        let mut state = self.state.lock().await;

        for (key, seen) in &tx.observed {
            if state.version_of(key) != *seen {
                return Err(VotesRepositoryError::Conflict(format!(
                    "vote of {} on {} changed by a concurrent transaction",
                    key.voter_id,
                    key.target()
                )));
            }
        }

        let mut updated_counts = Vec::with_capacity(tx.deltas.len());
        for ((target, field), delta) in &tx.deltas {
            let mut count = state
                .counts
                .get(target)
                .cloned()
                .ok_or_else(|| VotesRepositoryError::TargetNotFound(target.clone()))?;
            if let Some(pending) = updated_counts
                .iter()
                .position(|c: &VotesCount| c.target() == *target)
            {
                count = updated_counts.swap_remove(pending);
            }
            count.apply(*field, *delta);
            if count.is_negative() {
                return Err(VotesRepositoryError::NegativeCount(target.clone()));
            }
            updated_counts.push(count);
        }

        for (key, staged) in tx.staged {
            match staged {
                Some(record) => {
                    state.next_version += 1;
                    let version = state.next_version;
                    state.votes.insert(key, VersionedRecord { record, version });
                }
                None => {
                    state.votes.remove(&key);
                }
            }
        }
        for count in updated_counts {
            state.counts.insert(count.target(), count);
        }
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        drop(tx);
        Ok(())
    }
}

#[async_trait]
impl VoteRecordStore for InMemoryVotesRepository {
    async fn find_vote(
        &self,
        tx: &mut Self::Tx,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        if let Some(staged) = tx.staged.get(key) {
            return Ok(staged.clone());
        }
        let state = self.state.lock().await;
        let current = state.votes.get(key);
        tx.observe(key, current.map(|v| v.version));
        Ok(current.map(|v| v.record.clone()))
    }

    async fn insert_vote(
        &self,
        tx: &mut Self::Tx,
        record: &VoteRecord,
    ) -> Result<(), VotesRepositoryError> {
        let key = record.key();
        let duplicate = match tx.staged.get(&key) {
            Some(staged) => staged.is_some(),
            None => {
                let state = self.state.lock().await;
                let version = state.version_of(&key);
                tx.observe(&key, version);
                version.is_some()
            }
        };
        if duplicate {
            return Err(VotesRepositoryError::Conflict(format!(
                "{} already voted on {}",
                key.voter_id,
                key.target()
            )));
        }
        tx.staged.insert(key, Some(record.clone()));
        Ok(())
    }

    async fn update_vote_type(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        vote_type: VoteType,
        updated_at: u64,
    ) -> Result<(), VotesRepositoryError> {
        let state = self.state.lock().await;
        let (key, mut record) = Self::locate(&state, tx, id)?;
        record.vote_type = vote_type;
        record.updated_at = updated_at;
        tx.staged.insert(key, Some(record));
        Ok(())
    }

    async fn delete_vote(&self, tx: &mut Self::Tx, id: Uuid) -> Result<(), VotesRepositoryError> {
        let state = self.state.lock().await;
        let (key, _) = Self::locate(&state, tx, id)?;
        tx.staged.insert(key, None);
        Ok(())
    }

    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.votes.get(key).map(|v| v.record.clone()))
    }
}

#[async_trait]
impl CounterUpdater for InMemoryVotesRepository {
    async fn adjust_count(
        &self,
        tx: &mut Self::Tx,
        target: &Target,
        field: CounterField,
        delta: CountDelta,
    ) -> Result<(), VotesRepositoryError> {
        let state = self.state.lock().await;
        if !state.counts.contains_key(target) {
            return Err(VotesRepositoryError::TargetNotFound(target.clone()));
        }
        *tx.deltas.entry((target.clone(), field)).or_insert(0) += delta.as_i64();
        Ok(())
    }

    async fn get_votes_count(
        &self,
        target: &Target,
    ) -> Result<Option<VotesCount>, VotesRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.counts.get(target).cloned())
    }
}
