//! Test doubles shared by the engine's unit tests.
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Barrier;
use uuid::Uuid;
use votes_ledger_repository::{
    CounterUpdater, TransactionProvider, VoteRecordStore, VotesRepositoryError,
};
use votes_ledger_shared::types::{
    CountDelta, CounterField, Target, VoteKey, VoteRecord, VoteType, VotesCount,
};

use crate::invalidation::InvalidateVotes;

/// Remembers every invalidated target in order.
#[derive(Default)]
pub struct RecordingInvalidator {
    targets: Mutex<Vec<Target>>,
}

impl RecordingInvalidator {
    pub fn targets(&self) -> Vec<Target> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl InvalidateVotes for RecordingInvalidator {
    async fn invalidate(&self, target: &Target) {
        self.targets.lock().unwrap().push(target.clone());
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fault {
    Reads,
    Commits,
}

/// Delegates to `inner` but fails one kind of operation.
pub struct FaultyRepository<R> {
    inner: R,
    fault: Fault,
}

impl<R> FaultyRepository<R> {
    /// Point reads of the ledger and the counters fail.
    pub fn failing_reads(inner: R) -> Self {
        Self {
            inner,
            fault: Fault::Reads,
        }
    }

    /// Every commit rolls back and reports a database error.
    pub fn failing_commits(inner: R) -> Self {
        Self {
            inner,
            fault: Fault::Commits,
        }
    }
}

#[async_trait]
impl<R: TransactionProvider> TransactionProvider for FaultyRepository<R> {
    type Tx = R::Tx;

    async fn begin(&self) -> Result<Self::Tx, VotesRepositoryError> {
        self.inner.begin().await
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        if self.fault == Fault::Commits {
            self.inner.rollback(tx).await?;
            return Err(VotesRepositoryError::DatabaseError(sqlx::Error::PoolClosed));
        }
        self.inner.commit(tx).await
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        self.inner.rollback(tx).await
    }
}

#[async_trait]
impl<R: VoteRecordStore> VoteRecordStore for FaultyRepository<R> {
    async fn find_vote(
        &self,
        tx: &mut Self::Tx,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        self.inner.find_vote(tx, key).await
    }

    async fn insert_vote(
        &self,
        tx: &mut Self::Tx,
        record: &VoteRecord,
    ) -> Result<(), VotesRepositoryError> {
        self.inner.insert_vote(tx, record).await
    }

    async fn update_vote_type(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        vote_type: VoteType,
        updated_at: u64,
    ) -> Result<(), VotesRepositoryError> {
        self.inner.update_vote_type(tx, id, vote_type, updated_at).await
    }

    async fn delete_vote(&self, tx: &mut Self::Tx, id: Uuid) -> Result<(), VotesRepositoryError> {
        self.inner.delete_vote(tx, id).await
    }

    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        if self.fault == Fault::Reads {
            return Err(VotesRepositoryError::InvalidVoteType(7));
        }
        self.inner.get_vote(key).await
    }
}

#[async_trait]
impl<R: CounterUpdater> CounterUpdater for FaultyRepository<R> {
    async fn adjust_count(
        &self,
        tx: &mut Self::Tx,
        target: &Target,
        field: CounterField,
        delta: CountDelta,
    ) -> Result<(), VotesRepositoryError> {
        self.inner.adjust_count(tx, target, field, delta).await
    }

    async fn get_votes_count(
        &self,
        target: &Target,
    ) -> Result<Option<VotesCount>, VotesRepositoryError> {
        if self.fault == Fault::Reads {
            return Err(VotesRepositoryError::InvalidTargetType(9));
        }
        self.inner.get_votes_count(target).await
    }
}

/// Holds every `find_vote` until `parties` transactions have read, so
/// concurrent requests for the same key all observe the ledger before any of
/// them writes.
pub struct RendezvousRepository<R> {
    inner: R,
    barrier: Barrier,
}

impl<R> RendezvousRepository<R> {
    pub fn new(inner: R, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl<R: TransactionProvider> TransactionProvider for RendezvousRepository<R> {
    type Tx = R::Tx;

    async fn begin(&self) -> Result<Self::Tx, VotesRepositoryError> {
        self.inner.begin().await
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        self.inner.commit(tx).await
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError> {
        self.inner.rollback(tx).await
    }
}

#[async_trait]
impl<R: VoteRecordStore> VoteRecordStore for RendezvousRepository<R> {
    async fn find_vote(
        &self,
        tx: &mut Self::Tx,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        let found = self.inner.find_vote(tx, key).await?;
        self.barrier.wait().await;
        Ok(found)
    }

    async fn insert_vote(
        &self,
        tx: &mut Self::Tx,
        record: &VoteRecord,
    ) -> Result<(), VotesRepositoryError> {
        self.inner.insert_vote(tx, record).await
    }

    async fn update_vote_type(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        vote_type: VoteType,
        updated_at: u64,
    ) -> Result<(), VotesRepositoryError> {
        self.inner.update_vote_type(tx, id, vote_type, updated_at).await
    }

    async fn delete_vote(&self, tx: &mut Self::Tx, id: Uuid) -> Result<(), VotesRepositoryError> {
        self.inner.delete_vote(tx, id).await
    }

    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, VotesRepositoryError> {
        self.inner.get_vote(key).await
    }
}

#[async_trait]
impl<R: CounterUpdater> CounterUpdater for RendezvousRepository<R> {
    async fn adjust_count(
        &self,
        tx: &mut Self::Tx,
        target: &Target,
        field: CounterField,
        delta: CountDelta,
    ) -> Result<(), VotesRepositoryError> {
        self.inner.adjust_count(tx, target, field, delta).await
    }

    async fn get_votes_count(
        &self,
        target: &Target,
    ) -> Result<Option<VotesCount>, VotesRepositoryError> {
        self.inner.get_votes_count(target).await
    }
}
