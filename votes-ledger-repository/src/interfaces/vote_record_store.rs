//! This module defines the `VoteRecordStore` trait, the persisted
//! one-vote-per-(voter, target) ledger.
use uuid::Uuid;
use votes_ledger_shared::types::{VoteKey, VoteRecord, VoteType};

use crate::errors::VotesRepositoryError;
use crate::interfaces::TransactionProvider;

/// A trait that defines the interface for the vote ledger.
///
/// All mutating methods participate in the transaction passed in; nothing they
/// write is visible to other callers until that transaction commits.
#[async_trait::async_trait]
pub trait VoteRecordStore: TransactionProvider {
    /// Finds the vote held under `key`, if any.
    ///
    /// Implementations must make sure that a concurrent transaction acting on
    /// the same key cannot commit a decision based on the same read.
    async fn find_vote(
        &self,
        tx: &mut Self::Tx,
        key: &VoteKey,
    ) -> Result<Option<VoteRecord>, VotesRepositoryError>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns `VotesRepositoryError::Conflict` when a record already exists for
    /// the same (voter, target, target type) key.
    async fn insert_vote(
        &self,
        tx: &mut Self::Tx,
        record: &VoteRecord,
    ) -> Result<(), VotesRepositoryError>;

    /// Changes the direction of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `VotesRepositoryError::VoteNotFound` if no record has this id.
    async fn update_vote_type(
        &self,
        tx: &mut Self::Tx,
        id: Uuid,
        vote_type: VoteType,
        updated_at: u64,
    ) -> Result<(), VotesRepositoryError>;

    /// Removes an existing record.
    ///
    /// # Errors
    ///
    /// Returns `VotesRepositoryError::VoteNotFound` if no record has this id.
    async fn delete_vote(&self, tx: &mut Self::Tx, id: Uuid) -> Result<(), VotesRepositoryError>;

    /// Reads the committed vote held under `key`, outside of any transaction.
    async fn get_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, VotesRepositoryError>;
}
