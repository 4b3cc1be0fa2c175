use votes_ledger_shared::types::{CountDelta, CounterField, Target, VotesCount};

use crate::errors::VotesRepositoryError;
use crate::interfaces::TransactionProvider;

/// Atomic increments and decrements of the counters stored on a votable entity.
#[async_trait::async_trait]
pub trait CounterUpdater: TransactionProvider {
    /// Adds `delta` to `field` on `target` within `tx`.
    ///
    /// # Errors
    ///
    /// Returns `VotesRepositoryError::TargetNotFound` if the target no longer
    /// exists, which must abort the surrounding transaction.
    async fn adjust_count(
        &self,
        tx: &mut Self::Tx,
        target: &Target,
        field: CounterField,
        delta: CountDelta,
    ) -> Result<(), VotesRepositoryError>;

    /// Reads the committed counters of `target`, or `None` if it does not exist.
    async fn get_votes_count(
        &self,
        target: &Target,
    ) -> Result<Option<VotesCount>, VotesRepositoryError>;
}
