use crate::errors::VotesRepositoryError;

/// Hands out atomic units of work.
///
/// Every ledger and counter write takes the transaction explicitly, so the
/// caller decides where the unit starts and whether it commits or rolls back.
#[async_trait::async_trait]
pub trait TransactionProvider: Send + Sync {
    /// The transaction context threaded through store and updater calls.
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, VotesRepositoryError>;

    /// Makes every write performed through `tx` visible at once.
    ///
    /// Fails with `VotesRepositoryError::Conflict` when a concurrent
    /// transaction invalidated what `tx` read or wrote.
    async fn commit(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError>;

    /// Discards every write performed through `tx`.
    async fn rollback(&self, tx: Self::Tx) -> Result<(), VotesRepositoryError>;
}
