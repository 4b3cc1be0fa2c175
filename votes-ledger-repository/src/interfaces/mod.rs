//! This module defines and re-exports the interfaces for the votes repository.
//! It serves as a central point for accessing traits related to data interaction.
mod counter_updater;
mod transaction;
mod vote_record_store;

pub use counter_updater::CounterUpdater;
pub use transaction::TransactionProvider;
pub use vote_record_store::VoteRecordStore;

/// A storage backend able to serve the whole vote subsystem: the ledger and
/// the counters share one transaction type, so both can be written atomically.
pub trait VotesRepository: VoteRecordStore + CounterUpdater {}

impl<T> VotesRepository for T where T: VoteRecordStore + CounterUpdater {}
