// App state for the Axum server
use std::sync::Arc;

use votes_ledger_engine::{
    CountsCache, InvalidateVotes, InvalidationFanout, VoteCoordinator, VoteQuery,
};
use votes_ledger_repository::VotesRepository;

pub struct AppState<R: VotesRepository> {
    pub coordinator: Arc<VoteCoordinator<R>>,
    pub query: Arc<VoteQuery<R>>,
}

impl<R: VotesRepository> AppState<R> {
    /// Builds the coordinator and the query over one shared repository.
    ///
    /// A committed vote evicts the target from `cache` before the coordinator
    /// returns, then notifies `invalidator`.
    pub fn new(
        repository: Arc<R>,
        invalidator: Arc<dyn InvalidateVotes>,
        cache: Arc<CountsCache>,
    ) -> Self {
        let sinks: Vec<Arc<dyn InvalidateVotes>> = vec![cache.clone(), invalidator];
        let invalidation = Arc::new(InvalidationFanout::new(sinks));
        Self {
            coordinator: Arc::new(VoteCoordinator::new(repository.clone(), invalidation)),
            query: Arc::new(VoteQuery::new(repository, cache)),
        }
    }
}

impl<R: VotesRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            query: self.query.clone(),
        }
    }
}
