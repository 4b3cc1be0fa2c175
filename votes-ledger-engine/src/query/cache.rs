use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use votes_ledger_shared::types::{Target, VotesCount};

use crate::invalidation::InvalidateVotes;

/// Entries kept when no capacity is given.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Default)]
struct CacheState {
    entries: HashMap<Target, VotesCount>,
    /// Bumped on every eviction so loads that raced with one are dropped.
    generation: u64,
}

/// Read-through cache of target counters.
///
/// Holds at most `capacity` targets; inserting a new target into a full
/// cache drops an arbitrary entry. Invalidating a target evicts it before
/// `invalidate` returns.
pub struct CountsCache {
    state: RwLock<CacheState>,
    capacity: usize,
}

impl Default for CountsCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl CountsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, target: &Target) -> Option<VotesCount> {
        self.state.read().await.entries.get(target).cloned()
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Stores `count` unless an eviction happened since `generation` was read.
    pub async fn insert_if_current(&self, count: VotesCount, generation: u64) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        let target = count.target();
        if state.entries.len() >= self.capacity && !state.entries.contains_key(&target) {
            if let Some(victim) = state.entries.keys().next().cloned() {
                state.entries.remove(&victim);
            }
        }
        state.entries.insert(target, count);
        true
    }

    pub async fn evict(&self, target: &Target) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.entries.remove(target);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

#[async_trait]
impl InvalidateVotes for CountsCache {
    async fn invalidate(&self, target: &Target) {
        self.evict(target).await;
    }
}
