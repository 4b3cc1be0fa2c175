//! Signals that cached vote counts of a target are stale.
//!
//! The coordinator awaits `InvalidateVotes::invalidate` after every committed
//! vote, before reporting success. `InvalidationFanout` forwards the signal to
//! the in-process `CountsCache` and to `BroadcastInvalidator`, which publishes
//! it to any number of external subscribers.
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use votes_ledger_shared::types::Target;

/// Emitted once per committed vote on `target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotesInvalidated {
    pub target: Target,
    pub invalidated_at: u64,
}

#[async_trait]
pub trait InvalidateVotes: Send + Sync {
    async fn invalidate(&self, target: &Target);
}

/// Invalidates every sink in order.
pub struct InvalidationFanout {
    sinks: Vec<Arc<dyn InvalidateVotes>>,
}

impl InvalidationFanout {
    pub fn new(sinks: Vec<Arc<dyn InvalidateVotes>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl InvalidateVotes for InvalidationFanout {
    async fn invalidate(&self, target: &Target) {
        for sink in &self.sinks {
            sink.invalidate(target).await;
        }
    }
}

pub struct BroadcastInvalidator {
    sender: broadcast::Sender<VotesInvalidated>,
}

impl BroadcastInvalidator {
    /// Creates an invalidator buffering up to `capacity` undelivered events
    /// per subscriber. Slow subscribers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VotesInvalidated> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl InvalidateVotes for BroadcastInvalidator {
    async fn invalidate(&self, target: &Target) {
        let event = VotesInvalidated {
            target: target.clone(),
            invalidated_at: chrono::Utc::now().timestamp_millis().max(0) as u64,
        };
        match self.sender.send(event) {
            Ok(receivers) => debug!(vote_target = %target, receivers, "Vote counts invalidated"),
            // Nobody is listening; nothing to notify.
            Err(_) => debug!(vote_target = %target, "No invalidation subscribers"),
        }
    }
}
