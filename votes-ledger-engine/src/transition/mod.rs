//! The vote state machine.
//!
//! Requesting the vote already held removes it, requesting the opposite one
//! switches it, and requesting any vote without holding one inserts it. Each
//! transition carries the single ledger operation and the counter
//! adjustments that keep the counters equal to the ledger.
use uuid::Uuid;
use votes_ledger_shared::types::{CountDelta, CounterField, VoteRecord, VoteState, VoteType};

/// The single ledger mutation a transition performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    Insert(VoteType),
    UpdateType { id: Uuid, vote_type: VoteType },
    Delete { id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterAdjustment {
    pub field: CounterField,
    pub delta: CountDelta,
}

impl CounterAdjustment {
    fn increment(vote_type: VoteType) -> Self {
        Self {
            field: vote_type.into(),
            delta: CountDelta::Increment,
        }
    }

    fn decrement(vote_type: VoteType) -> Self {
        Self {
            field: vote_type.into(),
            delta: CountDelta::Decrement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub previous: VoteState,
    pub next: VoteState,
    pub ledger: LedgerOp,
    pub adjustments: Vec<CounterAdjustment>,
}

impl Transition {
    /// Net change applied to `field` by this transition.
    pub fn net_delta(&self, field: CounterField) -> i64 {
        self.adjustments
            .iter()
            .filter(|a| a.field == field)
            .map(|a| a.delta.as_i64())
            .sum()
    }
}

/// Decides what a `requested` vote does given the voter's existing record.
pub fn resolve(existing: Option<&VoteRecord>, requested: VoteType) -> Transition {
    let previous = VoteState::from_record(existing);
    match existing {
        None => Transition {
            previous,
            next: requested.into(),
            ledger: LedgerOp::Insert(requested),
            adjustments: vec![CounterAdjustment::increment(requested)],
        },
        Some(record) if record.vote_type == requested => Transition {
            previous,
            next: VoteState::NoVote,
            ledger: LedgerOp::Delete { id: record.id },
            adjustments: vec![CounterAdjustment::decrement(requested)],
        },
        Some(record) => Transition {
            previous,
            next: requested.into(),
            ledger: LedgerOp::UpdateType {
                id: record.id,
                vote_type: requested,
            },
            adjustments: vec![
                CounterAdjustment::decrement(record.vote_type),
                CounterAdjustment::increment(requested),
            ],
        },
    }
}
