use serde::{Deserialize, Serialize};

use crate::types::{CounterField, Target, TargetId, TargetType};

/// Represents the aggregated vote counts stored on a question or answer.
///
/// Both counters must equal the number of ledger records of the matching
/// vote type for the target once a vote transaction commits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotesCount {
    pub target_id: TargetId,
    pub target_type: TargetType,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesCount {
    pub fn zero(target: &Target) -> Self {
        Self {
            target_id: target.id.clone(),
            target_type: target.target_type,
            upvotes: 0,
            downvotes: 0,
        }
    }

    pub fn target(&self) -> Target {
        Target::new(self.target_id.clone(), self.target_type)
    }

    /// Adds the net `delta` of one transaction to `field`.
    pub fn apply(&mut self, field: CounterField, delta: i64) {
        match field {
            CounterField::Upvotes => self.upvotes += delta,
            CounterField::Downvotes => self.downvotes += delta,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.upvotes < 0 || self.downvotes < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CountDelta;

    #[test]
    fn test_apply_switch_deltas() {
        let mut count = VotesCount {
            upvotes: 1,
            ..VotesCount::zero(&Target::answer("a-1"))
        };

        count.apply(CounterField::Upvotes, CountDelta::Decrement.as_i64());
        count.apply(CounterField::Downvotes, CountDelta::Increment.as_i64());

        assert_eq!((count.upvotes, count.downvotes), (0, 1));
        assert!(!count.is_negative());

        count.apply(CounterField::Upvotes, -1);
        assert!(count.is_negative());
    }
}
