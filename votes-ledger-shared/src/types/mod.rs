mod counter;
mod target;
mod vote_record;
mod vote_state;
mod vote_type;
mod votes_count;

pub use counter::{CountDelta, CounterField};
pub use target::{Target, TargetId, TargetType};
pub use vote_record::{VoteKey, VoteRecord, VoterId};
pub use vote_state::{VoteState, VoteStatus};
pub use vote_type::VoteType;
pub use votes_count::VotesCount;
