use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a question or answer, as issued by the content store.
pub type TargetId = String;

/// The kind of entity a vote is cast on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Question,
    Answer,
}

impl TargetType {
    pub const ALL: [TargetType; 2] = [TargetType::Question, TargetType::Answer];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Question => "question",
            TargetType::Answer => "answer",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A votable entity: a question or an answer, addressed by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: TargetId,
    pub target_type: TargetType,
}

impl Target {
    pub fn new(id: impl Into<TargetId>, target_type: TargetType) -> Self {
        Self {
            id: id.into(),
            target_type,
        }
    }

    pub fn question(id: impl Into<TargetId>) -> Self {
        Self::new(id, TargetType::Question)
    }

    pub fn answer(id: impl Into<TargetId>) -> Self {
        Self::new(id, TargetType::Answer)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.id)
    }
}
