use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One model's answer to one question, as read from the input table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRow {
    /// Identifier shared by every answer to the same question
    pub question_id: String,
    /// The question as shown to the reviewer
    pub question_text: String,
    /// Name of the model that produced the response
    pub llm: String,
    /// The generated answer
    pub response: String,
}

/// A quality rating on the 1 (poor) to 5 (excellent) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Value a score control shows the first time it is exposed
    pub const DEFAULT: Score = Score(3);

    pub fn new(value: i64) -> Result<Self, ScoreError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreError::OutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rating for one (question, model) pair. Also the row layout of the export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub question_id: String,
    pub llm: String,
    pub score: Score,
}

impl ScoreEntry {
    pub fn new(question_id: impl Into<String>, llm: impl Into<String>, score: Score) -> Self {
        Self {
            question_id: question_id.into(),
            llm: llm.into(),
            score,
        }
    }

    /// Whether this entry rates the given (question, model) pair
    pub fn is_for(&self, question_id: &str, llm: &str) -> bool {
        self.question_id == question_id && self.llm == llm
    }
}
