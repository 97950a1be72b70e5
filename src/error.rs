use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading the response table. All of them halt the session
/// before anything is rendered.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Error loading data from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing CSV data from '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file must contain a '{0}' column")]
    MissingColumn(&'static str),

    #[error("No data available in '{0}'. Please check your CSV file.")]
    Empty(PathBuf),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        // csv wraps I/O failures in its own error; keep them classified as I/O
        if let csv::ErrorKind::Io(io) = source.kind() {
            return Self::io(path, std::io::Error::new(io.kind(), io.to_string()));
        }
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SaveError {
    #[error("No scores to save for question {question_id}.")]
    NoScores { question_id: String },

    #[error("No questions found in data.")]
    NoQuestion,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Score must be between 1 and 5, got {0}")]
    OutOfRange(i64),
}

/// Input typed at the prompt that does not name a known action.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error(transparent)]
    Score(#[from] ScoreError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("default_score must be between 1 and 5, got {0}")]
    InvalidDefaultScore(i64),
}
