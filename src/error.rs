//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Contract violations in the threshold search input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    #[error("Score {score} is not finite")]
    NonFiniteScore { score: f64 },

    #[error("Bucket at score {score} has no documents")]
    EmptyBucket { score: f64 },

    #[error("Duplicate bucket for score {score}")]
    DuplicateScore { score: f64 },

    #[error("Category document count {declared} does not match bucket total {counted}")]
    CountMismatch { declared: usize, counted: usize },

    #[error("Walk exhausted {buckets} buckets without reaching break-even (b={b}, c={c})")]
    WalkExhausted { buckets: usize, b: usize, c: usize },
}

/// Errors from loading inputs, configuration and running estimations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: invalid document: {source}")]
    DocumentParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: invalid classifier file: {source}")]
    ClassifierParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: invalid config: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
