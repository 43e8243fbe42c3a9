//! Crate-wide error and result types

use thiserror::Error;

/// Errors produced by the fine-tuning pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Checkpoint not found: experiment '{experiment}' cycle {cycle}")]
    CheckpointNotFound { experiment: String, cycle: usize },

    #[error("Training error: {0}")]
    Train(String),

    #[error("Evaluation error: {0}")]
    Eval(String),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
