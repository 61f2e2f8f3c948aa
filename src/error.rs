//! Error types for frequent pair mining.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiningError {
    #[error("Cannot open dataset {path}: {source}")]
    DatasetUnavailable { path: PathBuf, source: io::Error },

    #[error("Failed to read dataset: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed basket {index}: {token:?} is not an item id")]
    MalformedBasket { index: usize, token: String },

    #[error("No pairs were observed in pass one")]
    EmptyInput,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl MiningError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MiningError::InvalidParameter(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MiningError>;
