use thiserror::Error;

use crate::matching::ProviderError;

#[derive(Error, Debug)]
pub enum IdentifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("Corrupt cache snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, IdentifyError>;
