//! Error type shared by every ParkAlloc crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParkError>;

#[derive(Debug, Error)]
pub enum ParkError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Notify error: {0}")]
    Notify(String),
}
