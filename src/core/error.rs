use thiserror::Error;

use crate::core::types::{ItemTypeId, Timestamp};

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("`{0}` is not a valid buffer group")]
    InvalidBufferGroup(String),

    #[error("silo already tracking type {0}")]
    DuplicateSilo(ItemTypeId),

    #[error("silo not currently tracking type {0}")]
    UnknownSilo(ItemTypeId),

    #[error("invalid type id {0}")]
    UnknownType(ItemTypeId),

    #[error("invalid structure state: {0}")]
    InvalidState(String),

    #[error("cannot exit reinforcement {remaining}s before {exit_at}")]
    ReinforcementTiming { exit_at: Timestamp, remaining: i64 },

    #[error("resource {0} is not tracked")]
    UntrackedResource(ItemTypeId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    CatalogError(#[from] crate::catalog::CatalogLoadError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
