//! Error types for the storage collaborators, the editor core and
//! configuration loading.

use std::io;
use std::path::PathBuf;

/// Failures raised by a resource store or scanner.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("a resource already exists at {0}")]
    AlreadyExists(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed resource {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures surfaced by editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Persistence(#[from] StoreError),
    /// A create replayed into a slot that already holds a different region.
    /// History and live state have diverged.
    #[error("atlas region {0} already exists; undo history is out of sync")]
    DuplicateIdentity(String),
    #[error("no source image is selected")]
    NoSource,
    #[error("a drag gesture is in progress")]
    GestureInProgress,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type EditResult<T> = Result<T, EditError>;
