//! Runtime error type.

use std::path::PathBuf;

use org_layout_engine::LayoutError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A source record could not be interpreted as an org node.
    #[error("invalid source record: {0}")]
    InvalidRecord(String),

    #[error("node {id:?} references missing parent {parent:?}")]
    MissingParent { id: String, parent: String },

    #[error("source records contain no root node")]
    NoRoot,

    #[error("source records contain several roots: {0:?}")]
    MultipleRoots(Vec<String>),

    #[error("invalid override {key}={value:?}: {reason}")]
    InvalidOverride {
        key: String,
        value: String,
        reason: String,
    },

    #[error("snapshot {path:?} failed verification: {reason}")]
    SnapshotCorrupt { path: PathBuf, reason: String },

    #[error("nondeterministic layout: run 1 hash {first}, run 2 hash {second}")]
    Nondeterministic { first: String, second: String },
}
