use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The scan root itself could not be opened. Per-entry failures during
    /// traversal are logged and skipped, never surfaced as this variant.
    #[error("Cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A move/delete/mkdir against the filesystem failed. Recorded as a
    /// `failed` operation status at the resume/router boundary.
    #[error("Filesystem operation on {path} failed: {source}")]
    Mutation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A journal write failed. Surfaced hard: a silently lost journal write
    /// would void the crash-recovery guarantee.
    #[error("Journal write to {path} failed: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A session file on disk is not valid JSON.
    #[error("Malformed session file {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn mutation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Mutation {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }
}
