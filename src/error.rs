//! Error types for dltriage

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("Cannot read source directory {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot create destination directory {path}: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;

/// Failures of a single triage action. These are reported and the run moves on.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Could not delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("An unexpected error occurred while renaming the file: {0}")]
    Rename(#[source] io::Error),

    #[error("Could not move {renamed} into the destination folder: {source}")]
    Move {
        renamed: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} already exists; the file was not moved")]
    DestinationTaken(PathBuf),
}
