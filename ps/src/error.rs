//! Style storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving style files
#[derive(Debug, Error)]
pub enum StyleError {
    #[error("Failed to read style file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write style file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to back up style file {path}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed style file {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid style file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}
