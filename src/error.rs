//! Error types for the cache and its host shell
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by snapshot persistence.
///
/// Get/Set/Iterate are total and never produce one of these.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Snapshot file exists but could not be read
    #[error("Failed to read snapshot {}: {source}", .path.display())]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot file could not be written or moved into place
    #[error("Failed to write snapshot {}: {source}", .path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot content is not a well-formed document
    #[error("Malformed snapshot {}: {source}", .path.display())]
    SnapshotDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Selected entries could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    SnapshotEncode(#[source] serde_json::Error),
}

// == Command Error Enum ==
/// Errors surfaced to the user by the command layer.
#[derive(Error, Debug)]
pub enum CommandError {
    /// First word did not name a known command
    #[error("Unknown command: {0}")]
    Unknown(String),

    /// Command needs a name argument, e.g. `inspect pikachu`
    #[error("Please specify a Pokemon to {0}.")]
    MissingArgument(&'static str),

    /// A stored record could not be decoded
    #[error("Error decoding stored record for {name}: {source}")]
    Record {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing to the output sink failed
    #[error("Output error: {0}")]
    Output(#[from] io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
