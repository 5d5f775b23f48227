//! Error types for the log tail library.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for log tail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors while reading the followed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// The separator was not a single ASCII character.
    #[error("Invalid separator {value:?}: expected exactly one single-byte character")]
    InvalidSeparator { value: String },

    /// The processing chunk size was zero.
    #[error("Invalid chunk size: must be greater than zero")]
    InvalidChunkSize,

    /// The source could not be stat'ed at construction, so no starting offset exists.
    #[error("Source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File path errors.
    #[error("Invalid file path: {message}")]
    InvalidPath { message: String },

    /// The background follow task panicked or was aborted.
    #[error("Follow task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Stream has been closed or dropped.
    #[error("Stream closed")]
    StreamClosed,
}

/// A convenient Result type for log tail operations.
pub type Result<T> = std::result::Result<T, Error>;
