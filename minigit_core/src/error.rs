//! Error types for minigit_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using minigit_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during repository and object store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// I/O error with the operation and path that produced it.
    #[error("failed to {op} {path}: {source}")]
    IoAt {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid hash format or encoding.
    #[error("Invalid hash: {reason}")]
    InvalidHash { reason: String },

    /// Object not found in store.
    #[error("Object not found: {hash} (expected at {path})")]
    ObjectNotFound { hash: String, path: PathBuf },

    /// Stored object is not a valid zlib stream.
    #[error("Failed to decode object at {path}: {source}")]
    Decode {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored object has a different type than the accessor expected.
    #[error("Invalid object type: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// A tree payload ended in the middle of an entry.
    #[error("Truncated tree payload: {reason}")]
    TruncatedPayload { reason: String },

    /// Object header is not of the form `<type> <size>\0`.
    #[error("Malformed object: {reason}")]
    MalformedObject { reason: String },

    /// Invalid tree entry.
    #[error("Invalid tree entry: {reason}")]
    InvalidTreeEntry { reason: String },

    /// Repository handle was already initialized.
    #[error("Repository already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    /// Repository is missing or incomplete.
    #[error("Invalid repository at {path}: {reason}")]
    InvalidRepository { path: PathBuf, reason: String },
}

impl Error {
    /// Create an IoAt error.
    pub fn io_at(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoAt {
            op,
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidHash error.
    pub fn invalid_hash(reason: impl Into<String>) -> Self {
        Error::InvalidHash {
            reason: reason.into(),
        }
    }

    /// Create an ObjectNotFound error.
    pub fn object_not_found(hash: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::ObjectNotFound {
            hash: hash.into(),
            path: path.into(),
        }
    }

    /// Create a Decode error.
    pub fn decode(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Decode {
            path: path.into(),
            source,
        }
    }

    /// Create a TypeMismatch error.
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a TruncatedPayload error.
    pub fn truncated(reason: impl Into<String>) -> Self {
        Error::TruncatedPayload {
            reason: reason.into(),
        }
    }

    /// Create a MalformedObject error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedObject {
            reason: reason.into(),
        }
    }

    /// Create an InvalidTreeEntry error.
    pub fn invalid_tree_entry(reason: impl Into<String>) -> Self {
        Error::InvalidTreeEntry {
            reason: reason.into(),
        }
    }

    /// Create an AlreadyInitialized error.
    pub fn already_initialized(path: impl Into<PathBuf>) -> Self {
        Error::AlreadyInitialized { path: path.into() }
    }

    /// Create an InvalidRepository error.
    pub fn invalid_repository(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidRepository {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// Additional From implementations for external error types

impl From<ignore::Error> for Error {
    fn from(err: ignore::Error) -> Self {
        match err {
            ignore::Error::WithPath { path, err } => Error::io_at("walk", path, walk_io_error(*err)),
            ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
                Error::from(*err)
            }
            other => Error::Io {
                source: walk_io_error(other),
            },
        }
    }
}

/// Unwrap the underlying I/O error of a walk error, keeping it intact.
fn walk_io_error(err: ignore::Error) -> std::io::Error {
    match err {
        ignore::Error::Io(source) => source,
        ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. }
        | ignore::Error::WithPath { err, .. } => walk_io_error(*err),
        other => std::io::Error::other(other),
    }
}
