//! Error types for filewire
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::Verb;

/// Result type alias using FileWireError
pub type Result<T> = std::result::Result<T, FileWireError>;

/// Unified error type for filewire operations
#[derive(Debug, Error)]
pub enum FileWireError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Filesystem Errors (server side, keyed by the path as the client sent it)
    // -------------------------------------------------------------------------
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Path already exists: {0}")]
    AlreadyExists(String),

    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// Anything the host reported that has no dedicated variant
    #[error("{source}")]
    Filesystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Missing argument for {verb}: usage {}", .verb.usage())]
    MissingArgument { verb: Verb },

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Cannot read local file '{}': {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FileWireError {
    /// Classify a host I/O error raised while touching `path`.
    pub fn from_io(source: std::io::Error, path: &str) -> Self {
        use std::io::ErrorKind;

        let path = path.to_string();
        match source.kind() {
            ErrorKind::NotFound => FileWireError::NotFound(path),
            ErrorKind::PermissionDenied => FileWireError::PermissionDenied(path),
            ErrorKind::AlreadyExists => FileWireError::AlreadyExists(path),
            _ => FileWireError::Filesystem { path, source },
        }
    }

    /// True when the error means the peer went away mid-exchange
    pub fn is_disconnect(&self) -> bool {
        use std::io::ErrorKind;

        match self {
            FileWireError::Io(e) => matches!(
                e.kind(),
                ErrorKind::UnexpectedEof
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True when a configured socket timeout fired
    pub fn is_timeout(&self) -> bool {
        use std::io::ErrorKind;

        match self {
            // Windows reports TimedOut, unix reports WouldBlock
            FileWireError::Io(e) => matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut),
            _ => false,
        }
    }
}
