use std::io;
use thiserror::Error;

/// Coarse classification of a [`ShellError`], used when deciding how a
/// failure propagates through a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed arguments. Command-local, never fatal.
    Usage,
    /// Unknown command, missing file or directory. Halts the stage/chain.
    NotFound,
    /// Job service, network or storage failure caught at a handler boundary.
    External,
    /// A persisted snapshot could not be trusted.
    StateCorruption,
}

/// Comprehensive error type for shell operations
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Usage(String),

    #[error("Invalid quoting in command")]
    InvalidQuoting,

    #[error("{0}")]
    External(String),

    #[error("Corrupt session snapshot: {0}")]
    StateCorruption(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ShellError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::External(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::CommandNotFound(_) | ShellError::NotFound(_) => ErrorKind::NotFound,
            ShellError::Usage(_) | ShellError::InvalidQuoting | ShellError::Config(_) => {
                ErrorKind::Usage
            }
            ShellError::External(_) | ShellError::IoError(_) => ErrorKind::External,
            ShellError::StateCorruption(_) | ShellError::Json(_) => ErrorKind::StateCorruption,
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
