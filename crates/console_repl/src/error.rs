//! Host error types.

use std::io;
use std::path::PathBuf;

use dev_console::ConsoleError;
use thiserror::Error;

/// Failures that stop the console host before or while it runs.
///
/// Console-level failures (unknown commands, faulting bodies) never surface here; they are
/// reported inside the transcript.
#[derive(Debug, Error)]
pub enum ReplError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        /// Config path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// Invalid command-line arguments.
    #[error("{0}")]
    Usage(String),
    /// A host command could not be registered.
    #[error(transparent)]
    Console(#[from] ConsoleError),
    /// Terminal I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ReplError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

/// Convenience result type for the host.
pub type ReplResult<T> = Result<T, ReplError>;
