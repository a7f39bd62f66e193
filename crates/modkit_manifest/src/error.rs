//! Error types for manifest and active-list reading.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading package metadata from disk.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed while reading a manifest or the active list.
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid key/value text.
    #[error("Malformed manifest '{path}': {message}")]
    Parse { path: Utf8PathBuf, message: String },

    /// A package name is empty or cannot name a directory.
    #[error("Invalid package name: '{0}'")]
    InvalidName(String),

    /// An engine version string is not `major.minor`.
    #[error("Invalid engine version: '{0}'")]
    InvalidVersion(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
