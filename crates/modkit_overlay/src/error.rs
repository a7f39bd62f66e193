//! Error types for resolution and lookup.
//!
//! Fatal resolution failures ([`Error::MissingPackage`], [`Error::DependencyCycle`])
//! abort session startup. [`Error::InvalidPath`] only fails the single lookup
//! it was raised for. A file that no root provides is not an error at all:
//! `locate` returns `Ok(None)` and `list` an empty vector.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving packages or looking up files.
#[derive(Error, Debug)]
pub enum Error {
    /// A requested or depended-on package has no directory in any packages root.
    #[error("{}", missing_package_message(.name, .required_by.as_deref()))]
    MissingPackage {
        name: String,
        /// The package whose `depends` named it, or `None` if it was requested directly.
        required_by: Option<String>,
    },

    /// Circular dependency. Members are listed in expansion order, starting
    /// with the package that was revisited.
    #[error("Dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// A logical path tried to leave the configured roots or was malformed.
    #[error("Invalid logical path: '{0}'")]
    InvalidPath(String),

    /// The built-in data directory does not exist.
    #[error("Data directory not found: {0}")]
    InvalidDataDir(Utf8PathBuf),

    /// A manifest or active list could not be read.
    #[error("Manifest error: {0}")]
    Manifest(#[from] modkit_manifest::Error),

    /// Filesystem I/O failed while scanning package directories.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn missing_package_message(name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(parent) => format!(
            "Package '{}' not found (required by '{}')",
            name, parent
        ),
        None => format!("Package '{}' not found", name),
    }
}
