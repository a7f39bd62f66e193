//! The active-package list (`mods.txt`).
//!
//! One package name per line. Blank lines and lines starting with `#` are
//! skipped; surrounding whitespace is trimmed. Order is significant: it is
//! the order the user asked packages to be applied in.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Parse the contents of an active-package list.
pub fn parse_active_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read an active-package list from `path`.
pub fn read_active_list(path: &Utf8Path) -> Result<Vec<String>> {
    let contents =
        std::fs::read_to_string(path.as_std_path()).map_err(|e| Error::io(path, e))?;
    let names = parse_active_list(&contents);
    tracing::debug!("Read {} active package(s) from {}", names.len(), path);
    Ok(names)
}

/// Return the first of `candidates` that exists as a file.
///
/// Callers pass the user's list before the bundled one so a user selection
/// replaces the shipped default entirely.
pub fn find_active_list<'a>(
    candidates: impl IntoIterator<Item = &'a Utf8PathBuf>,
) -> Option<&'a Utf8PathBuf> {
    candidates
        .into_iter()
        .find(|path| path.as_std_path().is_file())
}
