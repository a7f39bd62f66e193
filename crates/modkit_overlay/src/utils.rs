//! Logical path normalization.
//!
//! Callers name files with generic relative paths (`maps/town.txt`) that are
//! joined onto every root during lookup. These helpers make sure such a path
//! can never address anything outside the root it is joined to.

use crate::error::{Error, Result};

/// Normalize a logical path, rejecting anything that could escape a root.
///
/// - Backslashes become `/` so lookups behave the same on every platform.
/// - `.` segments are dropped.
/// - Empty paths, absolute paths, `..` segments, empty segments (`a//b`) and
///   drive or scheme prefixes (anything containing `:`) are rejected.
///
/// Runs before any filesystem access.
pub fn normalize_logical_path(path: &str) -> Result<String> {
    let invalid = || Error::InvalidPath(path.to_string());

    let normalized = path.replace('\\', "/");
    if normalized.is_empty() || normalized.starts_with('/') {
        return Err(invalid());
    }

    let mut segments = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | ".." => return Err(invalid()),
            "." => continue,
            s if s.contains(':') => return Err(invalid()),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(invalid());
    }
    Ok(segments.join("/"))
}

/// Like [`normalize_logical_path`], but tolerates one trailing `/` as used
/// when naming a directory prefix.
pub fn normalize_logical_prefix(prefix: &str) -> Result<String> {
    let trimmed = prefix
        .strip_suffix('/')
        .or_else(|| prefix.strip_suffix('\\'))
        .unwrap_or(prefix);
    normalize_logical_path(trimmed).map_err(|_| Error::InvalidPath(prefix.to_string()))
}
