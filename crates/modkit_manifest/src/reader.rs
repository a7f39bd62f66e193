//! Line-oriented key/value reading.
//!
//! Manifest parsing is written against the [`KeyValueReader`] trait so the
//! descriptor logic does not care where the `(key, value)` pairs come from.
//! [`IniReader`] is the filesystem implementation, backed by `rust-ini`.
//!
//! Every line is read on its own. A line that is neither a comment, a
//! section header nor a `key=value` record is reported as a
//! [`MalformedLine`] and skipped; it never swallows the line after it.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ini::{Ini, ParseOption};

/// One `key=value` record together with the section it appeared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub section: Option<String>,
    pub key: String,
    pub value: String,
}

/// A line that could not be read as a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    pub section: Option<String>,
    pub text: String,
}

/// A source of `(key, value)` records read in file order.
///
/// The reader also reports the file it reads from and the section of the
/// record most recently returned, so callers can attach context to diagnostics.
pub trait KeyValueReader {
    /// The file the records come from.
    fn file_name(&self) -> &Utf8Path;

    /// Section of the record most recently returned by [`next_entry`](Self::next_entry).
    fn section(&self) -> Option<&str>;

    /// Return the next record, or `None` when the file is exhausted.
    fn next_entry(&mut self) -> Option<Entry>;

    /// Lines that were skipped because they hold no record.
    fn malformed_lines(&self) -> &[MalformedLine] {
        &[]
    }
}

/// [`KeyValueReader`] over an INI-style text file.
///
/// Quote and escape processing are disabled: values are taken verbatim, which
/// is what free-text fields such as `description` expect.
pub struct IniReader {
    path: Utf8PathBuf,
    entries: std::vec::IntoIter<Entry>,
    section: Option<String>,
    malformed: Vec<MalformedLine>,
}

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Copy `contents` line for line, blanking lines without a separator.
///
/// rust-ini would otherwise read such a line as the start of a key that runs
/// on into the next line.
fn split_records(contents: &str) -> (String, Vec<MalformedLine>) {
    let mut records = String::with_capacity(contents.len());
    let mut malformed = Vec::new();
    let mut section = None;

    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        let keep = if trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
            true
        } else if let Some(rest) = trimmed.strip_prefix('[') {
            section = rest.strip_suffix(']').map(|name| name.trim().to_string());
            true
        } else {
            trimmed.contains(['=', ':'])
        };

        if keep {
            records.push_str(line);
        } else {
            malformed.push(MalformedLine {
                line: index + 1,
                section: section.clone(),
                text: trimmed.to_string(),
            });
        }
        records.push('\n');
    }

    (records, malformed)
}

impl IniReader {
    /// Read and parse the file at `path`.
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path.as_std_path()).map_err(|e| Error::io(path, e))?;
        Self::parse(path.to_path_buf(), &contents)
    }

    /// Parse in-memory text, reporting `path` as its file name.
    pub fn parse(path: impl Into<Utf8PathBuf>, contents: &str) -> Result<Self> {
        let path = path.into();
        let (records, malformed) = split_records(contents);
        let ini = Ini::load_from_str_opt(&records, parse_options()).map_err(|err| Error::Parse {
            path: path.clone(),
            message: err.to_string(),
        })?;
        Ok(Self::from_ini(path, &ini, malformed))
    }

    fn from_ini(path: Utf8PathBuf, ini: &Ini, malformed: Vec<MalformedLine>) -> Self {
        let mut entries = Vec::new();
        for (section, properties) in ini.iter() {
            for (key, value) in properties.iter() {
                entries.push(Entry {
                    section: section.map(str::to_string),
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                });
            }
        }

        Self {
            path,
            entries: entries.into_iter(),
            section: None,
            malformed,
        }
    }
}

impl KeyValueReader for IniReader {
    fn file_name(&self) -> &Utf8Path {
        &self.path
    }

    fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    fn next_entry(&mut self) -> Option<Entry> {
        let entry = self.entries.next()?;
        self.section = entry.section.clone();
        Some(entry)
    }

    fn malformed_lines(&self) -> &[MalformedLine] {
        &self.malformed
    }
}
