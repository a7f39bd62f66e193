//! Package metadata for the modkit overlay engine.
//!
//! A package ("mod") is a directory of content files with an optional
//! `settings.txt` manifest declaring its description, target game, engine
//! compatibility range and dependencies. This crate reads those manifests and
//! the ordered active-package list (`mods.txt`); ordering and file lookup live
//! in `modkit_overlay`.

mod active_list;
mod descriptor;
pub mod error;
pub mod reader;
mod version;

pub use active_list::{find_active_list, parse_active_list, read_active_list};
pub use descriptor::{validate_package_name, LoadedDescriptor, ManifestWarning, PackageDescriptor};
pub use error::{Error, Result};
pub use reader::{Entry, IniReader, KeyValueReader, MalformedLine};
pub use version::{BoundViolation, EngineVersion, VersionRange};

/// File name of the manifest inside each package root.
pub const MANIFEST_FILE_NAME: &str = "settings.txt";

/// File name of the active-package list inside a packages directory.
pub const ACTIVE_LIST_FILE_NAME: &str = "mods.txt";

/// Reserved name of the baseline package that is searched even when not activated.
pub const FALLBACK_PACKAGE: &str = "default";
