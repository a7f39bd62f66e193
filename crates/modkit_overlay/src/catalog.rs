//! Package discovery.
//!
//! [`PackageSource`] is what the resolver needs to know about packages: where
//! a package lives and what its manifest says. [`PackageCatalog`] answers those
//! questions from one or more packages directories on disk.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use modkit_manifest::{
    validate_package_name, LoadedDescriptor, PackageDescriptor, MANIFEST_FILE_NAME,
};
use std::collections::{BTreeSet, HashMap};

/// Abstracts how packages are found and their descriptors read.
///
/// Methods that read manifests take `&mut self` so implementations can
/// memoize descriptors; a descriptor is immutable once read.
pub trait PackageSource {
    /// Physical root directory of package `name`, if it exists.
    fn root(&self, name: &str) -> Option<Utf8PathBuf>;

    /// Read the descriptor of package `name`. `Ok(None)` means there is no such
    /// package, including a directory that has no manifest.
    fn load(&mut self, name: &str) -> Result<Option<LoadedDescriptor>>;

    /// Whether a package named `name` exists, active or not.
    fn contains(&self, name: &str) -> bool {
        self.root(name).is_some()
    }
}

/// Filesystem-backed [`PackageSource`].
///
/// Packages are subdirectories of the packages directories given at
/// construction. Directories are searched in order, so a package present in
/// an earlier directory shadows one of the same name in a later directory:
///
/// ```text
/// <user>/mods/
///   core/            # shadows <data>/mods/core
///     settings.txt
/// <data>/mods/
///   default/         # fallback package
///   core/
///     settings.txt
///     maps/town.txt
/// ```
pub struct PackageCatalog {
    packages_dirs: Vec<Utf8PathBuf>,
    descriptors: HashMap<String, LoadedDescriptor>,
}

impl PackageCatalog {
    /// Create a catalog over `packages_dirs`, highest precedence first.
    pub fn new(packages_dirs: Vec<Utf8PathBuf>) -> Self {
        Self {
            packages_dirs,
            descriptors: HashMap::new(),
        }
    }

    pub fn packages_dirs(&self) -> &[Utf8PathBuf] {
        &self.packages_dirs
    }

    /// Names of every package, deduplicated and sorted.
    ///
    /// Only directories holding a manifest count. Packages directories that
    /// do not exist are skipped.
    pub fn available(&self) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();

        for dir in &self.packages_dirs {
            if !dir.as_std_path().is_dir() {
                continue;
            }
            for entry in dir.read_dir_utf8()? {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry in {}: {}", dir, e);
                        continue;
                    }
                };
                if !entry.path().join(MANIFEST_FILE_NAME).as_std_path().is_file() {
                    continue;
                }
                let name = entry.file_name();
                if validate_package_name(name).is_ok() {
                    names.insert(name.to_string());
                }
            }
        }

        Ok(names.into_iter().collect())
    }

    /// Whether the reserved fallback package `fallback_name` exists on disk.
    pub fn have_fallback(&self, fallback_name: &str) -> bool {
        self.contains(fallback_name)
    }

    fn find_root(&self, name: &str) -> Option<&Utf8Path> {
        if validate_package_name(name).is_err() {
            return None;
        }
        self.packages_dirs
            .iter()
            .find(|dir| dir.join(name).as_std_path().is_dir())
            .map(|dir| dir.as_path())
    }
}

impl PackageSource for PackageCatalog {
    fn root(&self, name: &str) -> Option<Utf8PathBuf> {
        self.find_root(name).map(|dir| dir.join(name))
    }

    fn load(&mut self, name: &str) -> Result<Option<LoadedDescriptor>> {
        if let Some(loaded) = self.descriptors.get(name) {
            return Ok(Some(loaded.clone()));
        }

        let Some(root) = self.root(name) else {
            return Ok(None);
        };

        let Some(loaded) = PackageDescriptor::load(&root)? else {
            tracing::debug!("'{}' at {} has no {}, not a package", name, root, MANIFEST_FILE_NAME);
            return Ok(None);
        };
        tracing::debug!(
            "Loaded package '{}' from {} (depends: [{}])",
            name,
            root,
            loaded.descriptor.depends.join(", ")
        );
        self.descriptors.insert(name.to_string(), loaded.clone());
        Ok(Some(loaded))
    }
}
