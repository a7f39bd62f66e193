//! The ordered set of physical roots searched during lookup.
//!
//! From highest to lowest priority:
//!
//! 1. the user override root (if configured and present on disk),
//! 2. every active package root, last-activated first,
//! 3. the fallback package root (if that package exists, active or not),
//! 4. the built-in data root.
//!
//! The built-in root does not serve anything under its `mods/` directory:
//! package content is only reachable through the package's own root, so an
//! inactive package cannot leak in through the data directory.
//!
//! A [`PathSet`] is computed once per activation order and replaced wholesale
//! when the active set changes; it is never patched in place.

use crate::catalog::PackageSource;
use crate::session::PACKAGES_DIR_NAME;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fmt;

/// What a root directory represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum RootKind {
    /// User-writable override directory. Always searched first.
    Override,
    /// Root of an active package.
    Package(String),
    /// Root of the reserved fallback package.
    Fallback(String),
    /// The engine's built-in data directory. Always searched last.
    Builtin,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootKind::Override => f.write_str("override"),
            RootKind::Package(name) => write!(f, "package '{}'", name),
            RootKind::Fallback(name) => write!(f, "fallback '{}'", name),
            RootKind::Builtin => f.write_str("builtin"),
        }
    }
}

/// A physical directory taking part in the overlay search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Root {
    pub kind: RootKind,
    pub dir: Utf8PathBuf,
}

impl Root {
    /// Physical path of the normalized logical `key` under this root, or
    /// `None` if this root never serves it.
    pub fn join(&self, key: &str) -> Option<Utf8PathBuf> {
        if self.kind == RootKind::Builtin && is_package_tree(key) {
            return None;
        }
        Some(self.dir.join(key))
    }
}

fn is_package_tree(key: &str) -> bool {
    key.split('/').next() == Some(PACKAGES_DIR_NAME)
}

/// Search roots ordered highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    roots: Vec<Root>,
    have_fallback: bool,
}

impl PathSet {
    /// Build the root ordering for `activation_order`.
    ///
    /// Package roots are looked up through `source`; a name without a root is
    /// skipped with a warning (the resolver has already rejected such names).
    /// If the fallback package is itself activated it keeps only its
    /// activated position.
    pub fn build<S: PackageSource + ?Sized>(
        activation_order: &[String],
        source: &S,
        fallback_name: &str,
        override_dir: Option<&Utf8Path>,
        builtin_dir: Option<&Utf8Path>,
    ) -> Self {
        let mut roots = Vec::with_capacity(activation_order.len() + 3);

        if let Some(dir) = override_dir {
            if dir.as_std_path().is_dir() {
                roots.push(Root {
                    kind: RootKind::Override,
                    dir: dir.to_path_buf(),
                });
            } else {
                tracing::debug!("Override root {} does not exist, skipping", dir);
            }
        }

        for name in activation_order.iter().rev() {
            match source.root(name) {
                Some(dir) => roots.push(Root {
                    kind: RootKind::Package(name.clone()),
                    dir,
                }),
                None => tracing::warn!("Active package '{}' has no root, skipping", name),
            }
        }

        let fallback_root = source.root(fallback_name);
        let have_fallback = fallback_root.is_some();
        if let Some(dir) = fallback_root {
            if !activation_order.iter().any(|name| name == fallback_name) {
                roots.push(Root {
                    kind: RootKind::Fallback(fallback_name.to_string()),
                    dir,
                });
            }
        }

        if let Some(dir) = builtin_dir {
            roots.push(Root {
                kind: RootKind::Builtin,
                dir: dir.to_path_buf(),
            });
        }

        tracing::debug!(
            "Search roots: {}",
            roots
                .iter()
                .map(|root| format!("{} ({})", root.kind, root.dir))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            roots,
            have_fallback,
        }
    }

    /// Roots in search order, highest priority first.
    pub fn roots(&self) -> &[Root] {
        &self.roots
    }

    /// Roots lowest priority first, the order later roots override earlier ones in.
    pub fn ascending(&self) -> impl Iterator<Item = &Root> {
        self.roots.iter().rev()
    }

    /// Whether the fallback package exists on disk, whether or not it is activated.
    pub fn have_fallback(&self) -> bool {
        self.have_fallback
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
