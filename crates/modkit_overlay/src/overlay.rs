//! File lookup across the search roots.
//!
//! [`OverlayResolver::locate`] answers "which physical file provides this
//! logical path" by walking the roots highest priority first; the first
//! regular file wins and the answer (including "not found") is cached.
//!
//! [`OverlayResolver::list`] walks the roots in the opposite direction, lowest
//! priority first, so the last element of its result is the one `locate`
//! would return. Callers that merge layered files rely on that order. Listing
//! is not cached.
//!
//! The cache is valid for exactly one [`PathSet`]. [`OverlayResolver::rebuild`]
//! replaces the path set and clears the cache; it takes `&mut self`, so it
//! cannot overlap a lookup in progress.

use crate::error::Result;
use crate::paths::{PathSet, RootKind};
use crate::utils::{normalize_logical_path, normalize_logical_prefix};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use walkdir::WalkDir;

/// One root's answer for a logical path, as reported by [`OverlayResolver::explain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// 0-based position in search order (0 is searched first).
    pub order: usize,
    pub kind: RootKind,
    /// The physical path checked under this root.
    pub path: Utf8PathBuf,
    pub exists: bool,
}

/// Resolves logical paths against an ordered [`PathSet`].
#[derive(Debug, Default)]
pub struct OverlayResolver {
    paths: PathSet,
    cache: RwLock<HashMap<String, Option<Utf8PathBuf>>>,
}

impl OverlayResolver {
    pub fn new(paths: PathSet) -> Self {
        Self {
            paths,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The root ordering lookups are served from.
    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    /// Replace the root ordering and drop every cached lookup.
    pub fn rebuild(&mut self, paths: PathSet) {
        let cache = self.cache.get_mut().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("Rebuilding overlay, dropping {} cached lookup(s)", cache.len());
        cache.clear();
        self.paths = paths;
    }

    /// Number of cached lookups, found or not.
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Return the highest-priority physical file for `logical_path`.
    ///
    /// `Ok(None)` means no root provides it. Paths that could escape a root
    /// fail with [`InvalidPath`](crate::Error::InvalidPath) before any
    /// filesystem access.
    pub fn locate(&self, logical_path: &str) -> Result<Option<Utf8PathBuf>> {
        let key = normalize_logical_path(logical_path)?;

        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            tracing::trace!("Cache hit for '{}'", key);
            return Ok(hit.clone());
        }

        let found = self
            .paths
            .roots()
            .iter()
            .filter_map(|root| root.join(&key))
            .find(|candidate| candidate.as_std_path().is_file());

        match &found {
            Some(path) => tracing::debug!("Located '{}' at {}", key, path),
            None => tracing::debug!("'{}' not found in {} root(s)", key, self.paths.len()),
        }

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, found.clone());
        Ok(found)
    }

    /// List every root's copy of `prefix`, lowest priority first.
    ///
    /// If `prefix` is a file under a root, that file is listed. If it is a
    /// directory, the regular files directly inside it are listed, sorted by
    /// name. With `full_paths` the physical paths are returned; otherwise the
    /// logical paths, suitable for a later [`locate`](Self::locate).
    ///
    /// Duplicates are kept: a file present in three roots is listed three times.
    pub fn list(&self, prefix: &str, full_paths: bool) -> Result<Vec<Utf8PathBuf>> {
        let prefix = normalize_logical_prefix(prefix)?;
        let mut out = Vec::new();

        for root in self.paths.ascending() {
            let Some(physical) = root.join(&prefix) else {
                continue;
            };
            let std_path = physical.as_std_path();

            if std_path.is_file() {
                out.push(if full_paths {
                    physical
                } else {
                    Utf8PathBuf::from(&prefix)
                });
            } else if std_path.is_dir() {
                for (file_name, file_path) in list_dir_files(&physical) {
                    out.push(if full_paths {
                        file_path
                    } else {
                        Utf8PathBuf::from(format!("{}/{}", prefix, file_name))
                    });
                }
            }
        }

        Ok(out)
    }

    /// Report, for every root in search order, where `logical_path` would be
    /// read from and whether it exists there. Roots that never serve the path
    /// are left out. Bypasses the cache.
    pub fn explain(&self, logical_path: &str) -> Result<Vec<Candidate>> {
        let key = normalize_logical_path(logical_path)?;
        Ok(self
            .paths
            .roots()
            .iter()
            .enumerate()
            .filter_map(|(order, root)| {
                let path = root.join(&key)?;
                let exists = path.as_std_path().is_file();
                Some(Candidate {
                    order,
                    kind: root.kind.clone(),
                    path,
                    exists,
                })
            })
            .collect())
    }
}

/// Regular files directly inside `dir`, sorted by file name.
fn list_dir_files(dir: &Utf8Path) -> Vec<(String, Utf8PathBuf)> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir.as_std_path())
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", dir, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => path,
            Err(p) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                continue;
            }
        };
        if let Some(name) = path.file_name() {
            files.push((name.to_string(), path.clone()));
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PackageCatalog;
    use crate::Error;
    use std::fs;

    struct Tree {
        _dir: tempfile::TempDir,
        root: Utf8PathBuf,
    }

    impl Tree {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
            fs::create_dir_all(root.join("data/mods")).unwrap();
            Self { _dir: dir, root }
        }

        fn file(&self, rel: &str, contents: &str) -> Utf8PathBuf {
            let path = self.root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, contents).unwrap();
            path
        }

        fn paths(&self, active: &[&str]) -> PathSet {
            let catalog = PackageCatalog::new(vec![self.root.join("data/mods")]);
            let active: Vec<String> = active.iter().map(|a| a.to_string()).collect();
            PathSet::build(
                &active,
                &catalog,
                "default",
                Some(self.root.join("user/override").as_path()),
                Some(self.root.join("data").as_path()),
            )
        }
    }

    #[test]
    fn test_override_wins() {
        let tree = Tree::new();
        tree.file("data/mods/core/maps/town.txt", "core");
        let winner = tree.file("user/override/maps/town.txt", "override");

        let overlay = OverlayResolver::new(tree.paths(&["core"]));
        assert_eq!(overlay.locate("maps/town.txt").unwrap(), Some(winner));
    }

    #[test]
    fn test_later_package_wins() {
        let tree = Tree::new();
        tree.file("data/mods/default/items.txt", "fallback");
        tree.file("data/mods/a/items.txt", "a");
        let winner = tree.file("data/mods/b/items.txt", "b");
        tree.file("data/items.txt", "builtin");

        let overlay = OverlayResolver::new(tree.paths(&["a", "b"]));
        assert_eq!(overlay.locate("items.txt").unwrap(), Some(winner));
    }

    #[test]
    fn test_fallback_then_builtin() {
        let tree = Tree::new();
        let fallback = tree.file("data/mods/default/engine/font.txt", "fallback");
        let builtin = tree.file("data/engine/misc.txt", "builtin");
        tree.file("data/engine/font.txt", "builtin");

        let overlay = OverlayResolver::new(tree.paths(&[]));
        assert_eq!(overlay.locate("engine/font.txt").unwrap(), Some(fallback));
        assert_eq!(overlay.locate("engine/misc.txt").unwrap(), Some(builtin));
    }

    #[test]
    fn test_not_found_is_none() {
        let tree = Tree::new();
        let overlay = OverlayResolver::new(tree.paths(&[]));
        assert_eq!(overlay.locate("nothing/here.txt").unwrap(), None);
    }

    #[test]
    fn test_directories_do_not_satisfy_locate() {
        let tree = Tree::new();
        tree.file("data/mods/core/maps/town.txt", "core");
        fs::create_dir_all(tree.root.join("user/override/maps")).unwrap();

        let overlay = OverlayResolver::new(tree.paths(&["core"]));
        assert_eq!(overlay.locate("maps").unwrap(), None);
    }

    #[test]
    fn test_traversal_rejected_before_lookup() {
        let tree = Tree::new();
        tree.file("secret.txt", "secret");
        let overlay = OverlayResolver::new(tree.paths(&[]));

        assert!(matches!(
            overlay.locate("../secret.txt"),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(overlay.list("../", true), Err(Error::InvalidPath(_))));
        assert_eq!(overlay.cached_len(), 0);
    }

    #[test]
    fn test_locate_caches_including_misses() {
        let tree = Tree::new();
        let overlay = OverlayResolver::new(tree.paths(&[]));

        assert_eq!(overlay.locate("late.txt").unwrap(), None);
        assert_eq!(overlay.cached_len(), 1);

        // The cached miss is served until the overlay is rebuilt.
        tree.file("data/late.txt", "late");
        assert_eq!(overlay.locate("late.txt").unwrap(), None);
        assert_eq!(overlay.locate("./late.txt").unwrap(), None);
        assert_eq!(overlay.cached_len(), 1);
    }

    #[test]
    fn test_rebuild_clears_cache() {
        let tree = Tree::new();
        let from_a = tree.file("data/mods/a/maps/town.txt", "a");
        let from_builtin = tree.file("data/maps/town.txt", "builtin");

        let mut overlay = OverlayResolver::new(tree.paths(&["a"]));
        assert_eq!(overlay.locate("maps/town.txt").unwrap(), Some(from_a));

        overlay.rebuild(tree.paths(&[]));
        assert_eq!(overlay.cached_len(), 0);
        assert_eq!(overlay.locate("maps/town.txt").unwrap(), Some(from_builtin));
    }

    #[test]
    fn test_list_file_lowest_priority_first() {
        let tree = Tree::new();
        let builtin = tree.file("data/engine/settings.txt", "builtin");
        let core = tree.file("data/mods/core/engine/settings.txt", "core");
        let user = tree.file("user/override/engine/settings.txt", "override");

        let overlay = OverlayResolver::new(tree.paths(&["core"]));
        assert_eq!(
            overlay.list("engine/settings.txt", true).unwrap(),
            vec![builtin, core, user.clone()]
        );
        assert_eq!(
            overlay.list("engine/settings.txt", false).unwrap(),
            vec![
                Utf8PathBuf::from("engine/settings.txt"),
                Utf8PathBuf::from("engine/settings.txt"),
                Utf8PathBuf::from("engine/settings.txt"),
            ]
        );

        // The last listed entry is what locate returns.
        assert_eq!(overlay.locate("engine/settings.txt").unwrap(), Some(user));
    }

    #[test]
    fn test_list_directory() {
        let tree = Tree::new();
        let b_builtin = tree.file("data/enemies/b.txt", "builtin");
        let a_core = tree.file("data/mods/core/enemies/a.txt", "core");
        let c_core = tree.file("data/mods/core/enemies/c.txt", "core");
        fs::create_dir_all(tree.root.join("data/mods/core/enemies/nested")).unwrap();

        let overlay = OverlayResolver::new(tree.paths(&["core"]));
        assert_eq!(
            overlay.list("enemies/", true).unwrap(),
            vec![b_builtin, a_core, c_core]
        );
        assert_eq!(
            overlay.list("enemies", false).unwrap(),
            vec![
                Utf8PathBuf::from("enemies/b.txt"),
                Utf8PathBuf::from("enemies/a.txt"),
                Utf8PathBuf::from("enemies/c.txt"),
            ]
        );
    }

    #[test]
    fn test_list_relative_round_trips_through_locate() {
        let tree = Tree::new();
        tree.file("data/powers/base.txt", "builtin");
        tree.file("data/mods/a/powers/base.txt", "a");
        tree.file("data/mods/b/powers/extra.txt", "b");

        let overlay = OverlayResolver::new(tree.paths(&["a", "b"]));
        let full = overlay.list("powers", true).unwrap();
        for relative in overlay.list("powers", false).unwrap() {
            let located = overlay.locate(relative.as_str()).unwrap().unwrap();
            assert!(full.contains(&located), "{} not listed", located);
        }
    }

    #[test]
    fn test_list_missing_is_empty() {
        let tree = Tree::new();
        let overlay = OverlayResolver::new(tree.paths(&[]));
        assert!(overlay.list("nowhere", true).unwrap().is_empty());
    }

    #[test]
    fn test_inactive_package_hidden_from_builtin_root() {
        let tree = Tree::new();
        tree.file("data/mods/a/maps/town.txt", "a");
        tree.file("data/mods/mods.txt", "a\n");
        tree.file("data/mods/readme.txt", "loose");

        let overlay = OverlayResolver::new(tree.paths(&[]));
        assert_eq!(overlay.locate("mods/a/maps/town.txt").unwrap(), None);
        assert_eq!(overlay.locate("mods/mods.txt").unwrap(), None);
        assert!(overlay.list("mods", true).unwrap().is_empty());
        assert!(overlay.explain("mods/mods.txt").unwrap().is_empty());
    }

    #[test]
    fn test_explain_reports_every_root() {
        let tree = Tree::new();
        tree.file("data/mods/core/maps/town.txt", "core");
        fs::create_dir_all(tree.root.join("user/override")).unwrap();

        let overlay = OverlayResolver::new(tree.paths(&["core"]));
        let candidates = overlay.explain("maps/town.txt").unwrap();

        let summary: Vec<_> = candidates.iter().map(|c| (c.kind.clone(), c.exists)).collect();
        assert_eq!(
            summary,
            vec![
                (RootKind::Override, false),
                (RootKind::Package("core".to_string()), true),
                (RootKind::Builtin, false),
            ]
        );
        assert_eq!(candidates[1].order, 1);
    }
}
