//! Dependency resolution: requested package names to an activation order.
//!
//! # Algorithm
//!
//! 1. Deduplicate the requested names, keeping each first occurrence.
//! 2. Expand each requested package depth-first. Before a package is placed,
//!    every package in its `depends` list is expanded and placed. A dependency
//!    that was not requested is added implicitly, so it lands immediately
//!    before the first package that needed it.
//! 3. Revisiting a package that is still on the current expansion path is a
//!    [`DependencyCycle`](crate::Error::DependencyCycle); a self-dependency is
//!    a cycle of length one.
//! 4. Each loaded descriptor's engine range is checked against the running
//!    engine version. A violation is recorded as a
//!    [`ResolveWarning::IncompatibleVersion`] and the package stays active.
//!
//! Packages without an ordering relationship keep their requested order.

use crate::catalog::PackageSource;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use modkit_manifest::{
    BoundViolation, EngineVersion, ManifestWarning, PackageDescriptor, VersionRange,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One package of the activation order.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedPackage {
    pub descriptor: PackageDescriptor,
    /// Physical root directory of the package.
    pub root: Utf8PathBuf,
    /// Manifest the descriptor was read from.
    pub manifest: Utf8PathBuf,
    /// `true` if the package was requested, `false` if it was pulled in as a dependency.
    pub explicit: bool,
}

impl ResolvedPackage {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// A recoverable problem found during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The engine version lies outside the package's declared range.
    IncompatibleVersion {
        name: String,
        manifest: Utf8PathBuf,
        required: VersionRange,
        actual: EngineVersion,
        violation: BoundViolation,
    },
    /// The package targets a different game than the one configured.
    GameMismatch {
        name: String,
        manifest: Utf8PathBuf,
        declared: String,
        expected: String,
    },
    /// The package's manifest contained an unknown key or malformed value.
    Manifest { name: String, warning: ManifestWarning },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::IncompatibleVersion {
                name,
                manifest,
                required,
                actual,
                violation,
            } => {
                write!(
                    f,
                    "Package '{}' is not compatible with engine {}: {} {} ({})",
                    name, actual, violation, required, manifest
                )
            }
            ResolveWarning::GameMismatch {
                name,
                manifest,
                declared,
                expected,
            } => {
                write!(
                    f,
                    "Package '{}' is made for game '{}', not '{}' ({})",
                    name, declared, expected, manifest
                )
            }
            ResolveWarning::Manifest { name, warning } => {
                write!(f, "Package '{}': {}", name, warning)
            }
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Packages in activation order, lowest override priority first.
    pub packages: Vec<ResolvedPackage>,
    pub warnings: Vec<ResolveWarning>,
}

impl Resolution {
    /// Package names in activation order.
    pub fn order(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name().to_string()).collect()
    }
}

/// Computes activation orders against a [`PackageSource`].
pub struct DependencyResolver<'a, S: PackageSource + ?Sized> {
    source: &'a mut S,
    engine_version: EngineVersion,
    game: Option<String>,
}

#[derive(Default)]
struct Expansion {
    packages: Vec<ResolvedPackage>,
    placed: HashSet<String>,
    path: Vec<String>,
    warnings: Vec<ResolveWarning>,
}

impl<'a, S: PackageSource + ?Sized> DependencyResolver<'a, S> {
    pub fn new(source: &'a mut S, engine_version: EngineVersion) -> Self {
        Self {
            source,
            engine_version,
            game: None,
        }
    }

    /// Report packages whose declared `game` differs from `game`.
    pub fn with_game(mut self, game: Option<String>) -> Self {
        self.game = game.filter(|g| !g.is_empty());
        self
    }

    /// Resolve `requested` into an activation order.
    ///
    /// Fails with [`Error::MissingPackage`] or [`Error::DependencyCycle`];
    /// no partial order is produced in either case.
    pub fn resolve<I>(&mut self, requested: I) -> Result<Resolution>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let requested: Vec<String> = requested
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .unique()
            .collect();

        let mut expansion = Expansion::default();
        for name in &requested {
            self.expand(name, None, &mut expansion)?;
            if let Some(package) = expansion.packages.iter_mut().find(|p| p.name() == name) {
                package.explicit = true;
            }
        }

        tracing::info!(
            "Resolved {} requested package(s) into activation order [{}]",
            requested.len(),
            expansion.packages.iter().map(|p| p.name()).join(", ")
        );

        Ok(Resolution {
            packages: expansion.packages,
            warnings: expansion.warnings,
        })
    }

    fn expand(
        &mut self,
        name: &str,
        required_by: Option<&str>,
        expansion: &mut Expansion,
    ) -> Result<()> {
        if let Some(start) = expansion.path.iter().position(|p| p == name) {
            let members = expansion.path[start..].to_vec();
            tracing::debug!("Dependency cycle detected: {}", members.join(" -> "));
            return Err(Error::DependencyCycle(members));
        }
        if expansion.placed.contains(name) {
            return Ok(());
        }

        let missing = || Error::MissingPackage {
            name: name.to_string(),
            required_by: required_by.map(str::to_string),
        };
        let root = self.source.root(name).ok_or_else(missing)?;
        let loaded = self.source.load(name)?.ok_or_else(missing)?;

        if let Some(parent) = required_by {
            tracing::debug!("Expanding '{}' (required by '{}')", name, parent);
        }

        self.check_compatibility(&loaded.descriptor, &loaded.manifest, expansion);
        expansion
            .warnings
            .extend(loaded.warnings.iter().cloned().map(|warning| {
                ResolveWarning::Manifest {
                    name: name.to_string(),
                    warning,
                }
            }));

        expansion.path.push(name.to_string());
        for dependency in &loaded.descriptor.depends {
            self.expand(dependency, Some(name), expansion)?;
        }
        expansion.path.pop();

        expansion.placed.insert(name.to_string());
        expansion.packages.push(ResolvedPackage {
            descriptor: loaded.descriptor,
            root,
            manifest: loaded.manifest,
            explicit: false,
        });
        Ok(())
    }

    fn check_compatibility(
        &self,
        descriptor: &PackageDescriptor,
        manifest: &Utf8Path,
        expansion: &mut Expansion,
    ) {
        if let Some(violation) = descriptor.engine.violation(self.engine_version) {
            let warning = ResolveWarning::IncompatibleVersion {
                name: descriptor.name.clone(),
                manifest: manifest.to_path_buf(),
                required: descriptor.engine,
                actual: self.engine_version,
                violation,
            };
            tracing::warn!("{}", warning);
            expansion.warnings.push(warning);
        }

        if let Some(expected) = &self.game {
            if !descriptor.game.is_empty() && descriptor.game != *expected {
                let warning = ResolveWarning::GameMismatch {
                    name: descriptor.name.clone(),
                    manifest: manifest.to_path_buf(),
                    declared: descriptor.game.clone(),
                    expected: expected.clone(),
                };
                tracing::warn!("{}", warning);
                expansion.warnings.push(warning);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_manifest::LoadedDescriptor;
    use std::collections::HashMap;

    /// In-memory packages keyed by name.
    #[derive(Default)]
    struct MemorySource {
        packages: HashMap<String, PackageDescriptor>,
        loads: usize,
    }

    impl MemorySource {
        fn with(mut self, name: &str, depends: &[&str]) -> Self {
            let mut descriptor = PackageDescriptor::named(name);
            descriptor.depends = depends.iter().map(|d| d.to_string()).collect();
            self.packages.insert(name.to_string(), descriptor);
            self
        }

        fn with_descriptor(mut self, descriptor: PackageDescriptor) -> Self {
            self.packages.insert(descriptor.name.clone(), descriptor);
            self
        }
    }

    impl PackageSource for MemorySource {
        fn root(&self, name: &str) -> Option<Utf8PathBuf> {
            self.packages
                .contains_key(name)
                .then(|| Utf8PathBuf::from("/packages").join(name))
        }

        fn load(&mut self, name: &str) -> Result<Option<LoadedDescriptor>> {
            self.loads += 1;
            Ok(self.packages.get(name).map(|descriptor| LoadedDescriptor {
                descriptor: descriptor.clone(),
                manifest: Utf8PathBuf::from("/packages").join(name).join("settings.txt"),
                warnings: Vec::new(),
            }))
        }
    }

    const ENGINE: EngineVersion = EngineVersion::new(1, 0);

    fn resolve(source: &mut MemorySource, requested: &[&str]) -> Result<Vec<String>> {
        DependencyResolver::new(source, ENGINE)
            .resolve(requested)
            .map(|r| r.order())
    }

    #[test]
    fn test_implicit_dependency_goes_first() {
        let mut source = MemorySource::default()
            .with("core", &["assets"])
            .with("assets", &[]);

        assert_eq!(resolve(&mut source, &["core"]).unwrap(), vec!["assets", "core"]);
    }

    #[test]
    fn test_two_package_cycle() {
        let mut source = MemorySource::default().with("a", &["b"]).with("b", &["a"]);

        match resolve(&mut source, &["a", "b"]) {
            Err(Error::DependencyCycle(members)) => assert_eq!(members, vec!["a", "b"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let mut source = MemorySource::default().with("a", &["a"]);

        match resolve(&mut source, &["a"]) {
            Err(Error::DependencyCycle(members)) => assert_eq!(members, vec!["a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_transitive_cycle_names_only_members() {
        let mut source = MemorySource::default()
            .with("top", &["a"])
            .with("a", &["b"])
            .with("b", &["c"])
            .with("c", &["a"]);

        match resolve(&mut source, &["top"]) {
            Err(Error::DependencyCycle(members)) => assert_eq!(members, vec!["a", "b", "c"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_requested_package() {
        let mut source = MemorySource::default();

        match resolve(&mut source, &["ghost"]) {
            Err(Error::MissingPackage { name, required_by }) => {
                assert_eq!(name, "ghost");
                assert_eq!(required_by, None);
            }
            other => panic!("expected missing package, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_dependency_names_dependent() {
        let mut source = MemorySource::default().with("core", &["ghost"]);

        match resolve(&mut source, &["core"]) {
            Err(Error::MissingPackage { name, required_by }) => {
                assert_eq!(name, "ghost");
                assert_eq!(required_by.as_deref(), Some("core"));
            }
            other => panic!("expected missing package, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let mut source = MemorySource::default()
            .with("a", &[])
            .with("b", &[])
            .with("c", &[]);

        assert_eq!(
            resolve(&mut source, &["b", "a", "b", "c", "a"]).unwrap(),
            vec!["b", "a", "c"]
        );
    }

    #[test]
    fn test_unrelated_packages_keep_requested_order() {
        let mut source = MemorySource::default()
            .with("a", &["c"])
            .with("b", &[])
            .with("c", &[]);

        // c is pulled in front of a, b stays after a.
        assert_eq!(resolve(&mut source, &["a", "b"]).unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_shared_dependency_inserted_once_before_first_dependent() {
        let mut source = MemorySource::default()
            .with("x", &[])
            .with("ui", &["lib"])
            .with("maps", &["lib"])
            .with("lib", &[]);

        assert_eq!(
            resolve(&mut source, &["x", "ui", "maps"]).unwrap(),
            vec!["x", "lib", "ui", "maps"]
        );
    }

    #[test]
    fn test_explicit_dependency_moves_before_dependent() {
        let mut source = MemorySource::default()
            .with("a", &["b"])
            .with("b", &[]);

        assert_eq!(resolve(&mut source, &["a", "b"]).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_diamond_is_topologically_valid() {
        let mut source = MemorySource::default()
            .with("top", &["left", "right"])
            .with("left", &["base"])
            .with("right", &["base"])
            .with("base", &[]);

        let order = resolve(&mut source, &["top"]).unwrap();
        assert_eq!(order, vec!["base", "left", "right", "top"]);

        let position = |name: &str| order.iter().position(|p| p == name).unwrap();
        for (package, dependency) in [
            ("top", "left"),
            ("top", "right"),
            ("left", "base"),
            ("right", "base"),
        ] {
            assert!(position(dependency) < position(package));
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut source = MemorySource::default()
            .with("core", &["assets"])
            .with("assets", &[])
            .with("ui", &["core"]);

        let first = resolve(&mut source, &["ui", "core"]).unwrap();
        let second = resolve(&mut source, &["ui", "core"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["assets", "core", "ui"]);
    }

    #[test]
    fn test_explicit_flag() {
        let mut source = MemorySource::default()
            .with("core", &["assets"])
            .with("assets", &[]);

        let resolution = DependencyResolver::new(&mut source, ENGINE)
            .resolve(["core"])
            .unwrap();
        assert!(!resolution.packages[0].explicit);
        assert!(resolution.packages[1].explicit);
        assert_eq!(resolution.packages[1].root, "/packages/core");
    }

    #[test]
    fn test_each_package_loaded_once_per_resolution() {
        let mut source = MemorySource::default()
            .with("ui", &["lib"])
            .with("maps", &["lib"])
            .with("lib", &[]);

        resolve(&mut source, &["ui", "maps"]).unwrap();
        assert_eq!(source.loads, 3);
    }

    #[test]
    fn test_incompatible_version_warns_but_activates() {
        let mut old = PackageDescriptor::named("old");
        old.engine.max = Some(EngineVersion::new(0, 9));
        let mut source = MemorySource::default().with_descriptor(old);

        let resolution = DependencyResolver::new(&mut source, ENGINE)
            .resolve(["old"])
            .unwrap();

        assert_eq!(resolution.order(), vec!["old"]);
        assert_eq!(resolution.warnings.len(), 1);
        match &resolution.warnings[0] {
            ResolveWarning::IncompatibleVersion {
                name,
                actual,
                violation,
                ..
            } => {
                assert_eq!(name, "old");
                assert_eq!(*actual, ENGINE);
                assert_eq!(*violation, BoundViolation::Above(EngineVersion::new(0, 9)));
            }
            other => panic!("unexpected warning {:?}", other),
        }
    }

    #[test]
    fn test_game_mismatch_warns() {
        let mut other = PackageDescriptor::named("other");
        other.game = "another-game".to_string();
        let mut native = PackageDescriptor::named("native");
        native.game = "flare-game".to_string();
        let mut source = MemorySource::default()
            .with_descriptor(other)
            .with_descriptor(native)
            .with("untagged", &[]);

        let resolution = DependencyResolver::new(&mut source, ENGINE)
            .with_game(Some("flare-game".to_string()))
            .resolve(["other", "native", "untagged"])
            .unwrap();

        assert_eq!(resolution.warnings.len(), 1);
        assert!(matches!(
            &resolution.warnings[0],
            ResolveWarning::GameMismatch { name, .. } if name == "other"
        ));
    }

    #[test]
    fn test_empty_request() {
        let mut source = MemorySource::default();
        let resolution = DependencyResolver::new(&mut source, ENGINE)
            .resolve(Vec::<String>::new())
            .unwrap();
        assert!(resolution.packages.is_empty());
    }
}
