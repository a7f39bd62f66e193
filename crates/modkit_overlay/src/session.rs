//! The explicit session object handed to content loaders.
//!
//! A [`ModSession`] owns everything resolved at startup: the package catalog,
//! the activation order, the search roots and the lookup cache. Content
//! loaders receive `&ModSession` and only ever call [`ModSession::locate`] and
//! [`ModSession::list`]. Changing the mod selection goes through
//! [`ModSession::reload`], which rebuilds every piece from scratch.

use crate::catalog::PackageCatalog;
use crate::error::{Error, Result};
use crate::overlay::{Candidate, OverlayResolver};
use crate::paths::{PathSet, Root};
use crate::resolver::{DependencyResolver, Resolution, ResolveWarning, ResolvedPackage};
use camino::{Utf8Path, Utf8PathBuf};
use modkit_manifest::{
    find_active_list, read_active_list, EngineVersion, ACTIVE_LIST_FILE_NAME, FALLBACK_PACKAGE,
};

/// Name of the packages directory inside the data and user directories.
pub const PACKAGES_DIR_NAME: &str = "mods";

/// Name of the override directory inside the user directory.
pub const OVERRIDE_DIR_NAME: &str = "override";

/// Where packages live and how to judge them.
///
/// ```text
/// <data_dir>/            builtin root
///   mods/                bundled packages (+ mods.txt)
/// <user_dir>/
///   mods/                user-installed packages (+ mods.txt), searched before bundled ones
///   override/            override root, searched before everything else
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub data_dir: Utf8PathBuf,
    pub user_dir: Option<Utf8PathBuf>,
    /// Override root. Defaults to `<user_dir>/override`.
    pub override_dir: Option<Utf8PathBuf>,
    /// Active-package list. Defaults to the first existing `mods.txt` in the
    /// user, then the data packages directory.
    pub active_list: Option<Utf8PathBuf>,
    pub engine_version: EngineVersion,
    pub fallback_name: String,
    /// Expected game id; packages declaring another game are reported.
    pub game: Option<String>,
}

impl SessionConfig {
    pub fn new(data_dir: impl Into<Utf8PathBuf>, engine_version: EngineVersion) -> Self {
        Self {
            data_dir: data_dir.into(),
            user_dir: None,
            override_dir: None,
            active_list: None,
            engine_version,
            fallback_name: FALLBACK_PACKAGE.to_string(),
            game: None,
        }
    }

    pub fn with_user_dir(mut self, user_dir: impl Into<Utf8PathBuf>) -> Self {
        self.user_dir = Some(user_dir.into());
        self
    }

    pub fn with_override_dir(mut self, override_dir: impl Into<Utf8PathBuf>) -> Self {
        self.override_dir = Some(override_dir.into());
        self
    }

    pub fn with_active_list(mut self, active_list: impl Into<Utf8PathBuf>) -> Self {
        self.active_list = Some(active_list.into());
        self
    }

    pub fn with_fallback_name(mut self, fallback_name: impl Into<String>) -> Self {
        self.fallback_name = fallback_name.into();
        self
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    /// Packages directories, highest precedence first.
    pub fn packages_dirs(&self) -> Vec<Utf8PathBuf> {
        let mut dirs = Vec::with_capacity(2);
        if let Some(user_dir) = &self.user_dir {
            dirs.push(user_dir.join(PACKAGES_DIR_NAME));
        }
        dirs.push(self.data_dir.join(PACKAGES_DIR_NAME));
        dirs
    }

    pub fn effective_override_dir(&self) -> Option<Utf8PathBuf> {
        self.override_dir.clone().or_else(|| {
            self.user_dir
                .as_ref()
                .map(|user_dir| user_dir.join(OVERRIDE_DIR_NAME))
        })
    }

    /// The active list that [`ModSession::start`] would read, if any.
    pub fn effective_active_list(&self) -> Option<Utf8PathBuf> {
        if let Some(path) = &self.active_list {
            return Some(path.clone());
        }
        let candidates: Vec<Utf8PathBuf> = self
            .packages_dirs()
            .into_iter()
            .map(|dir| dir.join(ACTIVE_LIST_FILE_NAME))
            .collect();
        find_active_list(&candidates).cloned()
    }

    /// Read the requested package list. No list at all means nothing is requested.
    pub fn read_requested(&self) -> Result<Vec<String>> {
        match self.effective_active_list() {
            Some(path) => {
                tracing::info!("Reading active packages from {}", path);
                Ok(read_active_list(&path)?)
            }
            None => {
                tracing::info!("No {} found, starting with no active packages", ACTIVE_LIST_FILE_NAME);
                Ok(Vec::new())
            }
        }
    }
}

/// Resolved mod state for one session.
#[derive(Debug)]
pub struct ModSession {
    config: SessionConfig,
    requested: Vec<String>,
    resolution: Resolution,
    overlay: OverlayResolver,
}

struct Assembled {
    resolution: Resolution,
    paths: PathSet,
}

impl ModSession {
    /// Start a session from the configured active-package list.
    pub fn start(config: SessionConfig) -> Result<Self> {
        let requested = config.read_requested()?;
        Self::start_with(config, requested)
    }

    /// Start a session with an explicit requested package list.
    pub fn start_with(config: SessionConfig, requested: Vec<String>) -> Result<Self> {
        validate_data_dir(&config.data_dir)?;
        let Assembled { resolution, paths } = assemble(&config, &requested)?;

        tracing::info!(
            "Mod session started: {} active package(s), {} search root(s)",
            resolution.packages.len(),
            paths.len()
        );

        Ok(Self {
            config,
            requested,
            resolution,
            overlay: OverlayResolver::new(paths),
        })
    }

    /// Tear down and rebuild with a new requested list.
    ///
    /// Descriptors are re-read, the activation order and roots are recomputed
    /// and the lookup cache is emptied. On failure the session is left exactly
    /// as it was.
    pub fn reload(&mut self, requested: Vec<String>) -> Result<()> {
        let Assembled { resolution, paths } = assemble(&self.config, &requested)?;

        tracing::info!(
            "Reloading mods: [{}] -> [{}]",
            self.resolution.order().join(", "),
            resolution.order().join(", ")
        );

        self.overlay.rebuild(paths);
        self.resolution = resolution;
        self.requested = requested;
        Ok(())
    }

    /// [`reload`](Self::reload) from the active-package list on disk.
    pub fn reload_from_active_list(&mut self) -> Result<()> {
        let requested = self.config.read_requested()?;
        self.reload(requested)
    }

    /// See [`OverlayResolver::locate`].
    pub fn locate(&self, logical_path: &str) -> Result<Option<Utf8PathBuf>> {
        self.overlay.locate(logical_path)
    }

    /// See [`OverlayResolver::list`].
    pub fn list(&self, prefix: &str, full_paths: bool) -> Result<Vec<Utf8PathBuf>> {
        self.overlay.list(prefix, full_paths)
    }

    /// See [`OverlayResolver::explain`].
    pub fn explain(&self, logical_path: &str) -> Result<Vec<Candidate>> {
        self.overlay.explain(logical_path)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The package list as requested, before deduplication and dependency expansion.
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Active package names, lowest override priority first.
    pub fn activation_order(&self) -> Vec<String> {
        self.resolution.order()
    }

    /// Active packages, lowest override priority first.
    pub fn packages(&self) -> &[ResolvedPackage] {
        &self.resolution.packages
    }

    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.resolution.warnings
    }

    /// Search roots, highest priority first.
    pub fn roots(&self) -> &[Root] {
        self.overlay.paths().roots()
    }

    pub fn have_fallback(&self) -> bool {
        self.overlay.paths().have_fallback()
    }

    /// Every package directory on disk, active or not.
    pub fn available_packages(&self) -> Result<Vec<String>> {
        PackageCatalog::new(self.config.packages_dirs()).available()
    }
}

fn validate_data_dir(data_dir: &Utf8Path) -> Result<()> {
    if !data_dir.as_std_path().is_dir() {
        return Err(Error::InvalidDataDir(data_dir.to_path_buf()));
    }
    Ok(())
}

/// Run the full pipeline: catalog -> resolution -> roots.
fn assemble(config: &SessionConfig, requested: &[String]) -> Result<Assembled> {
    let mut catalog = PackageCatalog::new(config.packages_dirs());

    let resolution = DependencyResolver::new(&mut catalog, config.engine_version)
        .with_game(config.game.clone())
        .resolve(requested)?;

    if !catalog.have_fallback(&config.fallback_name) {
        tracing::warn!(
            "Fallback package '{}' not found, no baseline content beyond the data directory",
            config.fallback_name
        );
    }

    let override_dir = config.effective_override_dir();
    let paths = PathSet::build(
        &resolution.order(),
        &catalog,
        &config.fallback_name,
        override_dir.as_deref(),
        Some(config.data_dir.as_path()),
    );

    Ok(Assembled { resolution, paths })
}
