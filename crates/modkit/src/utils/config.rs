//! Application configuration management utilities.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use directories_next::ProjectDirs;
use modkit_manifest::EngineVersion;
use modkit_overlay::SessionConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;

/// Engine version packages are judged against when none is configured.
pub const DEFAULT_ENGINE_VERSION: EngineVersion = EngineVersion::new(1, 0);

/// Application-wide configuration stored in config.toml.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Built-in data directory; bundled packages live in its `mods/` subdirectory.
    pub data_dir: Option<Utf8PathBuf>,
    /// Per-user directory holding `mods/` and `override/`.
    pub user_dir: Option<Utf8PathBuf>,
    /// Running engine version as `major.minor`.
    pub engine_version: Option<String>,
    /// Expected game id. Packages declaring another game are reported.
    pub game: Option<String>,
    /// Name of the fallback package.
    pub fallback: Option<String>,
}

/// Values given on the command line. They take precedence over config.toml.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<Utf8PathBuf>,
    pub data_dir: Option<Utf8PathBuf>,
    pub user_dir: Option<Utf8PathBuf>,
    pub engine_version: Option<String>,
}

impl Overrides {
    /// The config file in effect: `--config`, else config.toml next to the executable.
    pub fn config_path(&self) -> Option<Utf8PathBuf> {
        self.config.clone().or_else(default_config_path)
    }

    /// Load the config file in effect, falling back to defaults.
    pub fn load_config(&self) -> AppConfig {
        match self.config_path() {
            Some(path) => load_config(&path),
            None => AppConfig::default(),
        }
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns a config file path located next to the executable.
pub fn config_path(file_name: &str) -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join(file_name))
}

/// Returns the default configuration file path (config.toml).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    config_path("config.toml")
}

/// Per-user data directory used when `user_dir` is not configured.
pub fn default_user_dir() -> Option<Utf8PathBuf> {
    let dirs = ProjectDirs::from("", "", "modkit")?;
    Utf8PathBuf::from_path_buf(dirs.data_dir().to_path_buf()).ok()
}

/// Loads the application configuration from `path`.
/// Returns default configuration if the file doesn't exist or cannot be parsed.
pub fn load_config(path: &Utf8Path) -> AppConfig {
    if !path.as_std_path().exists() {
        return AppConfig::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}, using defaults", path, e);
            return AppConfig::default();
        }
    };

    toml::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("Malformed config {}: {}, using defaults", path, e);
        AppConfig::default()
    })
}

/// Saves the application configuration to `path`.
pub fn save_config(path: &Utf8Path, cfg: &AppConfig) -> io::Result<()> {
    let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
    fs::write(path, content)
}

/// Combine config.toml and command-line values into a session configuration.
///
/// A user directory that is configured nowhere defaults to the per-user data
/// directory.
pub fn session_config(cfg: &AppConfig, overrides: &Overrides) -> Result<SessionConfig, CliError> {
    let data_dir = overrides
        .data_dir
        .clone()
        .or_else(|| cfg.data_dir.clone())
        .ok_or(CliError::DataDirNotConfigured)?;

    let engine_version = match overrides
        .engine_version
        .as_deref()
        .or(cfg.engine_version.as_deref())
    {
        Some(version) => version
            .parse::<EngineVersion>()
            .map_err(|_| CliError::invalid_engine_version(version))?,
        None => DEFAULT_ENGINE_VERSION,
    };

    let mut session = SessionConfig::new(data_dir, engine_version);

    let user_dir = overrides
        .user_dir
        .clone()
        .or_else(|| cfg.user_dir.clone())
        .or_else(default_user_dir);
    if let Some(user_dir) = user_dir {
        session = session.with_user_dir(user_dir);
    }
    if let Some(game) = cfg.game.as_ref().filter(|g| !g.is_empty()) {
        session = session.with_game(game.clone());
    }
    if let Some(fallback) = cfg.fallback.as_ref().filter(|f| !f.is_empty()) {
        session = session.with_fallback_name(fallback.clone());
    }

    Ok(session)
}
