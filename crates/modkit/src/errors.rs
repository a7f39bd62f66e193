use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("No data directory configured")]
    #[diagnostic(
        code(config::data_dir_missing),
        help("Pass --data-dir or set data_dir in config.toml")
    )]
    DataDirNotConfigured,

    #[error("Data directory not found: {path}")]
    #[diagnostic(
        code(session::data_dir_not_found),
        help("The data directory must exist and contain the built-in game data (packages go in its mods/ subdirectory)")
    )]
    DataDirNotFound { path: Utf8PathBuf },

    #[error("Invalid engine version: {version}")]
    #[diagnostic(
        code(config::invalid_engine_version),
        help("Engine versions are written as major.minor (e.g., 1.0, 0.19)")
    )]
    InvalidEngineVersion { version: String },

    #[error("Package '{name}' not found{}", required_by_suffix(.required_by.as_deref()))]
    #[diagnostic(
        code(resolve::missing_package),
        help("Install the package into a mods/ directory, or remove it from mods.txt and from every 'requires' list")
    )]
    MissingPackage {
        name: String,
        required_by: Option<String>,
    },

    #[error("Dependency cycle: {}", .members.join(" -> "))]
    #[diagnostic(
        code(resolve::dependency_cycle),
        help("Remove one of these dependencies so the packages no longer require each other")
    )]
    DependencyCycle { members: Vec<String> },

    #[error("Invalid logical path: '{path}'")]
    #[diagnostic(
        code(lookup::invalid_path),
        help("Logical paths are relative, use '/' separators and may not contain '..', drive letters or empty segments")
    )]
    InvalidPath { path: String },

    #[error("Failed to read package metadata")]
    #[diagnostic(
        code(package::manifest),
        help("Check the package's settings.txt and the mods.txt active list")
    )]
    Manifest {
        #[source]
        source: modkit_manifest::Error,
    },

    #[error("Could not determine config path")]
    #[diagnostic(
        code(config::path_unknown),
        help("Pass --config with the path of the config.toml to use")
    )]
    ConfigPathUnknown,

    #[error("Failed to save config: {path}")]
    #[diagnostic(
        code(config::save_failed),
        help("Check file permissions for the config file and its directory")
    )]
    ConfigSaveFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

fn required_by_suffix(required_by: Option<&str>) -> String {
    required_by
        .map(|parent| format!(" (required by '{}')", parent))
        .unwrap_or_default()
}

impl CliError {
    pub fn invalid_engine_version(version: impl Into<String>) -> Self {
        Self::InvalidEngineVersion {
            version: version.into(),
        }
    }

    pub fn missing_package(name: impl Into<String>) -> Self {
        Self::MissingPackage {
            name: name.into(),
            required_by: None,
        }
    }

    pub fn config_save_failed(path: Utf8PathBuf, source: std::io::Error) -> Self {
        Self::ConfigSaveFailed { path, source }
    }
}

impl From<modkit_overlay::Error> for CliError {
    fn from(error: modkit_overlay::Error) -> Self {
        use modkit_overlay::Error;

        match error {
            Error::MissingPackage { name, required_by } => Self::MissingPackage { name, required_by },
            Error::DependencyCycle(members) => Self::DependencyCycle { members },
            Error::InvalidPath(path) => Self::InvalidPath { path },
            Error::InvalidDataDir(path) => Self::DataDirNotFound { path },
            Error::Manifest(source) => Self::Manifest { source },
            Error::Io(source) => Self::IoError { source },
        }
    }
}
