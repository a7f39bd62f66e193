use crate::errors::CliError;
use crate::utils::config::{session_config, Overrides};
use miette::Result;
use modkit_overlay::ModSession;

mod config;
mod info;
mod list;
mod locate;
mod packages;
mod resolve;

pub use config::{reset_config, show_config};
pub use info::{info_package, InfoPackageArgs};
pub use list::{list_files, ListFilesArgs};
pub use locate::{locate_file, LocateFileArgs};
pub use packages::list_packages;
pub use resolve::{resolve_packages, ResolvePackagesArgs};

/// Start a session from config.toml and command-line values.
///
/// `requested` replaces the active list (mods.txt) when given.
fn start_session(overrides: &Overrides, requested: Option<Vec<String>>) -> Result<ModSession> {
    let cfg = overrides.load_config();
    let session_config = session_config(&cfg, overrides)?;

    let session = match requested {
        Some(requested) => ModSession::start_with(session_config, requested),
        None => ModSession::start(session_config),
    }
    .map_err(CliError::from)?;

    Ok(session)
}
