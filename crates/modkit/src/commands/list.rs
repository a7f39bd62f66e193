use crate::errors::CliError;
use crate::utils::config::Overrides;
use colored::Colorize;
use miette::Result;

pub struct ListFilesArgs {
    pub prefix: String,
    /// Print `prefix/file` instead of physical paths.
    pub relative: bool,
}

/// Print every provider of a file or directory, lowest priority first.
pub fn list_files(overrides: &Overrides, args: ListFilesArgs) -> Result<()> {
    let session = super::start_session(overrides, None)?;
    let files = session
        .list(&args.prefix, !args.relative)
        .map_err(CliError::from)?;

    if files.is_empty() {
        eprintln!("{} nothing found under '{}'", "✗".bright_red(), args.prefix);
    }
    for file in files {
        println!("{}", file);
    }

    Ok(())
}
