use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::Overrides;
use colored::Colorize;
use miette::Result;

pub struct LocateFileArgs {
    pub path: String,
    pub explain: bool,
}

/// Print the physical file that serves a logical path.
///
/// A path no root provides is reported on stderr and is not an error.
pub fn locate_file(overrides: &Overrides, args: LocateFileArgs) -> Result<()> {
    let session = super::start_session(overrides, None)?;

    if args.explain {
        let candidates = session.explain(&args.path).map_err(CliError::from)?;
        let winner = candidates.iter().position(|c| c.exists);

        println_pad!(
            "{} {}",
            "🔎 Lookup:".bright_blue().bold(),
            args.path.bright_cyan().bold()
        );
        for (index, candidate) in candidates.iter().enumerate() {
            let status = if Some(index) == winner {
                "✓ selected".bright_green().bold()
            } else if candidate.exists {
                "✓ shadowed".yellow()
            } else {
                "✗".dimmed()
            };
            println_pad!(
                "   {} {} {} {}",
                format!("{:>2}.", candidate.order + 1).dimmed(),
                candidate.kind.to_string().bright_white(),
                candidate.path.as_str().dimmed(),
                status
            );
        }
        println!();
    }

    match session.locate(&args.path).map_err(CliError::from)? {
        Some(path) => println!("{}", path),
        None => eprintln!("{} '{}' not found in any root", "✗".bright_red(), args.path),
    }

    Ok(())
}
