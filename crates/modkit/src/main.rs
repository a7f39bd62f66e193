use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    info_package, list_files, list_packages, locate_file, reset_config, resolve_packages,
    show_config, InfoPackageArgs, ListFilesArgs, LocateFileArgs, ResolvePackagesArgs,
};
use miette::Result;
use tracing_subscriber::EnvFilter;
use utils::config::Overrides;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config.toml (defaults to the one next to the executable)
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Built-in data directory; bundled packages live in its mods/ subdirectory
    #[arg(long, global = true)]
    data_dir: Option<Utf8PathBuf>,

    /// Per-user directory holding mods/ and override/
    #[arg(long, global = true)]
    user_dir: Option<Utf8PathBuf>,

    /// Engine version packages are checked against (major.minor)
    #[arg(long, global = true)]
    engine_version: Option<String>,

    /// Log resolution and lookup details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve packages into an activation order and show the search roots
    Resolve {
        /// Packages to activate (defaults to the active list in mods.txt)
        packages: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which physical file serves a logical path
    Locate {
        /// Logical path, e.g. maps/town.txt
        path: String,

        /// Show every root that was searched
        #[arg(long)]
        explain: bool,
    },
    /// List every provider of a file or directory, lowest priority first
    List {
        /// Logical file or directory path
        prefix: String,

        /// Print logical paths instead of physical ones
        #[arg(long)]
        relative: bool,
    },
    /// Show information about a package
    Info {
        /// Package name (its directory name)
        package: String,
    },
    /// List installed packages
    Packages,
    /// Show or reset config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Reset the configuration file to defaults
    Reset,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).expect("failed to parse arguments")
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_tracing(args.verbose);

    let overrides = Overrides {
        config: args.config,
        data_dir: args.data_dir,
        user_dir: args.user_dir,
        engine_version: args.engine_version,
    };

    match args.command {
        Commands::Resolve { packages, json } => {
            resolve_packages(&overrides, ResolvePackagesArgs { packages, json })
        }
        Commands::Locate { path, explain } => {
            locate_file(&overrides, LocateFileArgs { path, explain })
        }
        Commands::List { prefix, relative } => {
            list_files(&overrides, ListFilesArgs { prefix, relative })
        }
        Commands::Info { package } => info_package(&overrides, InfoPackageArgs { package }),
        Commands::Packages => list_packages(&overrides),
        Commands::Config { action } => match action {
            ConfigAction::Show => show_config(&overrides),
            ConfigAction::Reset => reset_config(&overrides),
        },
    }
}
