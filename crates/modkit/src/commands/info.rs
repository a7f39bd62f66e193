use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::{session_config, Overrides};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use modkit_overlay::{PackageCatalog, PackageSource};
use serde_json::to_string_pretty;

pub struct InfoPackageArgs {
    pub package: String,
}

/// Print a package's descriptor, whether or not it is active.
pub fn info_package(overrides: &Overrides, args: InfoPackageArgs) -> Result<()> {
    let cfg = overrides.load_config();
    let session_config = session_config(&cfg, overrides)?;
    let mut catalog = PackageCatalog::new(session_config.packages_dirs());

    let root = catalog
        .root(&args.package)
        .ok_or_else(|| CliError::missing_package(&args.package))?;
    let loaded = catalog
        .load(&args.package)
        .map_err(CliError::from)?
        .ok_or_else(|| CliError::missing_package(&args.package))?;
    let descriptor = &loaded.descriptor;
    let pretty_descriptor = to_string_pretty(descriptor).into_diagnostic()?;

    println_pad!(
        "{} {}",
        "📦 Package:".bright_blue().bold(),
        descriptor.name.bright_cyan().bold()
    );
    println_pad!("{} {}", "📁 Root:".bright_green(), root.as_str().bright_white());
    println_pad!(
        "{} {}",
        "🧾 Manifest:".bright_green(),
        loaded.manifest.as_str().bright_white()
    );
    println_pad!(
        "{} {}",
        "🏷️ Version:".bright_green(),
        descriptor
            .version
            .as_deref()
            .unwrap_or("unversioned")
            .bright_white()
            .bold()
    );
    println_pad!(
        "{} {}",
        "📝 Description:".bright_yellow(),
        if descriptor.description.is_empty() {
            "No description"
        } else {
            descriptor.description.as_str()
        }
        .bright_white()
    );
    if !descriptor.game.is_empty() {
        println_pad!("{} {}", "🎮 Game:".bright_yellow(), descriptor.game.bright_white());
    }

    let compatible = descriptor.engine.contains(session_config.engine_version);
    println_pad!(
        "{} {} {}",
        "⚙️  Engine:".bright_yellow(),
        descriptor.engine.to_string().bright_white(),
        if compatible {
            format!("(running {}: compatible)", session_config.engine_version).bright_green()
        } else {
            format!("(running {}: incompatible)", session_config.engine_version).bright_red()
        }
    );

    println_pad!("\n{}", "🔗 Depends on:".bright_magenta().bold());
    if descriptor.depends.is_empty() {
        println_pad!("   {}", "(nothing)".dimmed());
    }
    for dependency in &descriptor.depends {
        let status = if catalog.contains(dependency) {
            "installed".bright_green()
        } else {
            "missing".bright_red()
        };
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            dependency.bright_cyan().bold(),
            format!("({})", status).dimmed()
        );
    }

    if !loaded.warnings.is_empty() {
        println_pad!("\n{}", "⚠️  Manifest warnings:".bright_yellow().bold());
        for warning in &loaded.warnings {
            println_pad!("   {} {}", "•".bright_yellow(), warning);
        }
    }

    println_pad!("\n{}", "🧾 Full descriptor (JSON):".bright_magenta().bold());
    println_pad!("{}", pretty_descriptor);

    Ok(())
}
