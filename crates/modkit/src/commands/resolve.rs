use crate::println_pad;
use crate::utils::config::Overrides;
use crate::utils::print_ansi_boxed_lines;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use modkit_overlay::{ModSession, ResolvedPackage, Root};
use serde::Serialize;

pub struct ResolvePackagesArgs {
    /// Packages to activate. Empty means the active list (mods.txt).
    pub packages: Vec<String>,
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReport<'a> {
    requested: &'a [String],
    activation_order: Vec<String>,
    packages: &'a [ResolvedPackage],
    roots: &'a [Root],
    have_fallback: bool,
    warnings: Vec<String>,
}

pub fn resolve_packages(overrides: &Overrides, args: ResolvePackagesArgs) -> Result<()> {
    let requested = (!args.packages.is_empty()).then_some(args.packages);
    let session = super::start_session(overrides, requested)?;

    if args.json {
        let report = ResolveReport {
            requested: session.requested(),
            activation_order: session.activation_order(),
            packages: session.packages(),
            roots: session.roots(),
            have_fallback: session.have_fallback(),
            warnings: session.warnings().iter().map(|w| w.to_string()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        return Ok(());
    }

    print_summary(&session);
    Ok(())
}

fn print_summary(session: &ModSession) {
    print_ansi_boxed_lines(&[
        format!(
            "{} {}",
            "Requested:".bright_white().bold(),
            session.requested().len()
        ),
        format!(
            "{} {}",
            "Active:".bright_white().bold(),
            session.packages().len()
        ),
        format!(
            "{} {}",
            "Fallback:".bright_white().bold(),
            if session.have_fallback() {
                session.config().fallback_name.bright_green()
            } else {
                "missing".bright_yellow()
            }
        ),
    ]);

    println_pad!(
        "\n{}",
        "📦 Activation order (lowest priority first):"
            .bright_blue()
            .bold()
    );
    if session.packages().is_empty() {
        println_pad!("   {}", "(no active packages)".dimmed());
    }
    for (index, package) in session.packages().iter().enumerate() {
        let marker = if package.explicit {
            String::new()
        } else {
            format!(" {}", "(dependency)".dimmed())
        };
        println_pad!(
            "   {} {}{}",
            format!("{:>2}.", index + 1).dimmed(),
            package.name().bright_cyan().bold(),
            marker
        );
    }

    println_pad!(
        "\n{}",
        "🗂️  Search roots (highest priority first):"
            .bright_magenta()
            .bold()
    );
    for (index, root) in session.roots().iter().enumerate() {
        println_pad!(
            "   {} {} {}",
            format!("{:>2}.", index + 1).dimmed(),
            root.kind.to_string().bright_white(),
            root.dir.as_str().dimmed()
        );
    }

    if !session.warnings().is_empty() {
        println_pad!("\n{}", "⚠️  Warnings:".bright_yellow().bold());
        for warning in session.warnings() {
            println_pad!("   {} {}", "•".bright_yellow(), warning);
        }
    }
}
