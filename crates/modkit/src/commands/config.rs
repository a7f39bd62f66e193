use crate::errors::CliError;
use crate::utils::config::{self, AppConfig, Overrides, DEFAULT_ENGINE_VERSION};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8PathBuf>, note: Option<&str>) {
    match path {
        Some(p) => {
            let status = if p.as_std_path().is_dir() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            match note {
                Some(note) => println!(
                    "  {} {} {} {}",
                    format!("{}:", name).bright_white(),
                    p,
                    status,
                    note.dimmed()
                ),
                None => println!("  {} {} {}", format!("{}:", name).bright_white(), p, status),
            }
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

fn print_value_config(name: &str, value: Option<&str>, default: &str) {
    match value {
        Some(value) => println!("  {} {}", format!("{}:", name).bright_white(), value),
        None => println!(
            "  {} {}",
            format!("{}:", name).bright_white(),
            format!("{} (default)", default).dimmed()
        ),
    }
}

pub fn show_config(overrides: &Overrides) -> Result<()> {
    let cfg = overrides.load_config();
    let config_path = overrides
        .config_path()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    println!();
    println!("  {} {}", "config_file:".bright_white(), config_path);

    print_path_config("data_dir", cfg.data_dir.as_ref(), None);

    match &cfg.user_dir {
        Some(user_dir) => print_path_config("user_dir", Some(user_dir), None),
        None => print_path_config(
            "user_dir",
            config::default_user_dir().as_ref(),
            Some("(default)"),
        ),
    }

    print_value_config(
        "engine_version",
        cfg.engine_version.as_deref(),
        &DEFAULT_ENGINE_VERSION.to_string(),
    );
    print_value_config("game", cfg.game.as_deref(), "any");
    print_value_config(
        "fallback",
        cfg.fallback.as_deref(),
        modkit_manifest::FALLBACK_PACKAGE,
    );

    println!();
    Ok(())
}

pub fn reset_config(overrides: &Overrides) -> Result<()> {
    let config_path = overrides.config_path().ok_or(CliError::ConfigPathUnknown)?;

    let default_cfg = AppConfig::default();
    config::save_config(&config_path, &default_cfg)
        .map_err(|e| CliError::config_save_failed(config_path.clone(), e))?;

    println!(
        "{}",
        "✓ Configuration reset to defaults".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), config_path);
    println!();
    println!(
        "  {}",
        "Set data_dir in the config file or pass --data-dir to point modkit at your game data"
            .bright_cyan()
    );

    Ok(())
}
