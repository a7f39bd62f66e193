use crate::errors::CliError;
use crate::println_pad;
use crate::utils::config::Overrides;
use colored::Colorize;
use miette::Result;

/// List every installed package, marking active and fallback ones.
pub fn list_packages(overrides: &Overrides) -> Result<()> {
    let session = super::start_session(overrides, None)?;
    let available = session.available_packages().map_err(CliError::from)?;
    let fallback = session.config().fallback_name.as_str();

    println_pad!(
        "{} {}",
        "📦 Installed packages:".bright_blue().bold(),
        available.len()
    );
    for name in &available {
        let active = session.packages().iter().find(|p| p.name() == name.as_str());
        let mut tags = Vec::new();
        match active {
            Some(package) if package.explicit => tags.push("active".bright_green().to_string()),
            Some(_) => tags.push("active, dependency".bright_green().to_string()),
            None => {}
        }
        if name == fallback {
            tags.push("fallback".bright_magenta().to_string());
        }

        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        println_pad!("   {} {}{}", "•".bright_cyan(), name.bright_cyan().bold(), tags);
    }

    Ok(())
}
