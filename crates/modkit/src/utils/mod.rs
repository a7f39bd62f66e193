use regex::Regex;
use std::sync::LazyLock;

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

static ANSI_ESCAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new("\x1b\\[[0-9;]*m").ok());

/// Number of visible characters in `s`, ignoring ANSI color sequences.
pub fn visible_width(s: &str) -> usize {
    match ANSI_ESCAPE.as_ref() {
        Some(ansi) => ansi.replace_all(s, "").chars().count(),
        None => s.chars().count(),
    }
}

/// Prints the provided lines inside an ASCII box
pub fn print_ansi_boxed_lines(lines: &[String]) {
    let width = lines
        .iter()
        .map(|s| visible_width(s.as_str()))
        .max()
        .unwrap_or(0);

    let border = "-".repeat(width + 4);
    println_pad!("{}", border);
    for line in lines {
        let pad = width - visible_width(line.as_str());
        println_pad!("| {}{} |", line, " ".repeat(pad));
    }
    println_pad!("{}", border);
}
