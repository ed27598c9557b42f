//! Status lines on stderr. Stdout is kept for machine-readable output.

use owo_colors::OwoColorize;

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Dimmed secondary detail, indented under the previous status line.
pub fn detail(message: &str) {
    eprintln!("  {}", message.dimmed());
}
