//! Formatting functions for UI output.
//!
//! Each `display_*` function prints the string built by its `format_*`
//! counterpart. Styling comes from `console`, which drops colours when the
//! stream is not a terminal.

use console::style;

use crate::preflight::PreflightWarning;

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().for_stderr(), message)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

pub fn format_status(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

pub fn format_preflight_warning(warning: &PreflightWarning) -> String {
    format!("{} {}", style("⚠ WARNING:").yellow().for_stderr(), warning)
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{}", format_success(message));
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{}", format_status(message));
}

/// Display a preflight warning on stderr.
pub fn display_preflight_warning(warning: &PreflightWarning) {
    eprintln!("{}", format_preflight_warning(warning));
}

/// Display the branches the rotator picks from.
pub fn display_available_branches(branches: &[String]) {
    println!("{}", style("Configured branches:").bold());
    for branch in branches {
        println!("  - {}", branch);
    }
}
