//! Human-readable status lines.
//!
//! These go to stdout for the operator; diagnostics go through `tracing`.
use crossterm::style::Stylize;

pub fn step(title: &str) {
    println!();
    println!("{} {}", "==>".blue().bold(), title.bold());
}

pub fn info(message: &str) {
    println!("{} {message}", "::".cyan());
}

pub fn success(message: &str) {
    println!("{} {message}", "ok".green().bold());
}

pub fn warn(message: &str) {
    println!("{} {message}", "warning:".yellow().bold());
}

pub fn error(message: &str) {
    eprintln!("{} {message}", "error:".red().bold());
}

/// Indented follow-up lines (commands to copy, URLs).
pub fn detail(message: &str) {
    println!("    {message}");
}
