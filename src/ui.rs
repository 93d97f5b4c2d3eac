//! Terminal output helpers: status markers and suggestion highlighting.

use colored::Colorize;

use crate::suggest::is_section_boundary;

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn error(title: &str, message: &str) {
    eprintln!("{} {}: {}", "✗".red(), title.red().bold(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "ℹ".cyan(), message.dimmed());
}

pub fn tip(message: &str) {
    println!("\n{}", format!("💡 {message}").dimmed());
}

/// Print the model's suggestion with per-line highlighting inside a rule
/// frame.
pub fn print_suggestion(suggestion: &str) {
    let rule = "─".repeat(50).dimmed();
    println!("\n{rule}");
    for line in suggestion.lines() {
        println!("{}", highlight_line(line));
    }
    println!("{rule}\n");
}

/// Color one suggestion line by what it is.
fn highlight_line(line: &str) -> String {
    let trimmed = line.trim_start();
    if is_section_boundary(trimmed) {
        return line.magenta().bold().to_string();
    }
    if trimmed.starts_with("git add") {
        return line.cyan().to_string();
    }
    if trimmed.starts_with("git commit") {
        return line.green().to_string();
    }
    if trimmed.starts_with("pr title:") || trimmed.starts_with("pr description:") {
        return line.yellow().to_string();
    }
    if trimmed.starts_with("why:") {
        return format!("   {}", line.purple().italic());
    }
    line.to_string()
}
