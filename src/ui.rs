// Terminal output for warmup commands

use colored::Colorize;

use crate::services::{PassReport, WarmupLog};

pub fn print_header(title: &str) {
    println!();
    println!("{}", format!("== {} ==", title).bright_blue().bold());
}

/// A folder the clean command removed
pub fn print_removed(folder: &str) {
    println!("{} {}", "removed".bright_green().bold(), folder);
}

/// Neutral one-liner, e.g. nothing to do
pub fn print_note(message: &str) {
    println!("{} {}", "·".dimmed(), message.bright_cyan());
}

/// Failed invocations across every pass of one command
pub fn print_failure_total(failures: u32) {
    eprintln!(
        "{}",
        format!("{} invocation(s) failed", failures).bright_red().bold()
    );
}

/// One line per target, then a total
pub fn print_pass_summary(report: &PassReport) {
    for result in &report.results {
        let line = format!(
            "  {:<48} {} ok / {} failed",
            result.target, result.succeeded, result.failed
        );
        if result.has_failures() {
            println!("{}", line.bright_red());
        } else {
            println!("{}", line.green());
        }
    }

    let total = pass_total(report);
    if report.total_failures() == 0 {
        println!("{}", total.bright_green().bold());
    } else {
        println!("{}", total.bright_yellow().bold());
    }
}

fn pass_total(report: &PassReport) -> String {
    format!(
        "{}: {} of {} invocations succeeded",
        report.warmer,
        report.attempts() - report.total_failures(),
        report.attempts()
    )
}

/// Pass messages on the terminal: progress to stdout, attempt errors to stderr
pub struct TerminalLog;

impl WarmupLog for TerminalLog {
    fn info(&self, message: &str) {
        println!("  {}", message.dimmed());
    }

    fn error(&self, message: &str) {
        eprintln!("  {} {}", "error".bright_red().bold(), message);
    }
}
