//! Console output formatting with ANSI color support.
//!
//! Provides styled terminal output with automatic TTY detection
//! and respect for the NO_COLOR environment variable.

use crate::batch::BatchReport;
use crate::pipeline::{FileOutcome, FileStatus};
use std::io::{self, IsTerminal};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Console output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console instance, detecting color support.
    ///
    /// Colors are disabled if:
    /// - The `NO_COLOR` environment variable is set
    /// - stdout is not a terminal (TTY)
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();

        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", self.label("INFO", Style::Blue), message);
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", self.label("OK", Style::Green), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    pub fn step(&self, message: &str) {
        println!("{} {}", self.label("STEP", Style::Cyan), message);
    }

    /// Prints a section header in magenta bold.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Formats a count with styling.
    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }

    /// One-line description of a processed file.
    pub fn outcome_line(&self, outcome: &FileOutcome) -> String {
        let mut line = format!(
            "{} ({}) -> {}",
            outcome.file,
            outcome.encoding,
            outcome.output.display()
        );
        if outcome.status == FileStatus::Reconciled {
            line.push(' ');
            line.push_str(&self.style("reconciled", &[Style::Yellow]));
        }
        if !outcome.anomalies.is_empty() {
            let unexpanded: usize = outcome.anomalies.iter().map(|a| a.unexpanded).sum();
            line.push(' ');
            line.push_str(&self.style(
                &format!("{} unexpanded iteration marks", unexpanded),
                &[Style::Dim],
            ));
        }
        line
    }

    /// Prints the per-file results and totals of a batch.
    pub fn report(&self, report: &BatchReport) {
        for outcome in &report.processed {
            self.success(&self.outcome_line(outcome));
        }
        for failed in &report.failed {
            self.error(&failed.message);
        }
        for orphan in &report.orphaned_archives {
            self.warning(&format!(
                "{} is archived but has no output; move it back to retry",
                orphan
            ));
        }

        self.section("Summary");
        self.info(&format!(
            "{} succeeded, {} failed",
            self.count(report.success_count()),
            self.style(&report.failure_count().to_string(), &[Style::Red, Style::Bold])
        ));
    }
}
