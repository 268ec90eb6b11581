//! Progress reporting for the sort
//!
//! Provides a spinner while leaves are being queued and a styled header and
//! summary around the run.

use crate::walker::SortSummary;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays sort status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new_spinner())
    }

    /// Create a reporter that draws nothing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, queued: u64, queue_len: usize) {
        let msg = format!(
            "Leaves queued: {} | Waiting in queue: {}",
            format_number(queued),
            queue_len,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Current message, mostly for tests
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the sort results
pub fn print_summary(summary: &SortSummary, destination: &str) {
    let stats = &summary.stats;
    let duration_secs = summary.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.files_copied as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Sort Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Leaf directories:").bold(),
        format_number(summary.leaves_queued)
    );
    println!(
        "  {} {}",
        style("Files copied:").bold(),
        format_number(stats.files_copied)
    );
    println!(
        "  {} {}",
        style("Undated:").bold(),
        format_number(stats.undated)
    );
    println!(
        "  {} {}",
        style("Total Size:").bold(),
        format_size(stats.bytes, BINARY)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if summary.error_count() > 0 {
        println!(
            "  {} {} (leaves: {}, copies: {}, unreadable dirs: {})",
            style("Errors:").yellow().bold(),
            format_number(summary.error_count()),
            stats.failed_leaves,
            stats.files_failed,
            summary.discovery_errors,
        );
    }
    println!("  {} {}", style("Output:").bold(), destination);
    println!();
}

/// Print a header at the start of the sort
pub fn print_header(source: &str, workers: usize, destination: &str, dry_run: bool) {
    println!();
    println!(
        "{} {}",
        style("relabel").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), source);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Output:").bold(), destination);
    if dry_run {
        println!("  {}", style("Dry run: nothing will be written").yellow());
    }
    println!();
}
