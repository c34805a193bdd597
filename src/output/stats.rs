//! Run statistics
//!
//! This module provides the per-run counters collected by the crawl engine
//! and the formatted summary printed at the end of a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Counters and timestamps for one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages fetched (successfully or not)
    pub pages_visited: u64,

    /// Pages whose text was written to output
    pub pages_persisted: u64,

    /// Pages whose text matched an earlier page
    pub duplicates: u64,

    /// Pages whose text was dropped because the summarizer failed
    pub summary_failures: u64,

    /// Pages with no readable text
    pub empty_pages: u64,

    /// Pages answered with 404
    pub not_found: u64,

    /// Pages dropped for network errors, non-HTML bodies or error statuses
    pub fetch_failures: u64,

    /// Redirects to another page; each target is counted as its own page
    pub redirects: u64,

    /// Units that could not be written
    pub write_failures: u64,

    pub endpoints_found: u64,
    pub tables_found: u64,

    /// Output files that received content, in order
    pub files: Vec<PathBuf>,
}

impl CrawlReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_visited: 0,
            pages_persisted: 0,
            duplicates: 0,
            summary_failures: 0,
            empty_pages: 0,
            not_found: 0,
            fetch_failures: 0,
            redirects: 0,
            write_failures: 0,
            endpoints_found: 0,
            tables_found: 0,
            files: Vec::new(),
        }
    }

    pub fn finish(&mut self, files: Vec<PathBuf>) {
        self.finished_at = Some(Utc::now());
        self.files = files;
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of visited pages that ended up persisted, in percent
    pub fn persist_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        (self.pages_persisted as f64 / self.pages_visited as f64) * 100.0
    }
}

/// Prints the report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = report.duration_seconds() {
        println!("  Duration: {} seconds", duration);
    }
    println!();

    println!("Pages:");
    println!("  Visited: {}", report.pages_visited);
    println!("  Persisted: {}", report.pages_persisted);
    println!("  Duplicates: {}", report.duplicates);
    println!("  Empty: {}", report.empty_pages);
    println!("  Not found: {}", report.not_found);
    println!("  Fetch failures: {}", report.fetch_failures);
    println!("  Redirects: {}", report.redirects);
    println!("  Summarizer failures: {}", report.summary_failures);
    if report.write_failures > 0 {
        println!("  Write failures: {}", report.write_failures);
    }
    println!();

    println!("Structured content:");
    println!("  Endpoints: {}", report.endpoints_found);
    println!("  Tables: {}", report.tables_found);
    println!();

    if !report.files.is_empty() {
        println!("Output files ({}):", report.files.len());
        for file in &report.files {
            println!("  - {}", file.display());
        }
        println!();
    }

    println!(
        "Persist Rate: {:.1}% ({} / {} pages persisted)",
        report.persist_rate(),
        report.pages_persisted,
        report.pages_visited
    );
}
