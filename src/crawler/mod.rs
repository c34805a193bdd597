//! Crawler module for documentation-site walking
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and outcome classification
//! - Link discovery
//! - Frontier, visited set and pacing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Crawler, PageStatus};
pub use fetcher::{build_http_client, fetch_url, FetchResult, MAX_REDIRECTS};
pub use parser::{parse_html, ParsedPage};
pub use scheduler::{CrawlTask, Scheduler, VisitedSet};

pub use crate::output::CrawlReport;

use crate::config::{ApiCredentials, Config};
use crate::HarvestError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Normalize the base URL and seed the frontier with it
/// 2. Build the HTTP and summarizer clients
/// 3. Fetch pages breadth-first up to the depth limit
/// 4. Extract, summarize, deduplicate and write each page
/// 5. Follow relevant links
/// 6. Return the run report
///
/// `output_dir` must exist and be writable.
///
/// # Arguments
///
/// * `base_url` - The documentation root to crawl
/// * `output_dir` - Where `<site_name>_<n>.txt` files go
/// * `site_name` - Output file prefix
/// * `config` - The crawler configuration
/// * `credentials` - Summarizer credentials, or `None` to persist extracted text directly
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(HarvestError)` - Crawl could not start
pub async fn crawl(
    base_url: &str,
    output_dir: &Path,
    site_name: &str,
    config: &Config,
    credentials: Option<&ApiCredentials>,
) -> Result<CrawlReport, HarvestError> {
    run_crawl(base_url, output_dir, site_name, config, credentials).await
}
