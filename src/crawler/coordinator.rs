//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding and draining the frontier in breadth-first batches
//! - Running the page pipeline (fetch, extract, summarize, dedup, write)
//! - Filtering and enqueueing discovered links
//! - Collecting the run report

use crate::config::{ApiCredentials, Config};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::{CrawlTask, Scheduler};
use crate::crawler::{build_http_client, fetch_url, FetchResult, MAX_REDIRECTS};
use crate::extract::{ContentExtractor, ExtractedPage, StructuredContent};
use crate::output::{ChunkedWriter, CrawlReport, DedupLedger};
use crate::summarizer::{SummarizeError, SummarizerClient};
use crate::url::{normalize_url, LinkFilter};
use crate::{ConfigError, HarvestError};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// How a single page ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Text written to output
    Persisted,
    /// Text identical to an earlier page; nothing written
    Duplicate,
    /// No readable text; structured content may still have been written
    Empty,
    /// Summarizer gave up; structured content may still have been written
    SummaryFailed,
    /// Text could not be written
    WriteFailed,
    /// Redirected elsewhere; the target is crawled as its own page
    Redirected,
    /// HTTP 404
    NotFound,
    /// Network error, error status or non-HTML body
    FetchFailed,
}

/// Result of running the pipeline on one page
#[derive(Debug)]
struct PageOutcome {
    status: PageStatus,
    links: Vec<Url>,
    /// Normalized redirect target that passed the link filter
    redirect: Option<Url>,
    endpoints: usize,
    tables: usize,
    write_failures: u64,
}

impl PageOutcome {
    fn without_content(status: PageStatus) -> Self {
        Self {
            status,
            links: Vec::new(),
            redirect: None,
            endpoints: 0,
            tables: 0,
            write_failures: 0,
        }
    }
}

/// Per-page work shared by all workers
///
/// The ledger and writer are the only mutable shared state; their locks are
/// never held across an await.
struct PagePipeline {
    client: Client,
    filter: LinkFilter,
    extractor: ContentExtractor,
    summarizer: Option<SummarizerClient>,
    ledger: Mutex<DedupLedger>,
    writer: Mutex<ChunkedWriter>,
}

impl PagePipeline {
    async fn process(&self, task: &CrawlTask) -> PageOutcome {
        let url = task.url.as_str();
        tracing::debug!("Processing URL: {} (depth {})", url, task.depth);

        let (final_url, body) = match fetch_url(&self.client, url).await {
            FetchResult::Success { final_url, body } => (final_url, body),
            FetchResult::Redirect { location } => {
                let mut outcome = PageOutcome::without_content(PageStatus::Redirected);
                outcome.redirect = self.redirect_target(url, location);
                return outcome;
            }
            FetchResult::NotFound => {
                tracing::info!("Not found: {}", url);
                return PageOutcome::without_content(PageStatus::NotFound);
            }
            FetchResult::ContentMismatch { content_type } => {
                tracing::info!("Skipping {}: expected HTML, got {}", url, content_type);
                return PageOutcome::without_content(PageStatus::FetchFailed);
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Failed to fetch {}: HTTP {}", url, status_code);
                return PageOutcome::without_content(PageStatus::FetchFailed);
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                return PageOutcome::without_content(PageStatus::FetchFailed);
            }
        };

        let page_url = Url::parse(&final_url).unwrap_or_else(|_| task.url.clone());
        let parsed = parse_html(&body, &page_url);
        let links = self.relevant_links(parsed.links);

        let page = ExtractedPage::from_markup(body, &self.extractor);
        let structured = &page.structured;

        let (status, text) = if page.normalized_text.is_empty() {
            tracing::info!("No readable content at {}", url);
            (PageStatus::Empty, None)
        } else {
            match self.render(&page.normalized_text).await {
                Ok(text) => (PageStatus::Persisted, Some(text)),
                Err(e) => {
                    tracing::warn!("Summarizer failed for {}: {}", url, e);
                    (PageStatus::SummaryFailed, None)
                }
            }
        };

        let mut outcome = PageOutcome {
            status,
            links,
            redirect: None,
            endpoints: structured.endpoints.len(),
            tables: structured.tables.len(),
            write_failures: 0,
        };
        self.persist(url, text.as_deref(), structured, &mut outcome);

        if let Some(title) = parsed.title {
            tracing::info!("Processed {} ({}): {:?}", url, title, outcome.status);
        } else {
            tracing::info!("Processed {}: {:?}", url, outcome.status);
        }

        outcome
    }

    /// The text to persist: the summarizer's rewrite, or the extracted text in raw mode
    async fn render(&self, text: &str) -> Result<String, SummarizeError> {
        match &self.summarizer {
            Some(summarizer) => summarizer.summarize(text).await,
            None => Ok(text.to_string()),
        }
    }

    /// Writes the page text, then the endpoint block, then the table block
    ///
    /// A duplicate text suppresses the whole page.
    fn persist(
        &self,
        url: &str,
        text: Option<&str>,
        structured: &StructuredContent,
        outcome: &mut PageOutcome,
    ) {
        if let Some(text) = text {
            let duplicate = self
                .ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_duplicate(text);
            if duplicate {
                tracing::info!("Duplicate content at {}, nothing written", url);
                outcome.status = PageStatus::Duplicate;
                return;
            }
        }

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(text) = text {
            if let Err(e) = writer.write(text) {
                tracing::error!("Failed to write content of {}: {}", url, e);
                outcome.status = PageStatus::WriteFailed;
                outcome.write_failures += 1;
            }
        }

        for block in [structured.endpoint_block(), structured.table_block()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = writer.write(&block) {
                tracing::error!("Failed to write structured content of {}: {}", url, e);
                outcome.write_failures += 1;
            }
        }
    }

    /// A redirect target is held to the same rules as a link
    fn redirect_target(&self, from: &str, location: Url) -> Option<Url> {
        if !self.filter.accepts(&location) {
            tracing::info!("Redirect from {} to {} leaves the docs, dropped", from, location);
            return None;
        }
        match normalize_url(location.as_str()) {
            Ok(target) => {
                tracing::debug!("Redirect from {} to {}", from, target);
                Some(target)
            }
            Err(e) => {
                tracing::debug!("Failed to normalize redirect target {}: {}", location, e);
                None
            }
        }
    }

    /// Keeps links that pass the relevance filter, normalized for the frontier
    fn relevant_links(&self, links: Vec<Url>) -> Vec<Url> {
        links
            .into_iter()
            .filter(|link| self.filter.accepts(link))
            .filter_map(|link| match normalize_url(link.as_str()) {
                Ok(normalized) => Some(normalized),
                Err(e) => {
                    tracing::debug!("Failed to normalize URL {}: {}", link, e);
                    None
                }
            })
            .collect()
    }
}

/// Main crawler structure
pub struct Crawler {
    scheduler: Scheduler,
    pipeline: Arc<PagePipeline>,
    workers: usize,
    report: CrawlReport,
}

impl Crawler {
    /// Creates a crawler for one site
    ///
    /// # Arguments
    ///
    /// * `base_url` - Where the crawl starts; also the root of the link filter
    /// * `output_dir` - Directory for the output files; must already exist
    /// * `site_name` - Prefix of the output file names
    /// * `config` - Validated configuration
    /// * `credentials` - Summarizer credentials; `None` persists the extracted text as-is
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(HarvestError)` - Invalid base URL or site name, or an HTTP client could not be built
    pub fn new(
        base_url: &str,
        output_dir: impl Into<PathBuf>,
        site_name: &str,
        config: &Config,
        credentials: Option<&ApiCredentials>,
    ) -> Result<Self, HarvestError> {
        let base = normalize_url(base_url)?;
        validate_site_name(site_name)?;

        let client = build_http_client(&config.crawler)?;

        let summarizer = match credentials {
            Some(credentials) => Some(SummarizerClient::new(&config.summarizer, credentials)?),
            None => {
                tracing::info!("No summarizer credentials, persisting extracted text as-is");
                None
            }
        };

        let pipeline = PagePipeline {
            client,
            filter: LinkFilter::new(base.clone(), &config.filter),
            extractor: ContentExtractor::new(&config.extract),
            summarizer,
            ledger: Mutex::new(DedupLedger::new()),
            writer: Mutex::new(ChunkedWriter::new(
                output_dir,
                site_name,
                config.output.max_file_size,
            )),
        };

        let scheduler = Scheduler::new(
            base,
            config.crawler.max_depth,
            Duration::from_millis(config.crawler.pacing_ms),
        );

        Ok(Self {
            scheduler,
            pipeline: Arc::new(pipeline),
            workers: config.crawler.workers.max(1) as usize,
            report: CrawlReport::start(),
        })
    }

    /// Runs the crawl until the frontier is empty
    ///
    /// Each iteration pops a batch of up to `workers` tasks, processes them
    /// concurrently, then enqueues their links in task order so the frontier
    /// stays breadth-first.
    pub async fn run(mut self) -> Result<CrawlReport, HarvestError> {
        tracing::info!(
            "Starting crawl (max depth {}, {} worker{})",
            self.scheduler.max_depth(),
            self.workers,
            if self.workers == 1 { "" } else { "s" }
        );
        let start_time = Instant::now();

        loop {
            let batch = self.scheduler.next_batch(self.workers);
            if batch.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            for (task, outcome) in self.process_batch(batch).await {
                self.record(&outcome);
                if let Some(target) = outcome.redirect {
                    self.scheduler.enqueue_redirect(&task, target, MAX_REDIRECTS);
                }
                let added = self.scheduler.enqueue_links(task.depth, outcome.links);
                tracing::debug!("Enqueued {} links from {}", added, task.url);

                if outcome.status != PageStatus::Redirected && self.report.pages_visited % 10 == 0 {
                    let elapsed = start_time.elapsed();
                    let rate = self.report.pages_visited as f64 / elapsed.as_secs_f64();
                    tracing::info!(
                        "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                        self.report.pages_visited,
                        self.scheduler.frontier_size(),
                        rate
                    );
                }
            }

            self.scheduler.pace().await;
        }

        let files = self
            .pipeline
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .files_written()
            .to_vec();
        self.report.finish(files);

        tracing::info!(
            "Crawl completed: {} pages crawled, {} persisted in {:?}",
            self.report.pages_visited,
            self.report.pages_persisted,
            start_time.elapsed()
        );

        Ok(self.report)
    }

    /// Processes a batch concurrently and returns the outcomes in task order
    async fn process_batch(&self, batch: Vec<CrawlTask>) -> Vec<(CrawlTask, PageOutcome)> {
        let mut set = JoinSet::new();
        for (index, task) in batch.into_iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            set.spawn(async move {
                let outcome = pipeline.process(&task).await;
                (index, task, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Page worker failed: {}", e),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, task, outcome)| (task, outcome))
            .collect()
    }

    fn record(&mut self, outcome: &PageOutcome) {
        let report = &mut self.report;
        if outcome.status == PageStatus::Redirected {
            report.redirects += 1;
            return;
        }

        report.pages_visited += 1;
        match outcome.status {
            PageStatus::Persisted => report.pages_persisted += 1,
            PageStatus::Duplicate => report.duplicates += 1,
            PageStatus::Empty => report.empty_pages += 1,
            PageStatus::SummaryFailed => report.summary_failures += 1,
            PageStatus::WriteFailed | PageStatus::Redirected => {}
            PageStatus::NotFound => report.not_found += 1,
            PageStatus::FetchFailed => report.fetch_failures += 1,
        }
        report.write_failures += outcome.write_failures;
        report.endpoints_found += outcome.endpoints as u64;
        report.tables_found += outcome.tables as u64;
    }
}

/// The site name becomes part of a file name
fn validate_site_name(site_name: &str) -> Result<(), ConfigError> {
    let trimmed = site_name.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(ConfigError::Validation(format!(
            "site name '{}' cannot contain path separators",
            site_name
        )));
    }
    Ok(())
}

/// Runs a complete crawl of one site
///
/// # Example
///
/// ```no_run
/// use docs_harvester::config::Config;
/// use docs_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(
///     "https://example.com/developers/docs",
///     Path::new("output"),
///     "example",
///     &Config::default(),
///     None,
/// )
/// .await?;
/// println!("{} pages persisted", report.pages_persisted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    base_url: &str,
    output_dir: impl Into<PathBuf>,
    site_name: &str,
    config: &Config,
    credentials: Option<&ApiCredentials>,
) -> Result<CrawlReport, HarvestError> {
    Crawler::new(base_url, output_dir, site_name, config, credentials)?
        .run()
        .await
}
