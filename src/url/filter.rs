//! Link relevance filter
//!
//! Decides which discovered links are worth putting on the frontier. Every
//! rule is conjunctive: a link has to pass all of them.

use crate::config::{FilterConfig, FilterMode};
use crate::url::domain::same_domain;
use url::Url;

/// Relevance filter bound to the base URL of one crawl
#[derive(Debug, Clone)]
pub struct LinkFilter {
    base: Url,
    base_path: String,
    mode: FilterMode,
    required_segments: Vec<String>,
    keywords: Vec<String>,
    excluded_topics: Vec<String>,
}

impl LinkFilter {
    /// Creates a filter for links discovered while crawling `base`
    pub fn new(base: Url, config: &FilterConfig) -> Self {
        let base_path = base.path().trim_end_matches('/').to_string();
        let lower = |values: &[String]| -> Vec<String> {
            values.iter().map(|v| v.to_lowercase()).collect()
        };

        Self {
            base_path,
            base,
            mode: config.mode,
            required_segments: lower(&config.required_segments),
            keywords: lower(&config.keywords),
            excluded_topics: lower(&config.excluded_topics),
        }
    }

    /// The base URL this filter compares against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Checks a candidate link, which may be absolute or relative to the base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use docs_harvester::config::FilterConfig;
    /// use docs_harvester::url::LinkFilter;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/developers/es/docs").unwrap();
    /// let filter = LinkFilter::new(base, &FilterConfig::default());
    ///
    /// assert!(filter.is_relevant("https://example.com/developers/es/docs/api-reference"));
    /// assert!(!filter.is_relevant("https://example.com/login"));
    /// assert!(!filter.is_relevant("https://other.com/docs/api"));
    /// ```
    pub fn is_relevant(&self, candidate: &str) -> bool {
        match self.base.join(candidate.trim()) {
            Ok(url) => self.accepts(&url),
            Err(_) => false,
        }
    }

    /// Checks an already-resolved candidate URL
    pub fn accepts(&self, candidate: &Url) -> bool {
        if candidate.scheme() != "http" && candidate.scheme() != "https" {
            return false;
        }

        if !same_domain(candidate, &self.base) {
            return false;
        }

        let path = candidate.path();
        if !self.under_base_path(path) {
            return false;
        }

        let lower_path = path.to_lowercase();
        if self
            .excluded_topics
            .iter()
            .any(|topic| lower_path.contains(topic.as_str()))
        {
            return false;
        }

        match self.mode {
            FilterMode::Standard => true,
            FilterMode::Strict => {
                self.has_required_segments(&lower_path) && self.has_keyword(candidate)
            }
        }
    }

    /// Prefix match that respects segment boundaries (`/docs` does not cover `/docsearch`)
    fn under_base_path(&self, path: &str) -> bool {
        if self.base_path.is_empty() {
            return true;
        }
        match path.strip_prefix(self.base_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn has_required_segments(&self, lower_path: &str) -> bool {
        self.required_segments
            .iter()
            .all(|required| lower_path.split('/').any(|segment| segment == required))
    }

    fn has_keyword(&self, candidate: &Url) -> bool {
        let lower_url = candidate.as_str().to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| lower_url.contains(keyword.as_str()))
    }
}

/// One-shot form of [`LinkFilter::is_relevant`]
pub fn is_relevant(candidate: &str, base: &Url, config: &FilterConfig) -> bool {
    LinkFilter::new(base.clone(), config).is_relevant(candidate)
}
