//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests to fetch page content
//! - Redirect handling (only hops that keep the normalized URL are followed;
//!   other targets go back to the crawl loop)
//! - Error classification

use crate::config::CrawlerConfig;
use crate::url::normalize_url;
use reqwest::{
    header::{CONTENT_TYPE, LOCATION},
    redirect::Policy,
    Client, StatusCode,
};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed from one linked URL
pub const MAX_REDIRECTS: u32 = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// 3xx with a usable Location header
    Redirect {
        /// Absolute redirect target
        location: Url,
    },

    /// HTTP 404; treated like an empty page
    NotFound,

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Any other non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use docs_harvester::config::CrawlerConfig;
/// use docs_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect_policy())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Follows a hop only when it lands on the same normalized URL, such as
/// `/docs` to `/docs/`; any other hop is returned to the caller unfollowed
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS as usize {
            return attempt.error("too many redirects");
        }

        let same_page = attempt
            .previous()
            .first()
            .is_some_and(|origin| same_normalized(origin, attempt.url()));
        if same_page {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}

fn same_normalized(a: &Url, b: &Url) -> bool {
    match (normalize_url(a.as_str()), normalize_url(b.as_str())) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// True for HTML content types, and for a missing one
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    content_type.is_empty()
        || content_type.starts_with("text/html")
        || content_type.starts_with("application/xhtml+xml")
}

/// Fetches a URL and classifies the outcome
///
/// # Outcomes
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx, HTML or no Content-Type | Success |
/// | 2xx, other Content-Type | ContentMismatch |
/// | 3xx to another page | Redirect |
/// | HTTP 404 | NotFound |
/// | Other non-2xx | HttpError |
/// | Timeout, connection or body error | NetworkError |
///
/// Redirects to another page are not followed here, so the caller can filter
/// and dedup the target like any other link. Nothing is retried; a failed page is dropped
/// by the caller.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: classify_error(&e),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|location| response.url().join(location).ok());
        if let Some(location) = location {
            return FetchResult::Redirect { location };
        }
    }

    if status == StatusCode::NOT_FOUND {
        return FetchResult::NotFound;
    }

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { final_url, body },
        Err(e) => FetchResult::NetworkError {
            error: classify_error(&e),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        format!("Too many redirects (limit {})", MAX_REDIRECTS)
    } else {
        e.to_string()
    }
}
