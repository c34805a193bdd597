//! Summarization service client
//!
//! The service is treated as a pure function from page text to rewritten
//! text. A failure never stops the crawl; the caller decides what to skip.

mod client;
mod reply;
mod retry;

pub use client::SummarizerClient;
pub use reply::{parse_reply, Reply};
pub use retry::{Backoff, RetryPolicy};

use thiserror::Error;

/// Errors returned by the summarizer client
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Summarizer gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("Summarizer returned an empty response")]
    EmptyResponse,

    #[error("Summarizer response has no completion field")]
    MissingCompletion,

    #[error("Invalid {0} for request headers")]
    InvalidCredentials(&'static str),

    #[error("Failed to build summarizer HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Result type for summarizer operations
pub type SummarizeResult<T> = Result<T, SummarizeError>;
