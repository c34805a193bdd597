//! docs-harvester: a bounded-depth documentation crawler
//!
//! This crate walks a documentation site breadth-first, extracts the readable
//! content of each page, optionally rewrites it through a summarization
//! service, drops duplicates and writes the result into size-capped text files.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod summarizer;
pub mod url;

use thiserror::Error;

/// Main error type for docs-harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output directory {path} is not usable: {reason}")]
    OutputDir { path: String, reason: String },

    #[error("Summarizer error: {0}")]
    Summarize(#[from] summarizer::SummarizeError),

    #[error("Write error: {0}")]
    Write(#[from] output::WriteError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for docs-harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ApiCredentials, Config};
pub use crawler::{crawl, CrawlReport, Crawler};
pub use url::{normalize_url, FilterMode, LinkFilter};
