//! Configuration module for docs-harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and reading the summarizer credentials from the environment.
//!
//! # Example
//!
//! ```no_run
//! use docs_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiCredentials, BackoffConfig, Config, CrawlerConfig, ExtractConfig, FilterConfig, FilterMode,
    OutputConfig, SummarizerConfig, DEFAULT_INSTRUCTION, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_SUMMARIZER_ENDPOINT, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, AGENT_ID_VAR, API_KEY_VAR, ORG_ID_VAR};
pub use validation::validate;
