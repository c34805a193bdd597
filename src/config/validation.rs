use crate::config::types::{
    Config, CrawlerConfig, ExtractConfig, FilterConfig, FilterMode, OutputConfig,
    SummarizerConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_filter_config(&config.filter)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    validate_summarizer_config(&config.summarizer)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth and pacing_ms are unsigned; zero is meaningful for both

    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "crawler.workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "crawler.fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler.user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates link filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.mode == FilterMode::Strict && config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "filter.keywords cannot be empty in strict mode".to_string(),
        ));
    }

    let lists = [
        ("filter.required-segments", &config.required_segments),
        ("filter.keywords", &config.keywords),
        ("filter.excluded-topics", &config.excluded_topics),
    ];
    for (name, values) in lists {
        if values.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot contain empty entries",
                name
            )));
        }
    }

    Ok(())
}

fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.boilerplate_phrases.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "extract.boilerplate-phrases cannot contain empty entries".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.max_file_size == 0 {
        return Err(ConfigError::Validation(
            "output.max-file-size must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates summarizer configuration
fn validate_summarizer_config(config: &SummarizerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid summarizer endpoint: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Summarizer endpoint '{}' must use HTTP or HTTPS",
            config.endpoint
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "summarizer.timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "summarizer.max-attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}
