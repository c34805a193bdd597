use crate::config::types::{ApiCredentials, Config};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable holding the summarizer API key
pub const API_KEY_VAR: &str = "CODEGPT_API_KEY";
/// Environment variable holding the summarizer agent id
pub const AGENT_ID_VAR: &str = "AGENT_ID";
/// Optional environment variable holding the organization id
pub const ORG_ID_VAR: &str = "CODEGPT_ORG_ID";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use docs_harvester::config::load_config;
///
/// let config = load_config(Path::new("harvester.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

impl ApiCredentials {
    /// Reads the summarizer credentials from the process environment
    ///
    /// The API key and agent id are required; the organization id is optional.
    /// Blank values count as missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = read(API_KEY_VAR).ok_or(ConfigError::MissingEnv(API_KEY_VAR))?;
        let agent_id = read(AGENT_ID_VAR).ok_or(ConfigError::MissingEnv(AGENT_ID_VAR))?;
        let org_id = read(ORG_ID_VAR);

        Ok(Self {
            api_key,
            agent_id,
            org_id,
        })
    }
}
