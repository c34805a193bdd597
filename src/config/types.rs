use serde::Deserialize;

/// Fixed browser-like identification sent with every page fetch
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default chat-completions endpoint of the summarization service
pub const DEFAULT_SUMMARIZER_ENDPOINT: &str = "https://api.codegpt.co/api/v1/chat/completions";

/// 1.2 MiB, rounded down to whole bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_258_291;

/// Instruction prepended to every page sent to the summarizer
pub const DEFAULT_INSTRUCTION: &str = "Extract and return only the main content from the following text. \
Preserve all headings, subheadings, and their hierarchy exactly as they appear. \
Keep all technical details, examples, and code snippets intact. \
Maintain the original language and formatting. \
Do not summarize, translate, or alter any information, including headings and code examples:";

/// Main configuration structure for docs-harvester
///
/// Every section has defaults, so an empty TOML file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub filter: FilterConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
    pub summarizer: SummarizerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the base URL (the base URL is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Delay between processed pages (milliseconds)
    #[serde(rename = "pacing-ms")]
    pub pacing_ms: u64,

    /// Number of pages processed concurrently
    pub workers: u32,

    /// Per-request timeout for page fetches (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// User-Agent header sent with page fetches
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            pacing_ms: 1000,
            workers: 1,
            fetch_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// How strictly discovered links are filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Same domain, base path prefix and no excluded topic
    Standard,
    /// Standard rules plus required path segments and a relevance keyword
    #[default]
    Strict,
}

/// Link filter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub mode: FilterMode,

    /// Path segments that must all be present in strict mode
    #[serde(rename = "required-segments")]
    pub required_segments: Vec<String>,

    /// At least one of these must appear in the URL in strict mode
    pub keywords: Vec<String>,

    /// Links whose path contains any of these are never followed
    #[serde(rename = "excluded-topics")]
    pub excluded_topics: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::Strict,
            required_segments: strings(&["developers", "docs"]),
            keywords: strings(&["api", "reference", "documentation", "endpoint", "integration"]),
            excluded_topics: strings(&["login", "signup", "contact", "about", "terms", "privacy"]),
        }
    }
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Elements whose text contains one of these phrases are dropped
    #[serde(rename = "boilerplate-phrases")]
    pub boilerplate_phrases: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            boilerplate_phrases: strings(&[
                "usamos cookies",
                "mejorar tu experiencia",
                "centro de privacidad",
                "política de privacidad",
                "términos y condiciones",
                "aviso legal",
                "we use cookies",
                "cookie policy",
                "privacy policy",
                "terms and conditions",
            ]),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Size cap of a single output file (bytes)
    #[serde(rename = "max-file-size")]
    pub max_file_size: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Delay schedule between summarizer attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackoffConfig {
    /// Same delay after every failed attempt
    Fixed {
        #[serde(rename = "delay-ms")]
        delay_ms: u64,
    },
    /// `initial-ms * 2^attempt`
    Exponential {
        #[serde(rename = "initial-ms")]
        initial_ms: u64,
    },
}

/// Summarization service configuration (credentials live in [`ApiCredentials`])
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Chat-completions endpoint
    pub endpoint: String,

    /// Per-call timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total number of attempts per page, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    pub backoff: BackoffConfig,

    /// Instruction placed before the page text
    pub instruction: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SUMMARIZER_ENDPOINT.to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            backoff: BackoffConfig::Fixed { delay_ms: 2000 },
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

/// Credentials for the summarization service, read once from the environment
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub agent_id: String,
    pub org_id: Option<String>,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .field("agent_id", &self.agent_id)
            .field("org_id", &self.org_id)
            .finish()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
