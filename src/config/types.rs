use serde::Deserialize;

/// Main configuration structure for url-evaluator
///
/// Every section and key is optional; missing values fall back to the
/// defaults below, so running without a config file is equivalent to
/// loading an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL (0 = seed page only)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of page visits attempted in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Fixed delay before every fetch (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Maximum number of characters kept from a link's surrounding text
    #[serde(rename = "content-excerpt-size")]
    pub content_excerpt_size: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// User agent sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 32,
            request_delay_ms: 1000,
            content_excerpt_size: 200,
            fetch_timeout_secs: 10,
            user_agent: format!("url-evaluator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Which stored text of a link gets sent to the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    /// The anchor's visible text
    #[default]
    LinkText,
    /// The excerpt of the anchor's enclosing element
    Content,
}

/// Classification queue and scorer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of pending links pulled and committed per batch
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Topic labels appended to the default label set
    #[serde(rename = "additional-topics")]
    pub additional_topics: Vec<String>,

    /// Which link text is classified
    #[serde(rename = "text-source")]
    pub text_source: TextSource,

    /// Zero-shot classification endpoint
    pub endpoint: String,

    /// Environment variable holding the endpoint's bearer token, if any
    #[serde(rename = "api-token-env")]
    pub api_token_env: Option<String>,

    /// Hypothesis sentence; `{}` is replaced by each label
    #[serde(rename = "hypothesis-template")]
    pub hypothesis_template: String,

    /// Per-request timeout for the scorer (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            batch_size: 12,
            additional_topics: Vec::new(),
            text_source: TextSource::default(),
            endpoint: "https://api-inference.huggingface.co/models/facebook/bart-large-mnli"
                .to_string(),
            api_token_env: Some("HF_API_TOKEN".to_string()),
            hypothesis_template: "This text is about {}".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "resources/scraping_results.db".to_string(),
        }
    }
}
