use crate::error::{CrawlError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration for a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URLs to start crawling from (depth 0). The host of the first one is the crawl domain.
    pub seed_urls: Vec<String>,

    /// Deepest link level that will be fetched (seeds are depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Pause after every processed page, in milliseconds
    #[serde(default = "default_request_pause_ms")]
    pub request_pause_ms: u64,

    /// Bound on page navigation, in seconds
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Bound on waiting for `<body>` after navigation, in seconds
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,

    /// Number of fetch workers, each with its own browser session
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Substrings that reject a URL when present anywhere in it (case-sensitive)
    #[serde(default = "default_exclude_substrings")]
    pub exclude_substrings: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum number of characters of body text kept per page
    #[serde(default = "default_body_text_limit")]
    pub body_text_limit: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Ask the browser to run without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Where the dataset is written
    #[serde(default = "default_output_csv")]
    pub output_csv: PathBuf,
}

fn default_max_depth() -> usize {
    3
}

fn default_request_pause_ms() -> u64 {
    1000
}

fn default_page_load_timeout_secs() -> u64 {
    30
}

fn default_element_timeout_secs() -> u64 {
    10
}

fn default_concurrency() -> usize {
    1
}

/// Default exclusion substrings: fragments, non-page schemes, documents and images, share links
pub fn default_exclude_substrings() -> Vec<String> {
    ["#", "tel:", "mailto:", ".pdf", "?share=", ".jpg", ".png", ".gif"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_body_text_limit() -> usize {
    5000
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_output_csv() -> PathBuf {
    PathBuf::from("website_data.csv")
}

impl CrawlConfig {
    /// Create a configuration for the given seeds with default values
    pub fn new<I, S>(seed_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seed_urls: seed_urls.into_iter().map(Into::into).collect(),
            max_depth: default_max_depth(),
            request_pause_ms: default_request_pause_ms(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            element_timeout_secs: default_element_timeout_secs(),
            concurrency: default_concurrency(),
            exclude_substrings: default_exclude_substrings(),
            exclude_patterns: Vec::new(),
            body_text_limit: default_body_text_limit(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            output_csv: default_output_csv(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_request_pause(mut self, pause: Duration) -> Self {
        self.request_pause_ms = pause.as_millis() as u64;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_body_text_limit(mut self, limit: usize) -> Self {
        self.body_text_limit = limit;
        self
    }

    pub fn request_pause(&self) -> Duration {
        Duration::from_millis(self.request_pause_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    /// Parse the seed URLs, failing on the first one that is not an absolute http(s) URL
    pub fn parsed_seeds(&self) -> Result<Vec<Url>> {
        if self.seed_urls.is_empty() {
            return Err(CrawlError::Config("no seed URLs given".to_string()));
        }

        self.seed_urls
            .iter()
            .map(|seed| {
                let url = Url::parse(seed)
                    .map_err(|e| CrawlError::Config(format!("invalid seed URL {seed}: {e}")))?;
                if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                    return Err(CrawlError::Config(format!(
                        "seed URL {seed} is not an http(s) URL with a host"
                    )));
                }
                Ok(url)
            })
            .collect()
    }

    /// Check the settings that would otherwise fail late
    pub fn validate(&self) -> Result<()> {
        self.parsed_seeds()?;
        if self.concurrency == 0 {
            return Err(CrawlError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
