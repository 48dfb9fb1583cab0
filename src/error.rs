use thiserror::Error;

/// Errors raised by the crawl engine and its default collaborators
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A page did not signal readiness within the configured bound
    #[error("navigation timeout for {url}: {detail}")]
    NavigationTimeout { url: String, detail: String },

    /// Network, navigation or browser failure while fetching a page
    #[error("failed to fetch {url}: {detail}")]
    Fetch { url: String, detail: String },

    /// A discovered href could not be resolved to an absolute URL
    #[error("malformed link {href:?} on {base}: {source}")]
    MalformedLink {
        base: String,
        href: String,
        #[source]
        source: url::ParseError,
    },

    /// The rendering backend could not be started
    #[error("could not initialize rendering backend: {0}")]
    ResourceInit(String),

    /// Invalid configuration (bad seed URL, bad pattern, ...)
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
