pub mod webdriver;

pub use webdriver::WebDriverFetcher;

use crate::error::CrawlError;
use thiserror::Error;
use url::Url;

/// A page as the rendering backend saw it after scripts ran
#[derive(Debug, Clone)]
pub struct RenderedContent {
    /// URL that was requested
    pub url: Url,
    /// Serialized DOM after rendering
    pub html: String,
    /// Title reported by the browser, if any
    pub title: Option<String>,
}

impl RenderedContent {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Why a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The page did not become ready within the configured bound
    #[error("timeout: {0}")]
    Timeout(String),

    /// Navigation, network or browser failure
    #[error("{0}")]
    Failed(String),
}

impl FetchError {
    /// Attach the offending URL, for logging and propagation
    pub fn into_crawl_error(self, url: &Url) -> CrawlError {
        match self {
            FetchError::Timeout(detail) => CrawlError::NavigationTimeout {
                url: url.to_string(),
                detail,
            },
            FetchError::Failed(detail) => CrawlError::Fetch {
                url: url.to_string(),
                detail,
            },
        }
    }
}

/// Something that turns a URL into rendered page content.
///
/// Implementations must not let state from one fetch (cookies, storage) leak into the next.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &Url) -> Result<RenderedContent, FetchError>;
}
