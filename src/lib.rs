//! Depth-bounded, same-domain crawler that renders pages in a real browser and collects
//! the SEO fields of every page it visits.

pub mod analysis;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod frontier;
pub mod parsers;
pub mod results;

// Re-export commonly used types for convenience
pub use config::CrawlConfig;
pub use crawlers::{CrawlReport, CrawlState, Crawler, StopHandle};
pub use error::CrawlError;
pub use fetchers::{FetchError, PageFetcher, RenderedContent, WebDriverFetcher};
pub use frontier::{CrawlTask, Frontier};
pub use parsers::{Extraction, FieldExtractor, HtmlExtractor};
pub use results::{Dataset, PageOutcome, PageRecord, PageStatus, SeoFields};
