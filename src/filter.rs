use crate::config::{CrawlConfig, default_exclude_substrings};
use crate::error::CrawlError;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Configuration for URL filtering in crawlers
#[derive(Debug, Clone)]
pub struct UrlFilterConfig {
    /// Host every accepted URL must have, compared exactly (no subdomains)
    pub base_domain: String,

    /// Substrings that reject a URL when contained in it
    pub exclude_substrings: Vec<String>,

    /// Regex patterns for URLs to exclude
    pub exclude_patterns: Vec<String>,
}

impl UrlFilterConfig {
    /// Filter configuration for the given domain with the default exclusions
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
            exclude_substrings: default_exclude_substrings(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Decides which discovered links are worth crawling
#[derive(Debug)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            exclude_regexes,
        })
    }

    /// Build the filter for a crawl run; the crawl domain is the host of the first seed
    pub fn for_crawl(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let seeds = config.parsed_seeds()?;
        let base_domain = seeds
            .first()
            .and_then(|seed| seed.host_str())
            .map(str::to_string)
            .ok_or_else(|| CrawlError::Config("first seed URL has no host".to_string()))?;

        Self::new(UrlFilterConfig {
            base_domain,
            exclude_substrings: config.exclude_substrings.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        })
        .map_err(|e| CrawlError::Config(format!("invalid exclude pattern: {e}")))
    }

    pub fn base_domain(&self) -> &str {
        &self.config.base_domain
    }

    /// Resolve a possibly-relative href against the page it was found on
    pub fn normalize(&self, base: &Url, href: &str) -> Result<Url, CrawlError> {
        normalize(base, href)
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn accept(&self, url: &Url, visited: &HashSet<String>) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_in_domain_scope(url) {
            return false;
        }

        let url_str = url.as_str();
        if self
            .config
            .exclude_substrings
            .iter()
            .any(|needle| url_str.contains(needle.as_str()))
        {
            return false;
        }

        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        !visited.contains(url_str)
    }

    /// Check if a URL is on the crawl domain
    fn is_in_domain_scope(&self, url: &Url) -> bool {
        url.host_str() == Some(self.config.base_domain.as_str())
    }
}

/// Resolve `href` against `base` using standard URL resolution rules
pub fn normalize(base: &Url, href: &str) -> Result<Url, CrawlError> {
    base.join(href).map_err(|source| CrawlError::MalformedLink {
        base: base.to_string(),
        href: href.to_string(),
        source,
    })
}
