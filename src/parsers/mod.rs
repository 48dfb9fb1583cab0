pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

pub use html::HtmlExtractor;

use crate::fetchers::RenderedContent;
use crate::results::SeoFields;

/// Result of extracting a rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// SEO fields for the page record
    pub fields: SeoFields,
    /// Raw `href` values, in document order, not yet resolved or filtered
    pub links: Vec<String>,
}

impl Extraction {
    pub fn new(fields: SeoFields, links: Vec<String>) -> Self {
        Self { fields, links }
    }
}

/// Turns rendered content into SEO fields plus outbound links.
///
/// Must not fail on partial documents: missing parts become empty values.
pub trait FieldExtractor {
    fn extract(&self, content: &RenderedContent) -> Extraction;
}
