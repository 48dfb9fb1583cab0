use crate::fetchers::RenderedContent;
use crate::parsers::text::{body_text_and_word_count, normalize_whitespace};
use crate::parsers::{Extraction, FieldExtractor};
use crate::results::SeoFields;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static H1: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static H2: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Elements whose text never shows up as page content
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Built-in selectors should be valid")
}

/// Extracts SEO fields from rendered HTML using `scraper`
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    body_text_limit: usize,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(5000)
    }
}

impl HtmlExtractor {
    /// `body_text_limit` is the character budget kept from each page's body text
    pub fn new(body_text_limit: usize) -> Self {
        Self { body_text_limit }
    }

    /// Extract from a bare HTML string with no browser-reported title
    pub fn extract_html(&self, html: &str) -> Extraction {
        self.extract_document(&Html::parse_document(html), None)
    }

    fn extract_document(&self, doc: &Html, rendered_title: Option<&str>) -> Extraction {
        let title = rendered_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                doc.select(&TITLE)
                    .next()
                    .map(|t| normalize_whitespace(&t.text().collect::<String>()))
                    .unwrap_or_default()
            });

        let meta_description = doc
            .select(&META_DESCRIPTION)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        let h1_headings = headings(doc, &H1);
        let h2_headings = headings(doc, &H2);

        let raw_body = doc
            .select(&BODY)
            .next()
            .map(visible_text)
            .unwrap_or_default();
        let (body_text, word_count) = body_text_and_word_count(&raw_body, self.body_text_limit);

        let image_alt_texts = doc
            .select(&IMG)
            .filter_map(|img| img.value().attr("alt"))
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .map(str::to_string)
            .collect();

        let links: Vec<String> = doc
            .select(&LINK)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect();

        ::log::debug!("HTML extractor found {} links", links.len());

        Extraction::new(
            SeoFields {
                title,
                meta_description,
                h1_headings,
                h2_headings,
                body_text,
                image_alt_texts,
                word_count,
            },
            links,
        )
    }
}

impl FieldExtractor for HtmlExtractor {
    fn extract(&self, content: &RenderedContent) -> Extraction {
        let doc = Html::parse_document(&content.html);
        self.extract_document(&doc, content.title.as_deref())
    }
}

fn headings(doc: &Html, sel: &Selector) -> Vec<String> {
    doc.select(sel)
        .map(|h| normalize_whitespace(&h.text().collect::<Vec<_>>().join(" ")))
        .collect()
}

/// Text of an element, skipping script-like descendants. Text nodes are space-separated.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
    out
}
