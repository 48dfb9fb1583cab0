//! Size-bounded hand-off of crawl results to a downstream analysis step.
//!
//! The crawler never talks to a model itself. It ranks pages by word count, renders the best
//! ones as CSV and shrinks the sample until prompt plus data fit a token budget.

use crate::error::Result;
use crate::results::{Dataset, csv_string};

/// Rows sampled by default
pub const DEFAULT_TOP_N: usize = 10;

/// Default token budget for prompt plus data
pub const DEFAULT_MAX_TOKENS: usize = 4000;

pub const DEFAULT_SEO_PROMPT: &str = "\
**Website SEO Analysis Task**

Analyze the following website data to identify SEO improvements for organic traffic.
Provide actionable recommendations with priority levels.

**Data Structure:**
- url: Page address
- title: Meta title
- meta_description: Meta description
- h1_headings / h2_headings: Headings, separated by \" | \"
- body_text: First characters of the visible content
- image_alt_texts: Alt attributes of images
- word_count: Approximate content length
- status / error: Fetch outcome

**Analysis Framework:**
1. Technical SEO: missing or duplicate titles and descriptions, thin content (<500 words),
   multiple H1 tags, images without alt text.
2. Content quality: keyword usage in titles and headings, gaps and duplication, depth.
3. On-page optimization: title, description and heading improvements, internal linking.
4. Action plan: prioritized fixes (High/Medium/Low) with example URLs and expected impact.

**Output Format:** a Markdown report with clear sections.
";

/// Rough token estimate: four characters per token
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Prompt plus a CSV sample of the dataset that fits the token budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPayload {
    pub prompt: String,
    /// CSV with header
    pub data: String,
    /// Number of data rows in `data`
    pub rows: usize,
}

impl AnalysisPayload {
    /// Samples the `top_n` pages with the most words, halving the sample until the estimated
    /// size of prompt plus data is within `max_tokens`. At least one row is kept when the
    /// dataset is not empty, even if it alone exceeds the budget.
    pub fn build(dataset: &Dataset, prompt: &str, top_n: usize, max_tokens: usize) -> Result<Self> {
        let ranked = dataset.top_by_word_count(top_n);
        let mut rows = ranked.len();

        loop {
            let data = csv_string(ranked.iter().take(rows).copied())?;
            let tokens = estimate_tokens(prompt) + estimate_tokens(&data);
            if tokens <= max_tokens || rows <= 1 {
                if tokens > max_tokens {
                    ::log::warn!(
                        "Analysis payload is ~{} tokens, over the {} token budget",
                        tokens,
                        max_tokens
                    );
                }
                ::log::debug!("Analysis payload: {} rows, ~{} tokens", rows, tokens);
                return Ok(Self {
                    prompt: prompt.to_string(),
                    data,
                    rows,
                });
            }
            rows /= 2;
        }
    }

    /// Prompt and data as one message
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.prompt, self.data)
    }

    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.prompt) + estimate_tokens(&self.data)
    }
}
