use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seo-crawl")]
#[command(about = "Crawls a site in a headless browser and exports SEO fields of every page")]
#[command(version)]
pub struct Args {
    /// Seed URLs; the host of the first one is the crawl domain
    pub seeds: Vec<String>,

    /// JSON configuration file (command-line flags override it)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum link depth from the seeds
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Pause after each page, in milliseconds
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Page load timeout in seconds
    #[arg(long)]
    pub page_load_timeout: Option<u64>,

    /// Seconds to wait for <body> after navigation
    #[arg(long)]
    pub element_timeout: Option<u64>,

    /// Number of browser sessions crawling in parallel
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// CSV file the dataset is written to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Also write a size-bounded analysis payload (prompt + top pages) to this file
    #[arg(long)]
    pub analysis_payload: Option<PathBuf>,

    /// Pages sampled into the analysis payload, by word count
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Token budget of the analysis payload
    #[arg(long, default_value_t = 4000)]
    pub max_tokens: usize,
}
