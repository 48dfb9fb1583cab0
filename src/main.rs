use clap::Parser;
use seo_crawl::analysis::AnalysisPayload;
use seo_crawl::analysis::DEFAULT_SEO_PROMPT;
use seo_crawl::fetchers::webdriver::close_all;
use seo_crawl::{CrawlConfig, CrawlError, Crawler, WebDriverFetcher};
use std::process::ExitCode;
use std::time::Duration;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Configuration file (if any), then command-line flags, then `WEBDRIVER_URL`
fn build_config(args: &Args) -> Result<CrawlConfig, CrawlError> {
    let mut config = match &args.config {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::new(Vec::<String>::new()),
    };

    if !args.seeds.is_empty() {
        config.seed_urls = args.seeds.clone();
    }
    if let Some(max_depth) = args.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if let Some(pause_ms) = args.pause_ms {
        config = config.with_request_pause(Duration::from_millis(pause_ms));
    }
    if let Some(secs) = args.page_load_timeout {
        config.page_load_timeout_secs = secs;
    }
    if let Some(secs) = args.element_timeout {
        config.element_timeout_secs = secs;
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(output) = &args.output {
        config.output_csv = output.clone();
    }
    if args.headed {
        config.headless = false;
    }

    // Override the WebDriver URL with an environment variable if provided
    if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
        if !webdriver_url.is_empty() {
            config.webdriver_url = webdriver_url;
        }
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<(), CrawlError> {
    let config = build_config(&args)?;
    let crawler = Crawler::new(config.clone())?;

    let stop = crawler.stop_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::warn!("Interrupted, finishing pages in flight");
            stop.stop();
        }
    });

    let result = crawl_and_save(&args, &config, &crawler).await;
    interrupt.abort();
    result
}

/// Connects the sessions, crawls, and writes the outputs. Sessions are closed on every path.
async fn crawl_and_save(
    args: &Args,
    config: &CrawlConfig,
    crawler: &Crawler,
) -> Result<(), CrawlError> {
    ::log::info!(
        "Connecting to WebDriver at {} ({} session(s))",
        config.webdriver_url,
        config.concurrency
    );
    let fetchers = WebDriverFetcher::connect_many(config, &crawler.stop_handle()).await?;

    let start_time = std::time::Instant::now();
    let outcome = crawler.run(&fetchers).await;
    close_all(fetchers).await;
    let report = outcome?;

    report.dataset.save_csv(&config.output_csv)?;
    ::log::info!(
        "Crawl complete! Saved {} pages to {} in {:.2} seconds",
        report.dataset.len(),
        config.output_csv.display(),
        start_time.elapsed().as_secs_f64()
    );

    if let Some(path) = &args.analysis_payload {
        let payload =
            AnalysisPayload::build(&report.dataset, DEFAULT_SEO_PROMPT, args.top_n, args.max_tokens)?;
        std::fs::write(path, payload.render())?;
        ::log::info!(
            "Analysis payload with {} pages (~{} tokens) written to {}",
            payload.rows,
            payload.estimated_tokens(),
            path.display()
        );
    }

    Ok(())
}
