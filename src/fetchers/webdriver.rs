use crate::config::CrawlConfig;
use crate::crawlers::StopHandle;
use crate::error::CrawlError;
use crate::fetchers::{FetchError, PageFetcher, RenderedContent};
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Endpoints tried when the configured WebDriver URL does not answer
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

/// Slack on top of the driver-side page load timeout before we give up on the command itself
const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

/// Renders pages in a real browser driven over the WebDriver protocol
pub struct WebDriverFetcher {
    client: Client,
    page_load_timeout: Duration,
    element_timeout: Duration,
}

impl WebDriverFetcher {
    /// Connects to the configured WebDriver, falling back to well-known local endpoints.
    ///
    /// Fails with `CrawlError::ResourceInit` if no endpoint accepts a session.
    pub async fn connect(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let caps = capabilities(config);

        let mut candidates = vec![config.webdriver_url.as_str()];
        candidates.extend(
            FALLBACK_WEBDRIVER_URLS
                .iter()
                .copied()
                .filter(|url| *url != config.webdriver_url),
        );

        let mut last_error = String::from("no WebDriver endpoint configured");
        for (attempt, webdriver_url) in candidates.into_iter().enumerate() {
            if attempt > 0 {
                ::log::info!("Trying fallback WebDriver URL: {}", webdriver_url);
            }
            match ClientBuilder::native()
                .capabilities(caps.clone())
                .connect(webdriver_url)
                .await
            {
                Ok(client) => {
                    ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                    return Ok(Self {
                        client,
                        page_load_timeout: config.page_load_timeout(),
                        element_timeout: config.element_timeout(),
                    });
                }
                Err(e) => {
                    ::log::debug!("WebDriver at {} refused session: {}", webdriver_url, e);
                    last_error = format!("{webdriver_url}: {e}");
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(CrawlError::ResourceInit(last_error))
    }

    /// Opens one browser session per worker. Sessions opened before a failure or a stop
    /// request are closed again.
    pub async fn connect_many(
        config: &CrawlConfig,
        stop: &StopHandle,
    ) -> Result<Vec<Self>, CrawlError> {
        let mut fetchers = Vec::with_capacity(config.concurrency);
        for _ in 0..config.concurrency.max(1) {
            if stop.is_stopped() {
                close_all(fetchers).await;
                return Err(CrawlError::ResourceInit(
                    "interrupted while connecting".to_string(),
                ));
            }
            match Self::connect(config).await {
                Ok(fetcher) => fetchers.push(fetcher),
                Err(e) => {
                    close_all(fetchers).await;
                    return Err(e);
                }
            }
        }
        Ok(fetchers)
    }

    /// Ends the browser session
    pub async fn close(self) -> Result<(), CrawlError> {
        self.client
            .close()
            .await
            .map_err(|e| CrawlError::Fetch {
                url: String::from("<session>"),
                detail: format!("failed to close WebDriver session: {e}"),
            })
    }

    async fn navigate(&self, url: &Url) -> Result<(), FetchError> {
        let navigation = timeout(
            self.page_load_timeout + NAVIGATION_GRACE,
            self.client.goto(url.as_str()),
        )
        .await;

        match navigation {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(classify(e, self.page_load_timeout)),
            Err(_) => Err(FetchError::Timeout(format!(
                "page load timeout ({}s)",
                self.page_load_timeout.as_secs()
            ))),
        }
    }
}

impl PageFetcher for WebDriverFetcher {
    async fn fetch(&self, url: &Url) -> Result<RenderedContent, FetchError> {
        // Fresh state for every page
        cookies_cleared(url, self.client.delete_all_cookies().await);

        self.navigate(url).await?;

        self.client
            .wait()
            .at_most(self.element_timeout)
            .for_element(Locator::Css("body"))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => FetchError::Timeout(format!(
                    "body not ready after {}s",
                    self.element_timeout.as_secs()
                )),
                other => classify(other, self.page_load_timeout),
            })?;

        let title = self.client.title().await.ok();
        let html = self
            .client
            .source()
            .await
            .map_err(|e| classify(e, self.page_load_timeout))?;

        let mut content = RenderedContent::new(url.clone(), html);
        if let Some(title) = title {
            content = content.with_title(title);
        }
        Ok(content)
    }
}

/// Closes every session, logging rather than failing
pub async fn close_all(fetchers: Vec<WebDriverFetcher>) {
    for fetcher in fetchers {
        if let Err(e) = fetcher.close().await {
            ::log::warn!("{}", e);
        }
    }
}

/// Some drivers reject cookie commands before the first navigation; the page is still fetched
fn cookies_cleared(url: &Url, result: Result<(), CmdError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            ::log::warn!("Could not clear cookies before {}: {}", url, e);
            false
        }
    }
}

fn classify(error: CmdError, page_load_timeout: Duration) -> FetchError {
    match &error {
        CmdError::WaitTimeout => FetchError::Timeout(error.to_string()),
        CmdError::Standard(wd) if matches!(wd.error, ErrorStatus::Timeout) => FetchError::Timeout(
            format!("page load timeout ({}s)", page_load_timeout.as_secs()),
        ),
        _ => FetchError::Failed(error.to_string()),
    }
}

fn capabilities(config: &CrawlConfig) -> Capabilities {
    let mut args = vec![
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--disable-infobars".to_string(),
        "--disable-notifications".to_string(),
        "--window-size=1280,1024".to_string(),
    ];
    if config.headless {
        args.insert(0, "--headless=new".to_string());
    }

    let mut chrome_options = json!({ "args": args });
    if let Ok(binary) = std::env::var("CHROME_BIN") {
        if !binary.is_empty() {
            chrome_options["binary"] = json!(binary);
        }
    }

    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), chrome_options);
    caps.insert(
        "timeouts".to_string(),
        json!({ "pageLoad": config.page_load_timeout().as_millis() as u64 }),
    );
    caps
}
