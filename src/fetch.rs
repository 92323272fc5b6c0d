//! Headless-browser page fetcher.
//!
//! The vendor's availability page is rendered client-side behind
//! bot-detection heuristics: the session masks its automation
//! fingerprints, waits a randomized settle delay instead of a fixed
//! sleep, and scrolls in small steps to drain the virtualized fare list.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures::StreamExt;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::traits::Fetcher;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const VIEWPORT_WIDTH: u32 = 1366;
const VIEWPORT_HEIGHT: u32 = 768;

/// Render-settle delay bounds. Randomized per run so repeated invocations
/// don't hit the vendor on a fixed rhythm.
const SETTLE_DELAY_MIN_MS: u64 = 5_000;
const SETTLE_DELAY_MAX_MS: u64 = 10_000;

const SCROLL_STEPS: u32 = 15;
const SCROLL_STEP_PX: u32 = 800;
const SCROLL_STEP_DELAY_MS: u64 = 500;
const POST_SCROLL_DELAY_MS: u64 = 2_000;

/// Runs before any vendor script: headless Chromium exposes
/// `navigator.webdriver = true`, which the page checks for.
const WEBDRIVER_MASK: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

pub struct PageFetcher {
    headless: bool,
    navigation_timeout: Duration,
    browser: Option<Browser>,
}

impl PageFetcher {
    pub fn new(headless: bool, navigation_timeout: Duration) -> Self {
        Self {
            headless,
            navigation_timeout,
            browser: None,
        }
    }

    fn get_browser(&self) -> Result<&Browser, FetchError> {
        self.browser
            .as_ref()
            .ok_or_else(|| FetchError::BrowserLaunch("browser not initialized".into()))
    }

    async fn new_page(&self) -> Result<Page, FetchError> {
        let page = self
            .get_browser()?
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::BrowserLaunch(e.to_string()))?;

        let mask = AddScriptToEvaluateOnNewDocumentParams::builder()
            .source(WEBDRIVER_MASK)
            .build()
            .map_err(FetchError::BrowserLaunch)?;
        page.execute(mask)
            .await
            .map_err(|e| FetchError::BrowserLaunch(e.to_string()))?;

        Ok(page)
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn initialize(&mut self) -> Result<(), FetchError> {
        info!("initializing browser...");

        // Unique user data dir: every run is an isolated, non-persistent
        // session (no cookies or cache shared between invocations).
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("fare-monitor-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
            .no_sandbox()
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", USER_AGENT));

        if let Ok(chrome_path) =
            std::env::var("CHROME_PATH").or_else(|_| std::env::var("CHROMIUM_PATH"))
        {
            builder = builder.chrome_executable(chrome_path);
        }

        if !self.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::BrowserLaunch(format!("browser config error: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::BrowserLaunch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("browser event: {:?}", event);
            }
        });

        self.browser = Some(browser);
        info!("browser initialized");
        Ok(())
    }

    async fn render(&mut self, url: &str) -> Result<String, FetchError> {
        let page = self.new_page().await?;

        info!(url, "navigating to availability page");
        let timeout_secs = self.navigation_timeout.as_secs();
        let navigation = async {
            page.goto(url)
                .await
                .map_err(|e| FetchError::Navigation(e.to_string()))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| FetchError::Navigation(e.to_string()))?;
            Ok::<(), FetchError>(())
        };
        tokio::time::timeout(self.navigation_timeout, navigation)
            .await
            .map_err(|_| FetchError::Timeout(timeout_secs))??;

        // The fare widgets are populated client-side well after the
        // document shell loads.
        let settle_ms = rand::thread_rng().gen_range(SETTLE_DELAY_MIN_MS..=SETTLE_DELAY_MAX_MS);
        info!(settle_ms, "waiting for client-side rendering");
        sleep(Duration::from_millis(settle_ms)).await;

        debug!("scrolling to load the virtualized fare list");
        let scroll_script = format!("window.scrollBy(0, {})", SCROLL_STEP_PX);
        for _ in 0..SCROLL_STEPS {
            page.evaluate(scroll_script.as_str())
                .await
                .map_err(|e| FetchError::Navigation(e.to_string()))?;
            sleep(Duration::from_millis(SCROLL_STEP_DELAY_MS)).await;
        }
        sleep(Duration::from_millis(POST_SCROLL_DELAY_MS)).await;

        let markup = page
            .content()
            .await
            .map_err(|e| FetchError::Navigation(e.to_string()))?;

        info!(bytes = markup.len(), "rendered page captured");
        Ok(markup)
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if let Some(mut browser) = self.browser.take() {
            debug!("closing browser...");
            if let Err(e) = browser.close().await {
                warn!("browser close failed: {}", e);
            }
            let _ = browser.wait().await;
        }
        Ok(())
    }
}
