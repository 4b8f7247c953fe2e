use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::app::{Result, RunnelError};
use crate::source::config::BrowserConfig;
use crate::source::PageSource;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A headless Chromium instance driven over CDP
pub struct ChromeSource {
    browser: Browser,
    handler: JoinHandle<()>,
    config: BrowserConfig,
}

impl ChromeSource {
    /// Launch the browser with the given configuration
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let mut builder = CdpBrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .window_size(config.window_width, config.window_height)
            .request_timeout(config.timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| RunnelError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| RunnelError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            )))?;

        // Drive the CDP connection
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        Ok(Self {
            browser,
            handler,
            config,
        })
    }

    /// Navigate to `url` and wait until an element matching `ready_selector`
    /// exists, plus the configured settle time.
    pub async fn open(&self, url: &str, ready_selector: &str) -> Result<ChromePage> {
        info!("Opening {}", url);
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RunnelError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| RunnelError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        page.goto(url)
            .await
            .map_err(|e| RunnelError::Browser(format!("Navigation failed: {}", e)))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| RunnelError::Browser(format!("Navigation failed: {}", e)))?;

        let page = ChromePage { page };
        if !page.wait_for(ready_selector, self.config.ready_timeout()).await? {
            // Extraction will report the mismatch
            warn!("No element matched `{}` before the timeout", ready_selector);
        }

        tokio::time::sleep(self.config.wait_after_load()).await;
        Ok(page)
    }

    /// Shut the browser down; failures are logged, not returned.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
    }
}

/// One open tab
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    /// Evaluate a script in the page context
    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.page
            .evaluate(script.to_string())
            .await
            .map_err(|e| RunnelError::Browser(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| RunnelError::Browser(format!("Failed to parse result: {:?}", e)))
    }

    /// Poll until `selector` matches; `Ok(false)` on timeout.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let script = ready_script(selector);
        let deadline = Instant::now() + timeout;

        loop {
            if self.evaluate(&script).await?.as_bool() == Some(true) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl PageSource for ChromePage {
    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(|e| RunnelError::Browser(format!("Failed to read page URL: {}", e)))?
            .ok_or_else(|| RunnelError::Browser("Page has no URL".to_string()))
    }

    async fn title(&self) -> Result<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(|e| RunnelError::Browser(format!("Failed to read page title: {}", e)))?
            .unwrap_or_default())
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| RunnelError::Browser(format!("Failed to read page content: {}", e)))
    }
}

fn ready_script(selector: &str) -> String {
    format!(
        "document.querySelector({}) !== null",
        serde_json::Value::from(selector)
    )
}
