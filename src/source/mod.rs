//! Rendered page sources.
//!
//! A page source hands over a document after its dynamic content has
//! settled. Extraction only ever sees the resulting [`Snapshot`].
//!
//! - [`ChromeSource`]: headless Chromium via chromiumoxide
//! - [`StaticPage`]: markup saved to disk, for offline runs

mod chrome;
mod config;
mod static_page;

pub use chrome::{ChromePage, ChromeSource};
pub use config::BrowserConfig;
pub use static_page::StaticPage;

use async_trait::async_trait;

use crate::app::Result;

/// A loaded, rendered page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// URL after redirects
    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Serialized markup of the rendered DOM
    async fn content(&self) -> Result<String>;
}

/// Everything extraction needs from a page, captured once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub url: String,
    pub title: String,
    pub html: String,
}

impl Snapshot {
    pub async fn capture(source: &dyn PageSource) -> Result<Self> {
        Ok(Self {
            url: source.current_url().await?,
            title: source.title().await?,
            html: source.content().await?,
        })
    }
}
