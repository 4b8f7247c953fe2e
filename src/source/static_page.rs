use std::path::Path;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::app::Result;
use crate::source::PageSource;

/// Markup that was rendered elsewhere, e.g. saved from a browser.
pub struct StaticPage {
    url: String,
    title: String,
    html: String,
}

impl StaticPage {
    pub fn new(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            title: document_title(html),
            html: html.to_string(),
        }
    }

    pub fn from_file(path: &Path, url: &str) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::new(url, &html))
    }
}

fn document_title(html: &str) -> String {
    let doc = Html::parse_document(html);
    Selector::parse("title")
        .ok()
        .and_then(|selector| {
            doc.select(&selector)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

#[async_trait]
impl PageSource for StaticPage {
    async fn current_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.title.clone())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.html.clone())
    }
}
