use chrono::{DateTime, Utc};
use url::Url;

use crate::app::Result;

/// Per-run page metadata, built once from the page source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// The URL the run was started with; the worst-case item link.
    pub source_url: String,
    /// Where the browser ended up after redirects.
    pub page_url: String,
    pub base_url: String,
    pub page_title: String,
    pub page_description: String,
    pub most_recent: Option<DateTime<Utc>>,
}

impl PageContext {
    /// Strip query and fragment, then cut at the last `/`.
    ///
    /// `https://www.facebook.com/jane?ref=ts` becomes `https://www.facebook.com`.
    pub fn base_url_of(page_url: &str) -> Result<String> {
        let mut url = Url::parse(page_url)?;
        url.set_query(None);
        url.set_fragment(None);

        let s = url.as_str();
        let path_start = s.find("://").map(|i| i + 3).unwrap_or(0);
        match s[path_start..].rfind('/') {
            Some(i) => Ok(s[..path_start + i].to_string()),
            None => Ok(s.to_string()),
        }
    }

    /// Derive a display name from a document title such as
    /// `Jane Doe (@jane) / X` or `Jane Doe | Facebook`.
    pub fn display_name(title: &str) -> String {
        let mut name = title.trim();
        // Unread counters: `(3) Jane Doe (@jane) / X`
        if let Some((count, rest)) = name.strip_prefix('(').and_then(|r| r.split_once(')')) {
            if !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()) {
                name = rest;
            }
        }
        if let Some(i) = name.find('(') {
            name = &name[..i];
        }
        for sep in [" / ", " | "] {
            if let Some(i) = name.rfind(sep) {
                name = &name[..i];
            }
        }
        name.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
