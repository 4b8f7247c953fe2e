use std::collections::BTreeMap;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::app::{Result, RunnelError};

/// How a timestamp attribute is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    /// Seconds since the epoch, e.g. `data-utime="1704067200"`.
    UnixSeconds,
    /// e.g. `datetime="2024-01-01T00:00:00.000Z"`.
    Rfc3339,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampRule {
    pub selector: String,
    pub attribute: String,
    pub format: TimestampFormat,
}

/// Redirect links whose real target sits in a query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkShim {
    /// Last path segment of the redirector, e.g. `l.php`.
    pub path: String,
    pub param: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRule {
    /// Marks a post as an activity notice.
    pub selector: String,
    /// Node inside the notice holding its text and link.
    pub text_selector: String,
}

/// Site markup knowledge, expressed as CSS selectors.
///
/// Everything volatile about a timeline's markup lives here so that a
/// markup revision is a config change rather than a code change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupProfile {
    /// Hosts this profile applies to; subdomains match too.
    pub hosts: Vec<String>,
    pub post_selector: String,
    /// Elements matching the post selector that are really parts of posts.
    pub exclude_selectors: Vec<String>,
    /// Widgets that look like posts but have no stable timeline position.
    pub noise_selectors: Vec<String>,
    /// Subtrees removed from a post before its body is read.
    pub strip_selectors: Vec<String>,
    pub name_selector: Option<String>,
    pub description_selector: Option<String>,
    pub timestamp: TimestampRule,
    pub permalink_selector: Option<String>,
    pub link_shim: Option<LinkShim>,
    pub activity: Option<ActivityRule>,
    pub content_selector: Option<String>,
    pub media_selector: Option<String>,
    pub media_inner_selector: Option<String>,
    pub shared_link_selector: Option<String>,
    /// Anchor texts (case-insensitive) marking a repost.
    pub repost_markers: Vec<String>,
    /// Use the whole post as body even when a content node exists.
    pub body_from_post: bool,
    /// Maximum title excerpt length for shared posts; 0 disables cutting.
    pub excerpt_chars: usize,
}

impl Default for MarkupProfile {
    fn default() -> Self {
        Self::generic()
    }
}

impl MarkupProfile {
    /// Plain `<article>` timelines with `<time datetime>` stamps.
    pub fn generic() -> Self {
        Self {
            hosts: Vec::new(),
            post_selector: "article, [role='article']".to_string(),
            exclude_selectors: vec![
                "article article".to_string(),
                "article [role='article']".to_string(),
                "[role='article'] article".to_string(),
                "[role='article'] [role='article']".to_string(),
            ],
            noise_selectors: Vec::new(),
            strip_selectors: vec![
                "form".to_string(),
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
            ],
            name_selector: None,
            description_selector: None,
            timestamp: TimestampRule {
                selector: "time[datetime]".to_string(),
                attribute: "datetime".to_string(),
                format: TimestampFormat::Rfc3339,
            },
            permalink_selector: Some("a[rel~='bookmark']".to_string()),
            link_shim: None,
            activity: None,
            content_selector: None,
            media_selector: None,
            media_inner_selector: None,
            shared_link_selector: None,
            repost_markers: Vec::new(),
            body_from_post: false,
            excerpt_chars: 200,
        }
    }

    pub fn facebook() -> Self {
        Self {
            hosts: vec!["facebook.com".to_string()],
            post_selector: "[role='article']".to_string(),
            // Comments are nested articles
            exclude_selectors: vec!["[role='article'] [role='article']".to_string()],
            noise_selectors: vec![
                "[class~='fbTimelineLikesStory']".to_string(),
                "[class~='pagesLikedByOthers']".to_string(),
            ],
            strip_selectors: vec![
                "form".to_string(),
                "[class~='UFIContainer']".to_string(),
                "script".to_string(),
                "style".to_string(),
            ],
            name_selector: Some("[itemprop='name']".to_string()),
            description_selector: Some("[class='fbLongBlurb']".to_string()),
            timestamp: TimestampRule {
                selector: "abbr[data-utime]".to_string(),
                attribute: "data-utime".to_string(),
                format: TimestampFormat::UnixSeconds,
            },
            permalink_selector: Some("a[class~='uiLinkSubtle']".to_string()),
            link_shim: Some(LinkShim {
                path: "l.php".to_string(),
                param: "u".to_string(),
            }),
            activity: Some(ActivityRule {
                selector: "div[class~='timelineRecentActivityStory']".to_string(),
                text_selector: "div[class='fsl fcg']".to_string(),
            }),
            content_selector: Some("[class='userContent']".to_string()),
            media_selector: Some("[class~='photo']".to_string()),
            media_inner_selector: Some("img[class~='scaledImageFitWidth']".to_string()),
            shared_link_selector: Some("[class~='shareLink']".to_string()),
            repost_markers: Vec::new(),
            body_from_post: false,
            excerpt_chars: 200,
        }
    }

    pub fn twitter() -> Self {
        Self {
            hosts: vec!["twitter.com".to_string(), "x.com".to_string()],
            post_selector: "article".to_string(),
            exclude_selectors: vec!["article article".to_string()],
            // Promoted posts
            noise_selectors: vec!["[data-testid='placementTracking']".to_string()],
            // Reply/repost/like action bar
            strip_selectors: vec!["[role='group']".to_string()],
            name_selector: None,
            description_selector: Some("div[data-testid='UserDescription']".to_string()),
            timestamp: TimestampRule {
                selector: "time[datetime]".to_string(),
                attribute: "datetime".to_string(),
                format: TimestampFormat::Rfc3339,
            },
            permalink_selector: Some("a[href*='/status/']:not([aria-label])".to_string()),
            link_shim: None,
            activity: None,
            content_selector: Some("div[lang]".to_string()),
            media_selector: Some("[data-testid='tweetPhoto']".to_string()),
            media_inner_selector: Some("img".to_string()),
            shared_link_selector: Some("[data-testid='card.wrapper']".to_string()),
            repost_markers: vec!["Retweeted".to_string(), "reposted".to_string()],
            body_from_post: true,
            excerpt_chars: 200,
        }
    }

    pub fn builtin() -> BTreeMap<String, MarkupProfile> {
        BTreeMap::from([
            ("facebook".to_string(), Self::facebook()),
            ("generic".to_string(), Self::generic()),
            ("twitter".to_string(), Self::twitter()),
        ])
    }

    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.hosts.iter().any(|h| {
            let h = h.to_ascii_lowercase();
            host == h || host.ends_with(&format!(".{h}"))
        })
    }

    /// Parse every selector once; a typo fails the run before the browser starts.
    pub fn compile(&self) -> Result<CompiledProfile> {
        let activity = self
            .activity
            .as_ref()
            .map(|rule| {
                Ok::<_, RunnelError>(CompiledActivity {
                    node: parse_selector(&rule.selector)?,
                    text: parse_selector(&rule.text_selector)?,
                })
            })
            .transpose()?;

        Ok(CompiledProfile {
            post: parse_selector(&self.post_selector)?,
            exclude: parse_all(&self.exclude_selectors)?,
            noise: parse_all(&self.noise_selectors)?,
            strip: parse_all(&self.strip_selectors)?,
            name: parse_opt(self.name_selector.as_deref())?,
            description: parse_opt(self.description_selector.as_deref())?,
            timestamp: parse_selector(&self.timestamp.selector)?,
            timestamp_attribute: self.timestamp.attribute.clone(),
            timestamp_format: self.timestamp.format,
            permalink: parse_opt(self.permalink_selector.as_deref())?,
            link_shim: self.link_shim.clone(),
            activity,
            content: parse_opt(self.content_selector.as_deref())?,
            media: parse_opt(self.media_selector.as_deref())?,
            media_inner: parse_opt(self.media_inner_selector.as_deref())?,
            shared_link: parse_opt(self.shared_link_selector.as_deref())?,
            anchor: parse_selector("a")?,
            repost_markers: self
                .repost_markers
                .iter()
                .map(|m| m.to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
            body_from_post: self.body_from_post,
            excerpt_chars: self.excerpt_chars,
        })
    }
}

pub struct CompiledActivity {
    pub node: Selector,
    pub text: Selector,
}

/// A [`MarkupProfile`] with its selectors parsed.
pub struct CompiledProfile {
    pub post: Selector,
    pub exclude: Vec<Selector>,
    pub noise: Vec<Selector>,
    pub strip: Vec<Selector>,
    pub name: Option<Selector>,
    pub description: Option<Selector>,
    pub timestamp: Selector,
    pub timestamp_attribute: String,
    pub timestamp_format: TimestampFormat,
    pub permalink: Option<Selector>,
    pub link_shim: Option<LinkShim>,
    pub activity: Option<CompiledActivity>,
    pub content: Option<Selector>,
    pub media: Option<Selector>,
    pub media_inner: Option<Selector>,
    pub shared_link: Option<Selector>,
    pub anchor: Selector,
    pub repost_markers: Vec<String>,
    pub body_from_post: bool,
    pub excerpt_chars: usize,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| RunnelError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

fn parse_opt(selector: Option<&str>) -> Result<Option<Selector>> {
    selector.map(parse_selector).transpose()
}

fn parse_all(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}
