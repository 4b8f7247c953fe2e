use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Where an item's link came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// A per-post permalink anchor.
    Permalink,
    /// A link embedded in an activity notice; not unique per post.
    Embedded,
    /// No link found, the run's source URL is used.
    Fallback,
}

/// Which step of the timestamp fallback chain produced the item date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    Direct,
    /// Borrowed from the next older post carrying a timestamp.
    Borrowed,
    /// The page-level most recent timestamp.
    PageLatest,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKindTag {
    Activity,
    Shared,
    Original,
    Repost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub url: String,
    pub source: LinkSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    pub at: Option<DateTime<Utc>>,
    pub source: TimestampSource,
}

impl ResolvedTimestamp {
    pub fn missing() -> Self {
        Self {
            at: None,
            source: TimestampSource::Missing,
        }
    }
}

/// A canonical feed entry, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub guid: String,
    pub kind: PostKindTag,
    pub title: String,
    /// Untrusted HTML fragment.
    pub body: String,
    pub link: String,
    pub link_source: LinkSource,
    pub timestamp: Option<DateTime<Utc>>,
    pub timestamp_source: TimestampSource,
}

impl FeedItem {
    pub fn new(
        base_url: &str,
        kind: PostKindTag,
        title: String,
        body: String,
        link: ResolvedLink,
        timestamp: ResolvedTimestamp,
    ) -> Self {
        let guid = Self::generate_guid(base_url, &title, &link, timestamp.at);
        Self {
            guid,
            kind,
            title,
            body,
            link: link.url,
            link_source: link.source,
            timestamp: timestamp.at,
            timestamp_source: timestamp.source,
        }
    }

    /// Permalinks identify themselves; everything else is content-addressed
    /// by base URL, title and timestamp.
    pub fn generate_guid(
        base_url: &str,
        title: &str,
        link: &ResolvedLink,
        timestamp: Option<DateTime<Utc>>,
    ) -> String {
        if link.source == LinkSource::Permalink {
            return link.url.clone();
        }

        let ts = timestamp
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        fingerprint(&format!("{base_url}{title}{ts}"))
    }

    /// True when the guid is literally the item's canonical link.
    pub fn guid_is_permalink(&self) -> bool {
        self.link_source == LinkSource::Permalink && self.guid == self.link
    }
}

/// 32 letters in `a..=p`, two per byte of the truncated SHA-256 digest.
pub fn fingerprint(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(32);
    for byte in digest.iter().take(16) {
        out.push(char::from(b'a' + (byte & 0x0f)));
        out.push(char::from(b'a' + (byte >> 4)));
    }
    out
}
