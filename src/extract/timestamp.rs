use chrono::{DateTime, Utc};
use scraper::ElementRef;

use crate::domain::{ResolvedTimestamp, TimestampSource};
use crate::extract::dom::{Document, ElementExt};
use crate::extract::profile::{CompiledProfile, TimestampFormat};

pub fn parse_timestamp(raw: &str, format: TimestampFormat) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    match format {
        TimestampFormat::UnixSeconds => raw
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        TimestampFormat::Rfc3339 => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
    }
}

fn first_parseable<'a>(
    candidates: impl IntoIterator<Item = ElementRef<'a>>,
    profile: &CompiledProfile,
) -> Option<DateTime<Utc>> {
    candidates.into_iter().find_map(|el| {
        el.attribute(&profile.timestamp_attribute)
            .and_then(|raw| parse_timestamp(raw, profile.timestamp_format))
    })
}

/// The first timestamp-bearing element in the whole document.
pub fn most_recent(doc: &Document, profile: &CompiledProfile) -> Option<DateTime<Utc>> {
    first_parseable(doc.query_all(&profile.timestamp), profile)
}

/// A timestamp carried by the post itself.
pub fn direct(post: ElementRef<'_>, profile: &CompiledProfile) -> Option<DateTime<Utc>> {
    first_parseable(post.query_all(&profile.timestamp), profile)
}

/// Fallback chain for the post at `index`: its own timestamp, then the
/// next older post that has one, then the page's most recent timestamp.
///
/// `direct` holds one entry per located post, `None` for noise.
pub fn resolve(
    index: usize,
    direct: &[Option<DateTime<Utc>>],
    most_recent: Option<DateTime<Utc>>,
) -> ResolvedTimestamp {
    if let Some(at) = direct.get(index).copied().flatten() {
        return ResolvedTimestamp {
            at: Some(at),
            source: TimestampSource::Direct,
        };
    }

    let borrowed = direct
        .iter()
        .skip(index + 1)
        .find_map(|ts| *ts);
    if let Some(at) = borrowed {
        return ResolvedTimestamp {
            at: Some(at),
            source: TimestampSource::Borrowed,
        };
    }

    match most_recent {
        Some(at) => ResolvedTimestamp {
            at: Some(at),
            source: TimestampSource::PageLatest,
        },
        None => ResolvedTimestamp::missing(),
    }
}
