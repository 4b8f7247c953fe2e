//! Turns a rendered timeline snapshot into feed items.
//!
//! # Pipeline
//!
//! ```text
//! Snapshot → locate posts → drop noise → sanitize → classify → assemble → FeedItem
//! ```
//!
//! Site knowledge comes from a [`MarkupProfile`]; nothing here mutates the
//! snapshot document.

pub mod dom;
pub mod link;
pub mod locator;
pub mod post;
pub mod profile;
pub mod timestamp;

pub use profile::{CompiledProfile, MarkupProfile, TimestampFormat};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Selector};
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{
    FeedItem, LinkSource, PageContext, ResolvedLink, TimestampSource,
};
use crate::extract::dom::{Document, ElementExt, Fragment};
use crate::extract::post::PostKind;
use crate::source::Snapshot;

pub struct Extractor {
    profile: CompiledProfile,
    /// Removed from each post copy: strip targets and nested look-alike posts.
    detach: Vec<Selector>,
}

impl Extractor {
    pub fn new(profile: &MarkupProfile) -> Result<Self> {
        let profile = profile.compile()?;
        let detach = profile
            .strip
            .iter()
            .chain(&profile.exclude)
            .cloned()
            .collect();
        Ok(Self { profile, detach })
    }

    /// Extract page metadata and items, in timeline order.
    ///
    /// `source_url` is the URL the run started from; it becomes the link of
    /// every item without a permalink.
    pub fn extract(&self, snapshot: &Snapshot, source_url: &str) -> Result<(PageContext, Vec<FeedItem>)> {
        let doc = Document::parse(&snapshot.html);
        let posts = locator::locate(&doc, &self.profile)?;
        info!("Located {} posts", posts.len());

        let context = PageContext {
            source_url: source_url.to_string(),
            page_url: snapshot.url.clone(),
            base_url: PageContext::base_url_of(&snapshot.url)?,
            page_title: locator::page_name(&doc, &self.profile, &snapshot.title)?,
            page_description: locator::page_description(&doc, &self.profile),
            most_recent: timestamp::most_recent(&doc, &self.profile),
        };
        if context.most_recent.is_none() {
            warn!("No timestamp found anywhere on the page");
        }

        // Noise stays in the list as `None` so indices line up for the
        // timestamp lookahead.
        let fragments: Vec<Option<Fragment>> = posts
            .iter()
            .enumerate()
            .map(|(index, post)| {
                if post::is_noise(*post, &self.profile) {
                    debug!(index, "Dropping noise post");
                    None
                } else {
                    Some(post.sanitized(&self.detach))
                }
            })
            .collect();

        let roots: Vec<Option<ElementRef<'_>>> = fragments
            .iter()
            .zip(&posts)
            .map(|(fragment, post)| {
                fragment
                    .as_ref()
                    .map(|f| f.root().unwrap_or(*post))
            })
            .collect();

        let direct: Vec<Option<DateTime<Utc>>> = roots
            .iter()
            .map(|root| root.and_then(|r| timestamp::direct(r, &self.profile)))
            .collect();

        let items: Vec<FeedItem> = roots
            .iter()
            .enumerate()
            .filter_map(|(index, root)| root.map(|r| self.build_item(&context, r, index, &direct)))
            .collect();

        info!(
            "Extracted {} items ({} dropped as noise)",
            items.len(),
            posts.len() - items.len()
        );
        Ok((context, items))
    }

    fn build_item(
        &self,
        context: &PageContext,
        root: ElementRef<'_>,
        index: usize,
        direct: &[Option<DateTime<Utc>>],
    ) -> FeedItem {
        let kind = PostKind::classify(root, &self.profile);
        let content = kind.assemble(root, &context.page_title, &self.profile);
        let link = self.resolve_item_link(root, content.embedded_href.as_deref(), context);
        let ts = timestamp::resolve(index, direct, context.most_recent);

        match ts.source {
            TimestampSource::Direct => {}
            TimestampSource::Borrowed | TimestampSource::PageLatest => {
                debug!(index, source = ?ts.source, "Approximated date: {}", content.title);
            }
            TimestampSource::Missing => warn!("No date: {}", content.title),
        }
        if link.source == LinkSource::Fallback {
            debug!(index, "No permalink, using source URL");
        }

        FeedItem::new(
            &context.base_url,
            kind.tag(),
            content.title,
            content.body,
            link,
            ts,
        )
    }

    fn resolve_item_link(
        &self,
        root: ElementRef<'_>,
        embedded_href: Option<&str>,
        context: &PageContext,
    ) -> ResolvedLink {
        let shim = self.profile.link_shim.as_ref();

        if let Some(url) =
            embedded_href.and_then(|href| link::resolve_link(href, &context.base_url, shim))
        {
            return ResolvedLink {
                url,
                source: LinkSource::Embedded,
            };
        }

        let permalink = self.profile.permalink.as_ref().and_then(|selector| {
            root.query_all(selector).into_iter().find_map(|a| {
                a.attribute("href")
                    .and_then(|href| link::resolve_link(href, &context.base_url, shim))
            })
        });

        match permalink {
            Some(url) => ResolvedLink {
                url,
                source: LinkSource::Permalink,
            },
            None => ResolvedLink {
                url: context.source_url.clone(),
                source: LinkSource::Fallback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fingerprint, PostKindTag};
    use chrono::TimeZone;

    fn snapshot(url: &str, title: &str, html: &str) -> Snapshot {
        Snapshot {
            url: url.to_string(),
            title: title.to_string(),
            html: html.to_string(),
        }
    }

    fn facebook() -> Extractor {
        Extractor::new(&MarkupProfile::facebook()).unwrap()
    }

    const TIMELINE: &str = r#"<html><head><title>Jane Doe | Facebook</title></head><body>
      <h1 itemprop="name">Jane Doe</h1>
      <div class="fbLongBlurb">Posts about <things></div>
      <div role="article" id="p1">
        <div class="userContent"><p>newest, no date</p></div>
      </div>
      <div role="article" id="noise" class="fbTimelineLikesStory">
        <abbr data-utime="1704200000">ignored</abbr>
      </div>
      <div role="article" id="p2">
        <a class="uiLinkSubtle" href="/jane/posts/2"><abbr data-utime="1704067200">Jan 1</abbr></a>
        <div class="userContent"><p>dated</p></div>
        <form class="commentable_item"><textarea>Write a comment</textarea></form>
        <div role="article" id="comment">nested comment</div>
      </div>
      <div role="article" id="p3">
        <div class="userContent"><p>oldest, no date</p></div>
      </div>
    </body></html>"#;

    #[test]
    fn test_extract_timeline() {
        let snap = snapshot("https://www.facebook.com/jane", "Jane Doe | Facebook", TIMELINE);
        let (page, items) = facebook()
            .extract(&snap, "https://www.facebook.com/jane")
            .unwrap();

        assert_eq!(page.page_title, "Jane Doe");
        assert_eq!(page.page_description, "Posts about");
        assert_eq!(page.base_url, "https://www.facebook.com");

        // Noise and the nested comment are gone, order is kept
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Jane Doe: newest, no date",
                "Jane Doe: dated",
                "Jane Doe: oldest, no date"
            ]
        );
    }

    #[test]
    fn test_page_latest_is_first_timestamp_in_document() {
        let snap = snapshot("https://www.facebook.com/jane", "", TIMELINE);
        let (page, _) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();
        // The noise widget comes first in document order
        assert_eq!(
            page.most_recent,
            DateTime::from_timestamp(1704200000, 0)
        );
    }

    #[test]
    fn test_timestamp_fallback_chain() {
        let snap = snapshot("https://www.facebook.com/jane", "", TIMELINE);
        let (page, items) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();
        let jan1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        // Borrowed from the next older genuine post, not from the noise widget
        assert_eq!(items[0].timestamp, Some(jan1));
        assert_eq!(items[0].timestamp_source, TimestampSource::Borrowed);
        assert_eq!(items[1].timestamp, Some(jan1));
        assert_eq!(items[1].timestamp_source, TimestampSource::Direct);
        assert_eq!(items[2].timestamp, page.most_recent);
        assert_eq!(items[2].timestamp_source, TimestampSource::PageLatest);
    }

    #[test]
    fn test_body_is_sanitized() {
        let snap = snapshot("https://www.facebook.com/jane", "", TIMELINE);
        let (_, items) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();
        assert_eq!(items[1].body, "<p>dated</p>");
        assert!(items.iter().all(|i| !i.body.contains("textarea")));
    }

    #[test]
    fn test_links_and_guids() {
        let snap = snapshot("https://www.facebook.com/jane", "", TIMELINE);
        let (page, items) = facebook().extract(&snap, "https://www.facebook.com/jane?src=cron").unwrap();

        assert_eq!(items[1].link, "https://www.facebook.com/jane/posts/2");
        assert_eq!(items[1].link_source, LinkSource::Permalink);
        assert_eq!(items[1].guid, items[1].link);

        assert_eq!(items[0].link, "https://www.facebook.com/jane?src=cron");
        assert_eq!(items[0].link_source, LinkSource::Fallback);
        assert_eq!(
            items[0].guid,
            fingerprint(&format!(
                "{}{}{}",
                page.base_url, "Jane Doe: newest, no date", "2024-01-01T00:00:00Z"
            ))
        );
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let snap = snapshot("https://www.facebook.com/jane", "", TIMELINE);
        let a = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();
        let b = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_activity_link_is_unshimmed_and_not_identity() {
        let html = r#"<span itemprop="name">Jane</span>
          <div role="article">
            <div class="timelineRecentActivityStory">
              <div class="fsl fcg">Jane shared
                <a href="https://l.facebook.com/l.php?u=https%3A%2F%2Fexample.com%2Fnews&amp;h=x">a link</a>
              </div>
            </div>
            <abbr data-utime="1704067200"></abbr>
          </div>"#;
        let snap = snapshot("https://www.facebook.com/jane", "", html);
        let (page, items) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, PostKindTag::Activity);
        assert_eq!(items[0].title, "Jane: Jane shared a link");
        assert_eq!(items[0].link, "https://example.com/news");
        assert_eq!(items[0].link_source, LinkSource::Embedded);
        assert_eq!(
            items[0].guid,
            fingerprint(&format!("{}Jane: Jane shared a link2024-01-01T00:00:00Z", page.base_url))
        );
    }

    #[test]
    fn test_jane_doe_end_to_end_item() {
        let html = r#"<span itemprop="name">Jane Doe</span>
          <div role="article">
            <a class="uiLinkSubtle" href="/jane/posts/42"><abbr data-utime="1704067200">1 Jan</abbr></a>
            <div class="userContent">Hello &lt;world&gt;</div>
          </div>"#;
        let snap = snapshot("https://www.facebook.com/jane", "", html);
        let (_, items) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Jane Doe: Hello <world>");
        assert_eq!(items[0].link, "https://www.facebook.com/jane/posts/42");
        assert_eq!(items[0].guid, "https://www.facebook.com/jane/posts/42");
        assert_eq!(
            items[0].timestamp,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_everything_item() {
        let html = r#"<span itemprop="name">Jane</span>
          <div role="article"><div class="userContent">ok</div></div>"#;
        let snap = snapshot("https://www.facebook.com/jane", "", html);
        let (page, items) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();

        assert_eq!(page.most_recent, None);
        assert_eq!(items[0].title, "Jane: ok");
        assert_eq!(items[0].link, "https://www.facebook.com/jane");
        assert_eq!(items[0].timestamp, None);
        assert_eq!(items[0].timestamp_source, TimestampSource::Missing);
        assert_eq!(
            items[0].guid,
            fingerprint(&format!("{}Jane: ok", page.base_url))
        );
    }

    #[test]
    fn test_nested_comment_is_not_read_as_post() {
        let html = r#"<span itemprop="name">Jane</span>
          <div role="article" id="p1">
            <p>own words</p>
            <div role="article" id="c1">
              <abbr data-utime="1704067200">Jan 1</abbr>
              <span>commenter says hi</span>
            </div>
          </div>"#;
        let snap = snapshot("https://www.facebook.com/jane", "", html);
        let (page, items) = facebook().extract(&snap, "https://www.facebook.com/jane").unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Jane: own words");
        assert!(!items[0].body.contains("commenter"));
        assert!(!items[0].body.contains("data-utime"));
        assert_ne!(items[0].timestamp_source, TimestampSource::Direct);
        // Only the page-level scan still sees the comment's stamp
        assert_eq!(items[0].timestamp_source, TimestampSource::PageLatest);
        assert_eq!(items[0].timestamp, page.most_recent);
    }

    #[test]
    fn test_no_posts_fails_before_anything_else() {
        let snap = snapshot("https://www.facebook.com/jane", "", "<p>Log in</p>");
        let err = facebook()
            .extract(&snap, "https://www.facebook.com/jane")
            .unwrap_err();
        assert!(matches!(err, crate::app::RunnelError::StructuralMismatch(_)));
    }

    #[test]
    fn test_twitter_timeline() {
        let html = r#"<html><head><title>(2) Jane Doe (@jane) / X</title></head><body>
          <article>
            <a href="/jane/status/100"><time datetime="2024-02-01T10:00:00.000Z">Feb 1</time></a>
            <a href="/jane/status/100/analytics" aria-label="View post analytics">stats</a>
            <div lang="en">hello x</div>
            <div role="group"><button>Like</button></div>
          </article>
          <article>
            <div data-testid="placementTracking">Promoted</div>
          </article>
        </body></html>"#;
        let snap = snapshot("https://x.com/jane", "(2) Jane Doe (@jane) / X", html);
        let extractor = Extractor::new(&MarkupProfile::twitter()).unwrap();
        let (page, items) = extractor.extract(&snap, "https://x.com/jane").unwrap();

        assert_eq!(page.page_title, "Jane Doe");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Jane Doe: hello x");
        assert_eq!(items[0].link, "https://x.com/jane/status/100");
        assert_eq!(items[0].kind, PostKindTag::Original);
        assert!(!items[0].body.contains("button"));
    }
}
