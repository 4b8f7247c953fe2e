use scraper::ElementRef;

use crate::domain::PostKindTag;
use crate::extract::dom::ElementExt;
use crate::extract::profile::CompiledProfile;

/// What a located post turned out to be, checked in declaration order.
#[derive(Debug, Clone, Copy)]
pub enum PostKind<'a> {
    /// A page or relationship-change story.
    Activity { notice: ElementRef<'a> },
    /// Original text wrapped together with attached media or a shared link.
    Shared {
        content: ElementRef<'a>,
        media: Option<ElementRef<'a>>,
        shared_link: Option<ElementRef<'a>>,
    },
    Original {
        content: Option<ElementRef<'a>>,
        repost: bool,
    },
}

/// Title, body and optional link assembled for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub body: String,
    /// Link carried by an activity notice, still unresolved.
    pub embedded_href: Option<String>,
}

/// Noise never becomes an item.
pub fn is_noise(post: ElementRef<'_>, profile: &CompiledProfile) -> bool {
    profile
        .noise
        .iter()
        .any(|selector| post.matches_or_contains(selector))
}

impl<'a> PostKind<'a> {
    pub fn classify(post: ElementRef<'a>, profile: &CompiledProfile) -> Self {
        if let Some(activity) = &profile.activity {
            if let Some(node) = post.query(&activity.node) {
                let notice = node.query(&activity.text).unwrap_or(node);
                return PostKind::Activity { notice };
            }
        }

        let content = profile.content.as_ref().and_then(|s| post.query(s));
        if let Some(content) = content {
            let media = profile.media.as_ref().and_then(|s| post.query(s));
            let shared_link = profile.shared_link.as_ref().and_then(|s| post.query(s));
            if media.is_some() || shared_link.is_some() {
                return PostKind::Shared {
                    content,
                    media,
                    shared_link,
                };
            }
        }

        PostKind::Original {
            content,
            repost: is_repost(post, profile),
        }
    }

    pub fn tag(&self) -> PostKindTag {
        match self {
            PostKind::Activity { .. } => PostKindTag::Activity,
            PostKind::Shared { .. } => PostKindTag::Shared,
            PostKind::Original { repost: true, .. } => PostKindTag::Repost,
            PostKind::Original { repost: false, .. } => PostKindTag::Original,
        }
    }

    pub fn assemble(
        &self,
        post: ElementRef<'a>,
        page_title: &str,
        profile: &CompiledProfile,
    ) -> PostContent {
        match *self {
            PostKind::Activity { notice } => PostContent {
                title: compose_title(page_title, "", &notice.inner_text()),
                body: notice.inner_html(),
                embedded_href: notice
                    .query(&profile.anchor)
                    .and_then(|a| a.attribute("href"))
                    .map(str::to_string),
            },
            PostKind::Shared {
                content,
                media,
                shared_link,
            } => {
                let mut body = format!("<div>{}</div>", content.inner_html());
                if let Some(media) = media {
                    let inner = profile
                        .media_inner
                        .as_ref()
                        .and_then(|s| media.query(s))
                        .unwrap_or(media);
                    body.push_str(&format!("<div>{}</div>", inner.outer_html()));
                }
                if let Some(link) = shared_link {
                    body.push_str(&link.outer_html());
                }

                PostContent {
                    title: compose_title(
                        page_title,
                        "",
                        &excerpt(&content.inner_text(), profile.excerpt_chars),
                    ),
                    body,
                    embedded_href: None,
                }
            }
            PostKind::Original { content, repost } => {
                let text_node = content.unwrap_or(post);
                let body_node = if profile.body_from_post {
                    post
                } else {
                    text_node
                };
                PostContent {
                    title: compose_title(
                        page_title,
                        if repost { " RT" } else { "" },
                        &text_node.inner_text(),
                    ),
                    body: body_node.inner_html(),
                    embedded_href: None,
                }
            }
        }
    }
}

fn is_repost(post: ElementRef<'_>, profile: &CompiledProfile) -> bool {
    if profile.repost_markers.is_empty() {
        return false;
    }
    post.query_all(&profile.anchor).iter().any(|a| {
        let text = a.inner_text().to_lowercase();
        profile.repost_markers.iter().any(|m| text.contains(m))
    })
}

/// `{page}{marker}: {text}`, or just `{page}{marker}` when there is no text.
pub fn compose_title(page_title: &str, marker: &str, text: &str) -> String {
    if text.is_empty() {
        format!("{page_title}{marker}")
    } else {
        format!("{page_title}{marker}: {text}")
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::dom::Document;
    use crate::extract::profile::MarkupProfile;
    use scraper::Selector;

    fn first_post<'a>(doc: &'a Document, profile: &CompiledProfile) -> ElementRef<'a> {
        doc.query(&profile.post).expect("fixture has a post")
    }

    #[test]
    fn test_classify_activity_wins_over_content() {
        let profile = MarkupProfile::facebook().compile().unwrap();
        let doc = Document::parse(
            r#"<div role="article">
                 <div class="timelineRecentActivityStory x">
                   <div class="fsl fcg">Jane likes <a href="/acme">Acme</a>.</div>
                 </div>
                 <div class="userContent">ignored</div>
                 <div class="photo"><img src="a.png"></div>
               </div>"#,
        );
        let post = first_post(&doc, &profile);
        let kind = PostKind::classify(post, &profile);
        assert_eq!(kind.tag(), PostKindTag::Activity);

        let content = kind.assemble(post, "Jane Doe", &profile);
        assert_eq!(content.title, "Jane Doe: Jane likes Acme.");
        assert_eq!(content.body, r#"Jane likes <a href="/acme">Acme</a>."#);
        assert_eq!(content.embedded_href.as_deref(), Some("/acme"));
    }

    #[test]
    fn test_classify_shared_appends_media_then_link() {
        let profile = MarkupProfile::facebook().compile().unwrap();
        let doc = Document::parse(
            r#"<div role="article">
                 <div class="shareLink"><a href="https://example.com">example</a></div>
                 <div class="userContent"><p>Look at this</p></div>
                 <div class="photo big"><img class="scaledImageFitWidth img" src="p.jpg"></div>
               </div>"#,
        );
        let post = first_post(&doc, &profile);
        let kind = PostKind::classify(post, &profile);
        assert_eq!(kind.tag(), PostKindTag::Shared);

        let content = kind.assemble(post, "Jane Doe", &profile);
        assert_eq!(content.title, "Jane Doe: Look at this");
        assert_eq!(
            content.body,
            concat!(
                "<div><p>Look at this</p></div>",
                r#"<div><img class="scaledImageFitWidth img" src="p.jpg"></div>"#,
                r#"<div class="shareLink"><a href="https://example.com">example</a></div>"#,
            )
        );
    }

    #[test]
    fn test_shared_media_without_inner_image_uses_block() {
        let profile = MarkupProfile::facebook().compile().unwrap();
        let doc = Document::parse(
            r#"<div role="article"><div class="userContent">hi</div><a class="photo" href="/p/1">pic</a></div>"#,
        );
        let post = first_post(&doc, &profile);
        let content = PostKind::classify(post, &profile).assemble(post, "Jane", &profile);
        assert_eq!(
            content.body,
            r#"<div>hi</div><div><a class="photo" href="/p/1">pic</a></div>"#
        );
    }

    #[test]
    fn test_plain_post_uses_content_node() {
        let profile = MarkupProfile::facebook().compile().unwrap();
        let doc = Document::parse(
            r#"<div role="article"><h5>Jane</h5><div class="userContent"><p>Hello &lt;world&gt;</p></div></div>"#,
        );
        let post = first_post(&doc, &profile);
        let kind = PostKind::classify(post, &profile);
        assert_eq!(kind.tag(), PostKindTag::Original);

        let content = kind.assemble(post, "Jane Doe", &profile);
        assert_eq!(content.title, "Jane Doe: Hello <world>");
        assert_eq!(content.body, "<p>Hello &lt;world&gt;</p>");
    }

    #[test]
    fn test_plain_post_without_content_node_falls_back_to_post() {
        let profile = MarkupProfile::facebook().compile().unwrap();
        let doc = Document::parse(r#"<div role="article"><span>just text</span></div>"#);
        let post = first_post(&doc, &profile);
        let content = PostKind::classify(post, &profile).assemble(post, "Jane", &profile);
        assert_eq!(content.title, "Jane: just text");
        assert_eq!(content.body, "<span>just text</span>");
    }

    #[test]
    fn test_repost_marks_title() {
        let profile = MarkupProfile::twitter().compile().unwrap();
        let doc = Document::parse(
            r#"<article>
                 <a href="/jane"><span>Jane Doe Retweeted</span></a>
                 <div lang="en">original words</div>
               </article>"#,
        );
        let post = first_post(&doc, &profile);
        let kind = PostKind::classify(post, &profile);
        assert_eq!(kind.tag(), PostKindTag::Repost);

        let content = kind.assemble(post, "Jane Doe", &profile);
        assert_eq!(content.title, "Jane Doe RT: original words");
        // body_from_post keeps the whole article
        assert!(content.body.contains("Retweeted"));
        assert!(content.body.contains("original words"));
    }

    #[test]
    fn test_is_noise() {
        let profile = MarkupProfile::facebook().compile().unwrap();
        let doc = Document::parse(
            r#"<div role="article" class="fbTimelineLikesStory">liked by others</div>
               <div role="article"><div class="pagesLikedByOthers"></div></div>
               <div role="article"><div class="userContent">real</div></div>"#,
        );
        let posts = doc.query_all(&profile.post);
        assert!(is_noise(posts[0], &profile));
        assert!(is_noise(posts[1], &profile));
        assert!(!is_noise(posts[2], &profile));
    }

    #[test]
    fn test_compose_title() {
        assert_eq!(compose_title("Jane", "", "ok"), "Jane: ok");
        assert_eq!(compose_title("Jane", " RT", "ok"), "Jane RT: ok");
        assert_eq!(compose_title("Jane", "", ""), "Jane");
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("hello wide world", 6), "hello…");
        assert_eq!(excerpt("日本語のテキスト", 3), "日本語…");
        assert_eq!(excerpt("unbounded", 0), "unbounded");
    }

    #[test]
    fn test_anchor_selector_is_plain_a() {
        let profile = MarkupProfile::generic().compile().unwrap();
        let doc = Document::parse("<p><a>x</a></p>");
        let p = doc.query(&Selector::parse("p").unwrap()).unwrap();
        assert!(p.query(&profile.anchor).is_some());
    }
}
