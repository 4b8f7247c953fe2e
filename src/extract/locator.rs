use scraper::ElementRef;

use crate::app::{Result, RunnelError};
use crate::domain::PageContext;
use crate::extract::dom::{Document, ElementExt};
use crate::extract::profile::CompiledProfile;

/// Timeline posts in document order, without nested look-alikes.
pub fn locate<'a>(doc: &'a Document, profile: &CompiledProfile) -> Result<Vec<ElementRef<'a>>> {
    let posts: Vec<_> = doc
        .query_all(&profile.post)
        .into_iter()
        .filter(|post| !profile.exclude.iter().any(|s| s.matches(post)))
        .collect();

    if posts.is_empty() {
        return Err(RunnelError::StructuralMismatch(
            "no timeline posts matched the post selector".to_string(),
        ));
    }
    Ok(posts)
}

/// The page owner's display name.
pub fn page_name(doc: &Document, profile: &CompiledProfile, document_title: &str) -> Result<String> {
    let name = match &profile.name {
        Some(selector) => doc
            .query(selector)
            .map(|el| el.inner_text())
            .ok_or_else(|| {
                RunnelError::StructuralMismatch("page name element not found".to_string())
            })?,
        None => PageContext::display_name(document_title),
    };

    if name.is_empty() {
        return Err(RunnelError::StructuralMismatch(
            "page name is empty".to_string(),
        ));
    }
    Ok(name)
}

pub fn page_description(doc: &Document, profile: &CompiledProfile) -> String {
    profile
        .description
        .as_ref()
        .and_then(|selector| doc.query(selector))
        .map(|el| el.inner_text())
        .unwrap_or_default()
}
