use url::Url;

use crate::extract::profile::LinkShim;

/// Resolve an `href` found in a post to an absolute URL.
///
/// Root-relative paths are appended to `base_url` as-is; other relative
/// paths are joined against it.
pub fn resolve_href(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }

    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok()?;
    if href.starts_with("//") {
        return Url::parse(&format!("{}:{}", base.scheme(), href))
            .ok()
            .map(|u| u.to_string());
    }
    if href.starts_with('/') {
        return Some(format!("{}{}", base_url.trim_end_matches('/'), href));
    }

    base.join(href).ok().map(|u| u.to_string())
}

/// Replace a redirect-shim URL with the target it carries.
pub fn unshim(url: &str, shim: Option<&LinkShim>) -> String {
    let Some(shim) = shim else {
        return url.to_string();
    };
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let is_shim = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .is_some_and(|last| last == shim.path);
    if !is_shim {
        return url.to_string();
    }

    parsed
        .query_pairs()
        .find(|(key, _)| key == shim.param.as_str())
        .map(|(_, target)| target.into_owned())
        .filter(|target| Url::parse(target).is_ok())
        .unwrap_or_else(|| url.to_string())
}

pub fn resolve_link(href: &str, base_url: &str, shim: Option<&LinkShim>) -> Option<String> {
    resolve_href(href, base_url).map(|url| unshim(&url, shim))
}
