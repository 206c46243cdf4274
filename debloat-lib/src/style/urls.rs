//! Relative `url()` rewriting, so a stylesheet keeps working once its content
//! is served from somewhere other than its original location.

/// Directory part of a stylesheet URL, including the trailing slash.
///
/// `http://example.com/theme/style.css?ver=3` gives `http://example.com/theme/`.
pub fn base_path(sheet_url: &str) -> &str {
    let without_query = sheet_url
        .split_once(['?', '#'])
        .map_or(sheet_url, |(head, _)| head);
    match without_query.rfind('/') {
        Some(slash) => &without_query[..=slash],
        None => "",
    }
}

/// Whether `url` is relative to the stylesheet and must be prefixed with its base.
pub fn is_relative(url: &str) -> bool {
    let url = url.trim();
    if has_scheme(url) || url.starts_with("//") {
        return false;
    }
    let path = url.split_once(['?', '#']).map_or(url, |(head, _)| head);
    !path.is_empty() && !path.starts_with('/')
}

/// The rewritten URL, or `None` when it must stay as written.
pub fn rewrite(base: &str, url: &str) -> Option<String> {
    if base.is_empty() || !is_relative(url) {
        return None;
    }
    Some(format!("{}{}", base, url.trim()))
}

/// `http:`, `https:`, `data:` and any other `scheme:` prefix.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
