//! Upstream URL composition.
//!
//! The path is joined to the base with exactly one leading `/`, and the
//! raw query string is appended byte-for-byte. Nothing is decoded or
//! re-encoded here.

use std::borrow::Cow;

/// Prefix `/` when missing. The empty path becomes `/`.
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

/// `base + normalized path`, then `?query` (or `&query` when the URL
/// already carries a `?`) if `query` is non-empty.
#[must_use]
pub fn build_target_url(base: &str, path: &str, query: &str) -> String {
    let path = normalize_path(path);
    let mut url = String::with_capacity(base.len() + path.len() + query.len() + 1);
    url.push_str(base);
    url.push_str(&path);

    if !query.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(query);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://weao.xyz";

    #[test]
    fn adds_missing_leading_slash() {
        assert_eq!(
            build_target_url(BASE, "api/status", ""),
            "https://weao.xyz/api/status"
        );
    }

    #[test]
    fn keeps_existing_leading_slash() {
        assert_eq!(
            build_target_url(BASE, "/api/status", ""),
            "https://weao.xyz/api/status"
        );
    }

    #[test]
    fn empty_path_is_root() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(build_target_url(BASE, "", ""), "https://weao.xyz/");
    }

    #[test]
    fn appends_query_with_question_mark() {
        assert_eq!(
            build_target_url(BASE, "search", "q=1&page=2"),
            "https://weao.xyz/search?q=1&page=2"
        );
    }

    #[test]
    fn joins_with_ampersand_when_base_has_query() {
        assert_eq!(
            build_target_url("http://upstream/api?token=t", "items", "limit=5"),
            "http://upstream/api?token=t/items&limit=5"
        );
    }

    #[test]
    fn query_is_not_reencoded() {
        let query = "q=a%20b&tag=%2F%3F&raw=x+y&empty=";
        assert_eq!(
            build_target_url(BASE, "find", query),
            format!("{BASE}/find?{query}")
        );
    }

    #[test]
    fn percent_encoded_path_is_kept() {
        assert_eq!(
            build_target_url(BASE, "files/a%2Fb", ""),
            "https://weao.xyz/files/a%2Fb"
        );
    }
}
