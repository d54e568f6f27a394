//! `Link` header parsing (RFC 5988 style).
//!
//! Malformed entries are skipped, never reported.

use crate::types::Pagination;
use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// Extracts `next`, `prev` and `self` cursors from every `Link` header value.
/// Later matches for the same relation overwrite earlier ones.
pub fn parse_pagination(headers: &HeaderMap) -> Pagination {
    let mut pagination = Pagination::default();
    for value in headers.get_all(LINK) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for link in split_link_values(value) {
            apply_link(&mut pagination, link);
        }
    }
    pagination
}

fn apply_link(pagination: &mut Pagination, link: &str) {
    let mut segments = link.trim().split(';');
    let Some(target) = segments.next() else {
        return;
    };
    let target = target.trim();
    let Some(href) = target
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
    else {
        return;
    };
    let Ok(url) = Url::parse(href) else {
        return;
    };
    for param in segments {
        match param.trim() {
            r#"rel="next""# => pagination.next = Some(url.clone()),
            r#"rel="prev""# => pagination.prev = Some(url.clone()),
            r#"rel="self""# => pagination.self_ = Some(url.clone()),
            _ => {}
        }
    }
}

// Commas inside `<...>` belong to the URL; only the ones outside separate
// links. A comma followed by `<` always starts a new link, so an unclosed
// target cannot swallow the links after it.
fn split_link_values(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_target = false;
    let mut start = 0;
    for (i, ch) in value.char_indices() {
        match ch {
            '<' => in_target = true,
            '>' => in_target = false,
            ',' if !in_target || value[i + 1..].trim_start().starts_with('<') => {
                parts.push(&value[start..i]);
                start = i + 1;
                in_target = false;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for v in values {
            h.append(LINK, HeaderValue::from_str(v).unwrap());
        }
        h
    }

    fn s(u: &Option<Url>) -> Option<&str> {
        u.as_ref().map(Url::as_str)
    }

    #[test]
    fn next_and_prev_in_one_value() {
        let p = parse_pagination(&headers(&[
            r#"<https://x/a>; rel="next", <https://x/b>; rel="prev""#,
        ]));
        assert_eq!(s(&p.next), Some("https://x/a"));
        assert_eq!(s(&p.prev), Some("https://x/b"));
        assert_eq!(p.self_, None);
    }

    #[test]
    fn multiple_header_values() {
        let p = parse_pagination(&headers(&[
            r#"<https://acme.okta.com/api/v1/users?limit=2>; rel="self""#,
            r#"<https://acme.okta.com/api/v1/users?after=00u2&limit=2>; rel="next""#,
        ]));
        assert_eq!(
            s(&p.self_),
            Some("https://acme.okta.com/api/v1/users?limit=2")
        );
        assert_eq!(
            s(&p.next),
            Some("https://acme.okta.com/api/v1/users?after=00u2&limit=2")
        );
    }

    #[test]
    fn malformed_segment_is_skipped() {
        let p = parse_pagination(&headers(&[
            r#"https://x/bad; rel="next", <https://x/good>; rel="prev""#,
            r#"<https://x/also-bad; rel="self""#,
        ]));
        assert_eq!(p.next, None);
        assert_eq!(s(&p.prev), Some("https://x/good"));
        assert_eq!(p.self_, None);
    }

    #[test]
    fn unclosed_target_does_not_swallow_following_links() {
        let p = parse_pagination(&headers(&[
            r#"<https://x/bad; rel="prev", <https://x/good>; rel="next""#,
        ]));
        assert_eq!(p.prev, None);
        assert_eq!(s(&p.next), Some("https://x/good"));
    }

    #[test]
    fn last_match_wins() {
        let p = parse_pagination(&headers(&[
            r#"<https://x/1>; rel="next""#,
            r#"<https://x/2>; rel="next""#,
        ]));
        assert_eq!(s(&p.next), Some("https://x/2"));
    }

    #[test]
    fn relation_match_is_exact() {
        let p = parse_pagination(&headers(&[
            r#"<https://x/1>; rel="NEXT", <https://x/2>; rel=next, <https://x/3>"#,
        ]));
        assert_eq!(p, Pagination::default());
    }

    #[test]
    fn comma_inside_url_is_kept() {
        let p = parse_pagination(&headers(&[
            r#"<https://x/users?filter=a,b>; rel="next""#,
        ]));
        assert_eq!(s(&p.next), Some("https://x/users?filter=a,b"));
    }

    #[test]
    fn no_link_header() {
        assert_eq!(parse_pagination(&HeaderMap::new()), Pagination::default());
    }
}
