//! Raw `Set-Cookie` rewriting utilities
use std::borrow::Cow;

use actix_web::http::header::{self, HeaderMap, HeaderValue};
use once_cell::sync::Lazy;
use regex::Regex;

/// `; Expires=...` and `; Max-Age=...` attributes, up to the next `;`
static PERSISTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i);\s*(?:expires|max-age)\s*=[^;]*").expect("invalid persistence regex")
});

/// `Expires` set to the epoch, the usual cookie deletion sentinel
static DELETION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i);\s*expires\s*=\s*thu,\s*01\s+jan\s+1970").expect("invalid deletion regex")
});

/// Name of a serialized cookie, the text before the first `=` of its
/// `name=value` pair.
///
/// Returns `None` when the pair carries no `=`.
pub fn cookie_name(cookie: &str) -> Option<&str> {
    let pair = cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').map(|(name, _)| name)
}

/// Check if the cookie is a deletion cookie expiring at the epoch.
#[inline]
pub fn is_deletion(cookie: &str) -> bool {
    DELETION.is_match(cookie)
}

/// Strip persistence attributes from a cookie whose name matches any
/// of `patterns`.
///
/// Malformed cookies, non-matching cookies and deletion cookies are
/// returned unchanged.
///
/// # Example
///
/// ```
/// use actix_transient::rewrite_cookie;
/// use regex::Regex;
///
/// let patterns = [Regex::new(r"\.sig$").unwrap()];
/// let cookie = "app.sig=xyz; Path=/; Expires=Wed, 01 Jan 2025 00:00:00 GMT; Max-Age=3600";
/// assert_eq!(rewrite_cookie(cookie, &patterns), "app.sig=xyz; Path=/");
/// ```
pub fn rewrite_cookie<'a>(cookie: &'a str, patterns: &[Regex]) -> Cow<'a, str> {
    let Some(name) = cookie_name(cookie) else {
        return Cow::Borrowed(cookie);
    };
    if !patterns.iter().any(|pattern| pattern.is_match(name)) || is_deletion(cookie) {
        return Cow::Borrowed(cookie);
    }
    let rewritten = PERSISTENCE.replace_all(cookie, "");
    if let Cow::Owned(_) = rewritten {
        tracing::debug!(name, "cookie made transient");
    }
    rewritten
}

/// Rewrite every `Set-Cookie` header, keeping their order.
pub(crate) fn rewrite_headers(headers: &mut HeaderMap, patterns: &[Regex]) {
    let cookies: Vec<HeaderValue> = headers.get_all(header::SET_COOKIE).cloned().collect();
    if cookies.is_empty() {
        return;
    }

    headers.remove(header::SET_COOKIE);
    for value in cookies {
        // non utf-8 values are left as-is
        let rewritten = value.to_str().ok().and_then(|cookie| {
            match rewrite_cookie(cookie, patterns) {
                Cow::Owned(cookie) => HeaderValue::from_str(&cookie).ok(),
                Cow::Borrowed(_) => None,
            }
        });
        headers.append(header::SET_COOKIE, rewritten.unwrap_or(value));
    }
}
