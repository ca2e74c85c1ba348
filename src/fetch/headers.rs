//! Default request headers for catalog sessions.
//!
//! The catalog serves its pages to browsers, so the session presents itself
//! like one. Caller overrides are merged over these once, when the session is
//! built, and apply to every request that session issues.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::FetchError;

/// Browser User-Agent sent by default.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default header set, in the order it is applied.
///
/// `Accept-Encoding` only advertises gzip because that is the only encoding
/// the session decodes.
pub const DEFAULT_HEADERS: [(&str, &str); 7] = [
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("accept-encoding", "gzip"),
    ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"),
    ("cache-control", "no-cache"),
    ("connection", "keep-alive"),
    ("pragma", "no-cache"),
    ("user-agent", BROWSER_USER_AGENT),
];

/// Builds the session header map: defaults first, then `overrides`.
///
/// Header names are case-insensitive, so an override named `User-Agent`
/// replaces the default `user-agent`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidHeader`] when an override name or value is
/// not valid HTTP.
pub fn build_header_map(overrides: &BTreeMap<String, String>) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::with_capacity(DEFAULT_HEADERS.len() + overrides.len());
    for (name, value) in DEFAULT_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    for (name, value) in overrides {
        let header_name =
            HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
