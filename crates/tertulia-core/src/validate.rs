//! URL validation for user-supplied page addresses.
//!
//! A URL is accepted only when it parses as an absolute URL with both a
//! non-empty scheme and a non-empty host. Relative paths, bare hostnames
//! such as `www.example.com`, opaque URLs like `mailto:a@b.c`, and
//! special-scheme URLs missing the `//` authority (`https:example.com`) are
//! rejected.

use thiserror::Error;
use url::Url;

/// The rejected input, carried verbatim for error messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid URL provided: {0}")]
pub struct InvalidUrl(pub String);

/// Parse `input` as an absolute URL with a scheme and a host.
pub fn parse_web_url(input: &str) -> Result<Url, InvalidUrl> {
    if !has_authority(input) {
        return Err(InvalidUrl(input.to_string()));
    }
    let url = Url::parse(input).map_err(|_| InvalidUrl(input.to_string()))?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    if url.scheme().is_empty() || !has_host {
        return Err(InvalidUrl(input.to_string()));
    }
    Ok(url)
}

/// `scheme://authority...` with a non-empty authority, as written.
///
/// The WHATWG parser repairs `https:example.com` and `https:///example.com`
/// into URLs with a host, so the raw text is checked first.
fn has_authority(input: &str) -> bool {
    let Some((_, rest)) = input.trim().split_once(':') else {
        return false;
    };
    let Some(rest) = rest.strip_prefix("//") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    !authority.is_empty()
}

/// Returns `true` only if `input` has both a scheme and a host.
pub fn is_valid_url(input: &str) -> bool {
    parse_web_url(input).is_ok()
}
