//! Source URL validation against the allow-list of supported video hosts

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Hosts accepted as clip sources. Exact-match only: subdomain variants that
/// the platforms actually serve links from are listed explicitly.
const ALLOWED_DOMAINS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "m.youtube.com",
    "tiktok.com",
    "www.tiktok.com",
    "vm.tiktok.com",
    "instagram.com",
    "www.instagram.com",
    "facebook.com",
    "www.facebook.com",
    "m.facebook.com",
    "fb.watch",
];

/// URL validation errors
#[derive(Debug, Error)]
pub enum UrlError {
    /// Input was null, empty, or whitespace-only
    #[error("URL is required")]
    Missing,

    /// Input could not be parsed as a URL
    #[error("Malformed URL: {0}")]
    Malformed(String),

    /// Host is not on the allow-list
    #[error("Host not allowed: {0}")]
    DisallowedHost(String),
}

/// A source URL that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> &str {
        // Guaranteed present: validate() rejects host-less URLs
        self.0.host_str().unwrap_or_default()
    }
}

/// Validate a raw URL string against the allow-list.
///
/// Normalizes scheme-less input by prefixing `https://`. Host comparison is
/// case-insensitive (the `url` crate lowercases hosts during parsing).
pub fn validate(raw: &str) -> Result<ValidatedUrl, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Missing);
    }

    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&normalized).map_err(|e| {
        warn!(url = %trimmed, "Rejected malformed URL: {e}");
        UrlError::Malformed(trimmed.to_string())
    })?;

    let host = match parsed.host_str() {
        Some(h) => h.to_ascii_lowercase(),
        None => {
            warn!(url = %trimmed, "Rejected URL without host");
            return Err(UrlError::Malformed(trimmed.to_string()));
        }
    };

    if !ALLOWED_DOMAINS.contains(&host.as_str()) {
        warn!(host = %host, "Rejected URL from disallowed host");
        return Err(UrlError::DisallowedHost(host));
    }

    Ok(ValidatedUrl(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_allow_listed_hosts() {
        for domain in ALLOWED_DOMAINS {
            let url = format!("https://{domain}/some/video");
            assert!(validate(&url).is_ok(), "expected {domain} to be accepted");
        }
    }

    #[test]
    fn accepts_tiktok_video_link() {
        let v = validate("https://www.tiktok.com/@x/video/123").unwrap();
        assert_eq!(v.host(), "www.tiktok.com");
    }

    #[test]
    fn host_comparison_is_case_insensitive() {
        let v = validate("https://TIKTOK.com/@x/video/123").unwrap();
        assert_eq!(v.host(), "tiktok.com");
    }

    #[test]
    fn prefixes_https_when_scheme_missing() {
        let v = validate("youtu.be/dQw4w9WgXcQ").unwrap();
        assert!(v.as_str().starts_with("https://"));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(matches!(validate(""), Err(UrlError::Missing)));
        assert!(matches!(validate("   "), Err(UrlError::Missing)));
    }

    #[test]
    fn rejects_unlisted_hosts() {
        for url in [
            "https://example.com/video",
            "https://vimeo.com/12345",
            "http://soundcloud.com/track",
            // Subdomains not on the explicit list are rejected, no wildcards
            "https://music.youtube.com/watch?v=abc",
        ] {
            assert!(
                matches!(validate(url), Err(UrlError::DisallowedHost(_))),
                "expected {url} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(validate("ht tp://???").is_err());
    }
}
