use crate::UrlError;
use url::Url;

/// Returns true if `candidate` is an absolute URL with both a scheme and a host
///
/// This is a pure check with no I/O. Any scheme is accepted as long as the
/// URL names a host, so `ftp://example.com` passes while `mailto:` and
/// `javascript:` URLs do not.
///
/// # Examples
///
/// ```
/// use url_evaluator::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/page"));
/// assert!(!is_valid_url("not-a-url"));
/// assert!(!is_valid_url("mailto:someone@example.com"));
/// ```
pub fn is_valid_url(candidate: &str) -> bool {
    validate_seed_url(candidate).is_ok()
}

/// Parses a URL and checks that it is absolute with a non-empty host
///
/// A successful parse always yields a scheme, so the host is the only part
/// left to check.
///
/// The crawl controller calls this on its seed before any I/O happens.
///
/// # Arguments
///
/// * `candidate` - The URL string to validate
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The string is not an absolute URL with scheme and host
pub fn validate_seed_url(candidate: &str) -> Result<Url, UrlError> {
    let url = Url::parse(candidate.trim()).map_err(|e| UrlError::Parse {
        url: candidate.to_string(),
        reason: e.to_string(),
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost(candidate.to_string())),
    }
}
