use crate::url::is_valid_url;
use url::Url;

/// Resolves a link href against the page it was found on
///
/// Returns `None` when the href cannot be joined onto the base or when the
/// joined result is not an absolute URL with a host. Special schemes such as
/// `javascript:` and `mailto:` fall out here because they carry no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use url_evaluator::url::resolve_link;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// assert_eq!(
///     resolve_link("guide.html", &base),
///     Some("https://example.com/docs/guide.html".to_string())
/// );
/// assert_eq!(resolve_link("mailto:a@example.com", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let joined = base_url.join(href.trim()).ok()?;
    let absolute = joined.to_string();

    if is_valid_url(&absolute) {
        Some(absolute)
    } else {
        None
    }
}
