//! URL normalization helpers for image sources

/// Returns true for inline `data:` URLs.
#[inline]
#[must_use]
pub fn is_data_url(url: &str) -> bool {
    url.starts_with("data:")
}

/// Check that a string parses as an absolute http(s) URL.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Normalize an image URL to absolute form.
///
/// Protocol-relative URLs (`//host/x.png`) get `https:` and host-relative
/// URLs (`/x.png`) are joined onto `base_host`. Anything else, including
/// `data:` URLs, is returned as-is.
///
/// # Examples
/// ```
/// # use kodegen_tools_articlescrape::utils::url_utils::normalize_image_url;
/// let base = "https://mp.weixin.qq.com";
/// assert_eq!(normalize_image_url("//cdn.example.com/a.png", base), "https://cdn.example.com/a.png");
/// assert_eq!(normalize_image_url("/mmbiz/a.png", base), "https://mp.weixin.qq.com/mmbiz/a.png");
/// ```
#[must_use]
pub fn normalize_image_url(raw: &str, base_host: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("//") {
        format!("https:{raw}")
    } else if raw.starts_with('/') {
        format!("{}{raw}", base_host.trim_end_matches('/'))
    } else {
        raw.to_string()
    }
}

/// Extension of the last path segment of a URL, lower-cased and dot-prefixed.
///
/// Query strings and fragments are ignored. Returns `None` for URLs whose
/// path has no extension or one that is implausibly long.
#[must_use]
pub fn url_path_extension(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let segment = parsed.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}
