//! UTF-8-safe string helpers
//!
//! Titles are frequently CJK, so every truncation here counts characters,
//! never bytes.

use regex::Regex;
use std::sync::LazyLock;

use super::constants::MAX_BASE_NAME_CHARS;

static UNSAFE_NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s-]").expect("BUG: hardcoded regex pattern is invalid")
});

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("BUG: hardcoded regex pattern is invalid"));

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// # Examples
/// ```
/// # use kodegen_tools_articlescrape::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("微信公众号文章", 4), "微信公众");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Derive a filesystem-safe base name from an article title.
///
/// Punctuation is dropped, whitespace and dash runs collapse to a single `-`,
/// and the result is cut to 50 characters. Word characters are Unicode-aware,
/// so CJK titles survive intact.
///
/// Returns `"article"` when nothing usable is left.
///
/// # Examples
/// ```
/// # use kodegen_tools_articlescrape::utils::string_utils::title_to_base_name;
/// assert_eq!(title_to_base_name("Hello, World: part 2!"), "Hello-World-part-2");
/// assert_eq!(title_to_base_name("???"), "article");
/// ```
#[must_use]
pub fn title_to_base_name(title: &str) -> String {
    let stripped = UNSAFE_NAME_CHARS.replace_all(title, "");
    let collapsed = SEPARATOR_RUNS.replace_all(stripped.trim(), "-");
    let truncated = safe_truncate_chars(&collapsed, MAX_BASE_NAME_CHARS).trim_matches('-');

    if truncated.is_empty() {
        "article".to_string()
    } else {
        truncated.to_string()
    }
}

/// Sanitize a caller-supplied base name so it is a single valid path component.
#[must_use]
pub fn sanitize_base_name(name: &str) -> String {
    let cleaned = sanitize_filename::sanitize(name.trim());
    if cleaned.is_empty() {
        "article".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let title = "标".repeat(80);
        assert_eq!(safe_truncate_chars(&title, 50).chars().count(), 50);
    }

    #[test]
    fn base_name_keeps_cjk_and_collapses_separators() {
        assert_eq!(title_to_base_name("深度  解读 -- 新规"), "深度-解读-新规");
        assert_eq!(title_to_base_name("【重磅】发布！"), "重磅发布");
    }

    #[test]
    fn base_name_is_capped_at_fifty_chars() {
        let title = "a".repeat(120);
        assert_eq!(title_to_base_name(&title).len(), 50);
    }

    #[test]
    fn sanitized_custom_names_lose_path_separators() {
        let name = sanitize_base_name("../weekly/report");
        assert!(!name.contains('/'));
        assert_eq!(sanitize_base_name("   "), "article");
    }
}
