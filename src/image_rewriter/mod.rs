//! Image rewriting for saved article HTML
//!
//! Downloaded images are pointed at `images/<file>`; everything else becomes
//! a visible placeholder, so the saved page never loads a remote image.
//! Rewriting already-rewritten markup is a no-op.

use anyhow::{Context, Result};
use lol_html::html_content::ContentType;
use lol_html::{HtmlRewriter, Settings, element};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::page_extractor::ImageRef;
use crate::utils::IMAGES_DIR_NAME;

/// Relative path a downloaded image is served from
#[must_use]
pub fn local_image_path(file_name: &str) -> String {
    format!("{IMAGES_DIR_NAME}/{file_name}")
}

/// Placeholder block that replaces an image that was not downloaded
#[must_use]
pub fn placeholder_html(alt_text: &str) -> String {
    let label = if alt_text.trim().is_empty() {
        "unknown image"
    } else {
        alt_text.trim()
    };
    format!(
        r#"<div class="image-placeholder">Image failed to load: {}</div>"#,
        html_escape::encode_text(label)
    )
}

/// Find the ref for the `ordinal`-th image element.
///
/// The ref at the same position wins when its sources match; otherwise the
/// first downloaded match, then any match.
fn find_image<'a>(
    images: &'a [ImageRef],
    ordinal: usize,
    src: Option<&str>,
    lazy_src: Option<&str>,
) -> Option<&'a ImageRef> {
    let matches = |image: &ImageRef| {
        src.is_some_and(|s| image.matches_source(s))
            || lazy_src.is_some_and(|s| image.matches_source(s))
    };

    images
        .iter()
        .find(|image| image.position == ordinal && matches(image))
        .or_else(|| images.iter().find(|image| image.downloaded && matches(image)))
        .or_else(|| images.iter().find(|image| matches(image)))
}

/// True when `src` already points at one of our downloaded files.
fn is_already_local(images: &[ImageRef], src: &str) -> bool {
    images.iter().any(|image| {
        image.downloaded
            && image
                .local_file_name
                .as_deref()
                .is_some_and(|name| src == local_image_path(name))
    })
}

/// lol_html hands back raw attribute text; stored refs hold decoded URLs.
fn decoded_attribute(raw: Option<String>) -> Option<String> {
    raw.map(|value| html_escape::decode_html_entities(&value).into_owned())
}

/// Rewrite every `<img>` in `body_html` against the fetched `images`.
///
/// # Errors
///
/// Returns an error if lol_html cannot parse or re-serialize the markup.
pub fn rewrite_images(body_html: &str, images: &[ImageRef]) -> Result<String> {
    if body_html.is_empty() {
        return Ok(String::new());
    }

    let ordinal = AtomicUsize::new(0);
    let mut output = Vec::with_capacity(body_html.len());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("img", |el| {
                let position = ordinal.fetch_add(1, Ordering::Relaxed) + 1;
                let src = decoded_attribute(el.get_attribute("src"));
                let lazy_src = decoded_attribute(el.get_attribute("data-src"));

                if src.as_deref().is_some_and(|s| is_already_local(images, s)) {
                    return Ok(());
                }

                let matched = find_image(images, position, src.as_deref(), lazy_src.as_deref());

                match matched {
                    Some(image) if image.downloaded => {
                        let Some(file_name) = image.local_file_name.as_deref() else {
                            el.replace(&placeholder_html(&image.alt_text), ContentType::Html);
                            return Ok(());
                        };
                        el.set_attribute("src", &local_image_path(file_name))?;
                        el.remove_attribute("data-src");

                        let has_alt = el
                            .get_attribute("alt")
                            .is_some_and(|alt| !alt.trim().is_empty());
                        if !has_alt {
                            el.set_attribute("alt", &format!("image {}", image.position))?;
                        }
                    }
                    _ => {
                        let alt = el
                            .get_attribute("alt")
                            .filter(|alt| !alt.trim().is_empty())
                            .or_else(|| matched.map(|image| image.alt_text.clone()))
                            .unwrap_or_default();
                        el.replace(&placeholder_html(&alt), ContentType::Html);
                    }
                }

                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(body_html.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to rewrite image HTML: {e}"))?;
    rewriter
        .end()
        .map_err(|e| anyhow::anyhow!("Failed to finalize image HTML: {e}"))?;

    String::from_utf8(output).context("Rewritten HTML is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloaded(position: usize, url: &str, file: &str) -> ImageRef {
        let mut image = ImageRef::new(position, Some(url.to_string()), None, Some(url.to_string()));
        image.mark_downloaded(file);
        image
    }

    fn failed(position: usize, url: &str) -> ImageRef {
        let mut image = ImageRef::new(position, None, Some(url.to_string()), Some(url.to_string()));
        image.mark_failed("HTTP 404");
        image
    }

    #[test]
    fn downloaded_image_points_at_local_file() -> Result<()> {
        let html = r#"<div><img data-src="https://cdn.test/a.jpg" src="data:image/gif;base64,AA"></div>"#;
        let images = vec![downloaded(1, "https://cdn.test/a.jpg", "img_1_100.jpg")];

        let out = rewrite_images(html, &images)?;

        assert!(out.contains(r#"src="images/img_1_100.jpg""#));
        assert!(!out.contains("data-src"));
        assert!(out.contains(r#"alt="image 1""#));
        Ok(())
    }

    #[test]
    fn existing_alt_is_kept() -> Result<()> {
        let html = r#"<img src="https://cdn.test/a.jpg" alt="chart">"#;
        let images = vec![downloaded(1, "https://cdn.test/a.jpg", "img_1_1.jpg")];

        let out = rewrite_images(html, &images)?;
        assert!(out.contains(r#"alt="chart""#));
        Ok(())
    }

    #[test]
    fn failed_image_becomes_placeholder_without_remote_url() -> Result<()> {
        let html = r#"<p>before</p><img src="https://cdn.test/broken.png" alt="a <b> chart"><p>after</p>"#;
        let images = vec![failed(1, "https://cdn.test/broken.png")];

        let out = rewrite_images(html, &images)?;

        assert!(out.contains(r#"<div class="image-placeholder">Image failed to load: a &lt;b&gt; chart</div>"#));
        assert!(!out.contains("cdn.test/broken.png"));
        assert!(!out.contains("<img"));
        Ok(())
    }

    #[test]
    fn unmatched_image_becomes_placeholder() -> Result<()> {
        let out = rewrite_images(r#"<img src="https://elsewhere.test/x.png">"#, &[])?;
        assert!(out.contains("Image failed to load: unknown image"));
        assert!(!out.contains("elsewhere.test"));
        Ok(())
    }

    #[test]
    fn rewriting_twice_is_a_noop() -> Result<()> {
        let html = r#"<div><img data-src="https://cdn.test/a.jpg"><img src="https://cdn.test/b.jpg" alt="b"></div>"#;
        let images = vec![
            downloaded(1, "https://cdn.test/a.jpg", "img_1_5.jpg"),
            failed(2, "https://cdn.test/b.jpg"),
        ];

        let once = rewrite_images(html, &images)?;
        let twice = rewrite_images(&once, &images)?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn duplicate_urls_map_by_position() -> Result<()> {
        let html = r#"<img src="https://cdn.test/same.png"><img src="https://cdn.test/same.png">"#;
        let images = vec![
            downloaded(1, "https://cdn.test/same.png", "img_1_1.png"),
            downloaded(2, "https://cdn.test/same.png", "img_2_1.png"),
        ];

        let out = rewrite_images(html, &images)?;
        assert!(out.contains("images/img_1_1.png"));
        assert!(out.contains("images/img_2_1.png"));
        Ok(())
    }

    #[test]
    fn entity_encoded_query_matches_extracted_url() -> Result<()> {
        let html = r#"<div id="js_content"><p>x</p><img data-src="https://mmbiz.qpic.cn/a/640?wx_fmt=png&amp;from=appmsg" alt="pic"></div>"#;
        let mut record = crate::page_extractor::extract_article(html);
        assert_eq!(
            record.images[0].url.as_deref(),
            Some("https://mmbiz.qpic.cn/a/640?wx_fmt=png&from=appmsg")
        );
        record.images[0].mark_downloaded("img_1_1.png");

        let out = rewrite_images(&record.body_html, &record.images)?;

        assert!(out.contains(r#"src="images/img_1_1.png""#), "got: {out}");
        assert!(!out.contains("image-placeholder"));
        assert!(!out.contains("mmbiz.qpic.cn"));
        assert_eq!(rewrite_images(&out, &record.images)?, out);
        Ok(())
    }

    #[test]
    fn empty_body_stays_empty() -> Result<()> {
        assert_eq!(rewrite_images("", &[])?, "");
        Ok(())
    }
}
