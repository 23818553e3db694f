//! Image download and inline-data decoding
//!
//! HTTP downloads stream the body with a size limit enforced both from
//! `Content-Length` and while reading. Inline `data:` images are decoded
//! locally and always saved as PNG.

use anyhow::{Context, Result};
use base64::Engine;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

use super::types::FetchedImage;
use crate::utils::url_path_extension;

/// Timeouts and size limits for image downloads
#[derive(Debug, Clone)]
pub struct ImageDownloadConfig {
    pub timeout: Duration,
    /// Maximum size for a single image (bytes)
    pub max_size: usize,
}

impl Default for ImageDownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_size: crate::utils::DEFAULT_MAX_IMAGE_SIZE,
        }
    }
}

/// Extensions a URL path may contribute when the content type is unhelpful
const URL_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Pick a file extension from the response content type, then the URL path.
///
/// Only common image extensions are taken from the URL; anything else
/// falls back to `.jpg`.
#[must_use]
pub fn extension_for(content_type: Option<&str>, url: &str) -> String {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

    let from_type = if content_type.contains("jpeg") || content_type.contains("jpg") {
        Some(".jpg")
    } else if content_type.contains("png") {
        Some(".png")
    } else if content_type.contains("gif") {
        Some(".gif")
    } else if content_type.contains("webp") {
        Some(".webp")
    } else {
        None
    };

    from_type
        .map(str::to_string)
        .or_else(|| {
            url_path_extension(url).filter(|ext| URL_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        })
        .unwrap_or_else(|| ".jpg".to_string())
}

/// Decode the payload of a base64 `data:` URL.
///
/// The declared media type is ignored; callers save the bytes as `.png`.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Malformed data URL: missing ',' separator"))?;

    if !header.ends_with(";base64") {
        return Err(anyhow::anyhow!(
            "Unsupported inline image encoding: {header}"
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("Invalid base64 in data URL")
}

/// Download an image over HTTP with timeout and size limit.
pub async fn download_image(
    client: &Client,
    url: &str,
    config: &ImageDownloadConfig,
) -> Result<FetchedImage> {
    let response = client
        .get(url)
        .timeout(config.timeout)
        .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
        .send()
        .await
        .context("Failed to download image")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Image download failed with status: {}",
            response.status()
        ));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Enforce limit BEFORE downloading
    let expected_size = response.content_length().unwrap_or(0);
    if expected_size > config.max_size as u64 {
        return Err(anyhow::anyhow!(
            "Image too large: {} bytes exceeds limit of {} bytes",
            expected_size,
            config.max_size
        ));
    }

    let mut buffer = if expected_size > 0 {
        Vec::with_capacity(expected_size as usize)
    } else {
        Vec::new()
    };

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.context("Failed to read image chunk")?;

        let new_total = buffer.len() + chunk.len();
        if new_total > config.max_size {
            return Err(anyhow::anyhow!(
                "Image download exceeded size limit during download: {} bytes (max: {})",
                new_total,
                config.max_size
            ));
        }
        buffer.extend_from_slice(&chunk);
    }

    if buffer.is_empty() {
        return Err(anyhow::anyhow!("Image response body was empty"));
    }

    Ok(FetchedImage {
        bytes: buffer,
        extension: extension_for(content_type.as_deref(), url),
    })
}
