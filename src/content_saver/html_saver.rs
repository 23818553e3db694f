use std::path::Path;

use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};
use crate::page_extractor::ArticleRecord;

const STYLESHEET: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "PingFang SC", "Microsoft YaHei", sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            line-height: 1.6;
            color: #333;
        }
        .header {
            border-bottom: 2px solid #eee;
            padding-bottom: 20px;
            margin-bottom: 30px;
        }
        .title {
            font-size: 24px;
            font-weight: bold;
            margin-bottom: 10px;
        }
        .meta {
            color: #666;
            font-size: 14px;
        }
        .content {
            font-size: 16px;
        }
        .content img {
            max-width: 100%;
            height: auto;
            display: block;
            margin: 20px auto;
            border-radius: 4px;
        }
        .image-placeholder {
            border: 2px dashed #ccc;
            padding: 20px;
            text-align: center;
            color: #999;
            margin: 20px 0;
            background: #f9f9f9;
        }
"#;

/// Render the self-contained HTML page around the (already rewritten) body.
#[must_use]
pub fn render_html(record: &ArticleRecord) -> String {
    let title = html_escape::encode_text(&record.title);
    let author = html_escape::encode_text(&record.author);
    let publish_time = html_escape::encode_text(&record.publish_time);

    let source = record
        .source_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<p>Source: <a href="{}">{}</a></p>"#,
                html_escape::encode_double_quoted_attribute(url),
                html_escape::encode_text(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLESHEET}    </style>
</head>
<body>
    <div class="header">
        <h1 class="title">{title}</h1>
        <div class="meta">
            <p>Author: {author}</p>
            <p>Published: {publish_time}</p>
            <p>Word count: {word_count}</p>
            {source}
        </div>
    </div>
    <div class="content">
        {body}
    </div>
</body>
</html>
"#,
        word_count = record.word_count,
        body = record.body_html,
    )
}

pub async fn save_html(record: &ArticleRecord, path: &Path) -> ScrapeResult<()> {
    tokio::fs::write(path, render_html(record))
        .await
        .map_err(|e| ScrapeError::persistence(path, e))?;
    log::debug!("Saved article HTML to {}", path.display());
    Ok(())
}
