//! chromiumoxide adapter for `RenderEngine`

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::{Page, cdp};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::RenderEngine;
use crate::crawl_engine::page_timeout::with_page_timeout;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const EVALUATE_TIMEOUT: Duration = Duration::from_secs(10);

async fn evaluate_value<T: serde::de::DeserializeOwned>(page: &Page, expression: &str) -> Result<T> {
    with_page_timeout(
        async {
            page.evaluate(expression)
                .await
                .with_context(|| format!("Failed to evaluate `{expression}`"))?
                .into_value::<T>()
                .map_err(|e| anyhow::anyhow!("Unexpected result from `{expression}`: {e}"))
        },
        EVALUATE_TIMEOUT,
        "evaluate",
    )
    .await
}

/// A launched browser, its CDP handler task and the single page it drives.
///
/// Dropping the engine aborts the handler but does NOT close the browser
/// process; call `quit()` for that.
pub struct ChromiumEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    user_data_dir: Option<PathBuf>,
    page_load_timeout: Duration,
}

impl ChromiumEngine {
    /// Open a blank page on `browser` and pin its viewport.
    pub async fn open(
        browser: Browser,
        handler: JoinHandle<()>,
        user_data_dir: PathBuf,
        window_size: (u32, u32),
        page_load_timeout: Duration,
    ) -> Result<Self> {
        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser page")?;

        let (width, height) = window_size;
        page.execute(
            cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams::builder()
                .width(i64::from(width))
                .height(i64::from(height))
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(anyhow::Error::msg)?,
        )
        .await
        .context("Failed to set viewport")?;

        Ok(Self {
            browser,
            handler,
            page,
            user_data_dir: Some(user_data_dir),
            page_load_timeout,
        })
    }

    /// Remove the temporary profile. Must run after the process has exited.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to {url}");
        with_page_timeout(
            async {
                self.page
                    .goto(url)
                    .await
                    .with_context(|| format!("Failed to navigate to {url}"))?;
                Ok(())
            },
            self.page_load_timeout,
            "navigate",
        )
        .await
    }

    async fn wait_for_ready(&mut self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            let ready: bool = evaluate_value(&self.page, "document.body !== null")
                .await
                .unwrap_or(false);
            if ready {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(anyhow::anyhow!(
                    "document body not present after {:.1}s",
                    timeout.as_secs_f32()
                ));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn document_height(&mut self) -> Result<u64> {
        let height: f64 = evaluate_value(&self.page, "document.body.scrollHeight").await?;
        Ok(height.max(0.0) as u64)
    }

    async fn scroll_to(&mut self, y: u64) -> Result<()> {
        let _: serde_json::Value =
            evaluate_value(&self.page, &format!("window.scrollTo(0, {y}); true")).await?;
        Ok(())
    }

    async fn page_markup(&mut self) -> Result<String> {
        with_page_timeout(
            async {
                self.page
                    .content()
                    .await
                    .context("Failed to read page content")
            },
            EVALUATE_TIMEOUT,
            "page content",
        )
        .await
    }

    async fn install_script(&mut self, source: &str) -> Result<()> {
        self.page
            .execute(
                cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams {
                    source: source.to_string(),
                    include_command_line_api: None,
                    world_name: None,
                    run_immediately: None,
                },
            )
            .await
            .context("Failed to register init script")?;
        Ok(())
    }

    async fn is_alive(&mut self) -> bool {
        match self.browser.version().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Browser health check failed: {e}");
                false
            }
        }
    }

    async fn quit(&mut self) -> Result<()> {
        info!("Closing browser");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
        }
        self.handler.abort();
        self.cleanup_temp_dir();
        Ok(())
    }
}

impl Drop for ChromiumEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
