//! Test utilities shared by the articlescrape integration tests
//!
//! `FakeEngine` stands in for Chromium: heights, markup and failures are
//! scripted, and every call is recorded in a shared `EngineLog`.

use anyhow::{Result, bail};
use async_trait::async_trait;
use kodegen_tools_articlescrape::engine::{EngineLauncher, RenderEngine};
use kodegen_tools_articlescrape::{ScrapeConfig, ScrapeError, ScrapeResult};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How `document_height` answers
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Heights {
    /// Pop values in order, repeating the last one
    Scripted(Vec<u64>),
    /// Grow by 500 on every read, forever
    Growing,
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub navigations: Vec<String>,
    pub scrolls: Vec<u64>,
    pub scripts: usize,
    pub quits: usize,
}

#[derive(Debug, Clone)]
pub struct FakeScript {
    pub markup: String,
    pub heights: Heights,
    /// Number of leading navigations that fail
    pub failing_navigations: usize,
    /// Navigation never completes
    pub hang: bool,
}

impl FakeScript {
    #[allow(dead_code)]
    pub fn page(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            heights: Heights::Scripted(vec![1000]),
            failing_navigations: 0,
            hang: false,
        }
    }
}

pub struct FakeEngine {
    script: FakeScript,
    heights: VecDeque<u64>,
    grown: u64,
    navigations: usize,
    log: Arc<Mutex<EngineLog>>,
    alive: Arc<AtomicBool>,
}

impl FakeEngine {
    #[allow(dead_code)]
    pub fn new(script: FakeScript, log: Arc<Mutex<EngineLog>>, alive: Arc<AtomicBool>) -> Self {
        let heights = match &script.heights {
            Heights::Scripted(values) => values.iter().copied().collect(),
            Heights::Growing => VecDeque::new(),
        };
        Self {
            script,
            heights,
            grown: 0,
            navigations: 0,
            log,
            alive,
        }
    }
}

#[async_trait]
impl RenderEngine for FakeEngine {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.navigations += 1;
        self.log.lock().unwrap().navigations.push(url.to_string());

        if self.script.hang {
            std::future::pending::<()>().await;
        }
        if self.navigations <= self.script.failing_navigations {
            bail!("net::ERR_CONNECTION_RESET on navigation {}", self.navigations);
        }
        Ok(())
    }

    async fn wait_for_ready(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn document_height(&mut self) -> Result<u64> {
        if matches!(self.script.heights, Heights::Growing) {
            self.grown += 500;
            return Ok(self.grown);
        }
        let height = if self.heights.len() > 1 {
            self.heights.pop_front()
        } else {
            self.heights.front().copied()
        };
        Ok(height.unwrap_or(0))
    }

    async fn scroll_to(&mut self, y: u64) -> Result<()> {
        self.log.lock().unwrap().scrolls.push(y);
        Ok(())
    }

    async fn page_markup(&mut self) -> Result<String> {
        Ok(self.script.markup.clone())
    }

    async fn install_script(&mut self, _source: &str) -> Result<()> {
        self.log.lock().unwrap().scripts += 1;
        Ok(())
    }

    async fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn quit(&mut self) -> Result<()> {
        self.log.lock().unwrap().quits += 1;
        Ok(())
    }
}

/// Launches a fresh `FakeEngine` from the same script every time.
pub struct FakeLauncher {
    pub script: FakeScript,
    pub log: Arc<Mutex<EngineLog>>,
    pub alive: Arc<AtomicBool>,
    pub launches: AtomicUsize,
    /// Image-loading flag passed to the most recent launch
    pub image_loading: AtomicBool,
    pub unavailable: bool,
}

impl FakeLauncher {
    #[allow(dead_code)]
    pub fn new(script: FakeScript) -> Self {
        Self {
            script,
            log: Arc::new(Mutex::new(EngineLog::default())),
            alive: Arc::new(AtomicBool::new(true)),
            launches: AtomicUsize::new(0),
            image_loading: AtomicBool::new(false),
            unavailable: false,
        }
    }

    #[allow(dead_code)]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(FakeScript::page(""))
        }
    }

    #[allow(dead_code)]
    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLauncher for FakeLauncher {
    async fn launch(&self, _headless: bool, images: bool) -> ScrapeResult<Box<dyn RenderEngine>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.image_loading.store(images, Ordering::SeqCst);
        if self.unavailable {
            return Err(ScrapeError::EngineUnavailable(
                "system browser: not found; managed download: offline; engine default: failed"
                    .to_string(),
            ));
        }
        self.alive.store(true, Ordering::SeqCst);
        Ok(Box::new(FakeEngine::new(
            self.script.clone(),
            self.log.clone(),
            self.alive.clone(),
        )))
    }
}

/// Config with millisecond waits so retries and scrolling stay fast.
#[allow(dead_code)]
pub fn fast_config(output_dir: &Path) -> ScrapeConfig {
    ScrapeConfig::builder()
        .output_dir(output_dir)
        .retry_backoff(Duration::from_millis(1))
        .settle_interval(Duration::from_millis(1))
        .top_settle_interval(Duration::from_millis(1))
        .image_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A minimal article document around `body`.
#[allow(dead_code)]
pub fn article_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"></head>
<body>
    <h1 id="activity-name">{}</h1>
    <span id="js_author_name">Test Author</span>
    <em id="publish_time">2025-01-15</em>
    <div id="js_content">{}</div>
</body>
</html>"#,
        html_escape::encode_text(title),
        body
    )
}
