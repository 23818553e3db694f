//! Browser engine acquisition through ordered fallback tiers
//!
//! Tier order: a browser already installed on the host, then a managed
//! download, then whatever chromiumoxide can locate on its own. The first
//! tier that produces a working page wins; every failure is logged.

use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ChromiumEngine, EngineLauncher, RenderEngine};
use crate::browser_setup::{
    LaunchOptions, build_browser_config, download_managed_browser, find_browser_executable,
    launch_browser,
};
use crate::config::ScrapeConfig;
use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTier {
    /// Executable found via `CHROMIUM_PATH`, `PATH` or a known install location
    SystemBrowser,
    /// Chromium fetched into the user cache directory
    ManagedDownload,
    /// No explicit executable; chromiumoxide resolves one itself
    EngineDefault,
}

impl LaunchTier {
    pub const ORDER: [LaunchTier; 3] = [
        LaunchTier::SystemBrowser,
        LaunchTier::ManagedDownload,
        LaunchTier::EngineDefault,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SystemBrowser => "system browser",
            Self::ManagedDownload => "managed download",
            Self::EngineDefault => "engine default",
        }
    }
}

/// A fire-and-forget script registered on every new document.
#[derive(Debug, Clone, Copy)]
pub struct SetupAction {
    pub name: &'static str,
    pub script: &'static str,
}

/// Fingerprint overrides and prompt suppression applied after launch.
pub const SETUP_ACTIONS: &[SetupAction] = &[
    SetupAction {
        name: "webdriver flag",
        script: "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });",
    },
    SetupAction {
        name: "plugin list",
        script: "Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });",
    },
    SetupAction {
        name: "language list",
        script: "Object.defineProperty(navigator, 'languages', { get: () => ['zh-CN', 'zh', 'en'] });",
    },
    SetupAction {
        name: "notification prompts",
        script: r"
            if (window.Notification) {
                Object.defineProperty(Notification, 'permission', { get: () => 'denied' });
                Notification.requestPermission = () => Promise.resolve('denied');
            }
        ",
    },
    SetupAction {
        name: "geolocation prompts",
        script: r"
            if (navigator.geolocation) {
                const deny = (_ok, err) => err && err({ code: 1, message: 'User denied Geolocation' });
                navigator.geolocation.getCurrentPosition = deny;
                navigator.geolocation.watchPosition = (ok, err) => { deny(ok, err); return 0; };
            }
        ",
    },
];

/// Run every setup action, logging and swallowing failures.
///
/// Returns how many actions were applied.
pub async fn apply_setup_actions(engine: &mut dyn RenderEngine, actions: &[SetupAction]) -> usize {
    let mut applied = 0;
    for action in actions {
        match engine.install_script(action.script).await {
            Ok(()) => {
                debug!("Applied setup action: {}", action.name);
                applied += 1;
            }
            Err(e) => warn!("Setup action '{}' failed: {e:#}", action.name),
        }
    }
    debug!("Applied {applied}/{} setup actions", actions.len());
    applied
}

/// Try each tier in order until one launches.
pub(crate) async fn first_successful_tier<T, F, Fut>(
    tiers: &[LaunchTier],
    mut launch: F,
) -> ScrapeResult<T>
where
    F: FnMut(LaunchTier) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut failures = Vec::with_capacity(tiers.len());
    for &tier in tiers {
        match launch(tier).await {
            Ok(value) => {
                info!("Browser engine acquired via {}", tier.name());
                return Ok(value);
            }
            Err(e) => {
                warn!("Browser launch tier '{}' failed: {e:#}", tier.name());
                failures.push(format!("{}: {e:#}", tier.name()));
            }
        }
    }
    Err(ScrapeError::EngineUnavailable(failures.join("; ")))
}

/// Production launcher backed by chromiumoxide.
#[derive(Debug, Clone)]
pub struct EngineFactory {
    config: ScrapeConfig,
}

impl EngineFactory {
    #[must_use]
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }

    /// Acquire a ready engine with setup actions applied.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` if every tier fails.
    pub async fn acquire(
        &self,
        headless: bool,
        image_loading_enabled: bool,
    ) -> ScrapeResult<Box<dyn RenderEngine>> {
        let mut engine = first_successful_tier(&LaunchTier::ORDER, |tier| {
            self.launch_tier(tier, self.launch_options(headless, image_loading_enabled))
        })
        .await?;

        apply_setup_actions(engine.as_mut(), SETUP_ACTIONS).await;
        Ok(engine)
    }

    fn launch_options(&self, headless: bool, image_loading: bool) -> LaunchOptions {
        LaunchOptions {
            headless,
            image_loading,
            window_size: self.config.window_size(),
            user_agent: self.config.user_agent().to_string(),
            request_timeout: self.config.page_load_timeout(),
            user_data_dir: std::env::temp_dir()
                .join(format!("kodegen_articlescrape_{}", Uuid::new_v4())),
        }
    }

    async fn launch_tier(
        &self,
        tier: LaunchTier,
        options: LaunchOptions,
    ) -> anyhow::Result<Box<dyn RenderEngine>> {
        let executable: Option<PathBuf> = match tier {
            LaunchTier::SystemBrowser => Some(find_browser_executable()?),
            LaunchTier::ManagedDownload => Some(download_managed_browser().await?),
            LaunchTier::EngineDefault => None,
        };

        tokio::fs::create_dir_all(&options.user_data_dir).await?;

        let launched = async {
            let config = build_browser_config(&options, executable)?;
            let (browser, handler) = launch_browser(config).await?;
            ChromiumEngine::open(
                browser,
                handler,
                options.user_data_dir.clone(),
                options.window_size,
                self.config.page_load_timeout(),
            )
            .await
        }
        .await;

        match launched {
            Ok(engine) => Ok(Box::new(engine)),
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&options.user_data_dir).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl EngineLauncher for EngineFactory {
    async fn launch(
        &self,
        headless: bool,
        image_loading_enabled: bool,
    ) -> ScrapeResult<Box<dyn RenderEngine>> {
        self.acquire(headless, image_loading_enabled).await
    }
}
