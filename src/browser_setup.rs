use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

/// Browser binaries looked up on `PATH`, most specific first
const BROWSER_BINARIES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Settings shared by every launch tier.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    /// When false the renderer is told not to fetch images at all
    pub image_loading: bool,
    pub window_size: (u32, u32),
    pub user_agent: String,
    pub request_timeout: Duration,
    pub user_data_dir: PathBuf,
}

/// Find a Chrome/Chromium executable already installed on the host.
///
/// `CHROMIUM_PATH` overrides everything. Otherwise the executable search path
/// is consulted, then a short list of well-known install locations.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!(
                "Using browser from CHROMIUM_PATH environment variable: {}",
                path.display()
            );
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH environment variable points to non-existent file: {}",
            path.display()
        );
    }

    for name in BROWSER_BINARIES {
        if let Ok(path) = which::which(name) {
            info!("Found browser on PATH: {}", path.display());
            return Ok(path);
        }
    }

    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else {
        &["/opt/google/chrome/chrome", "/snap/bin/chromium"]
    };

    paths
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .inspect(|path| info!("Found browser at: {}", path.display()))
        .ok_or_else(|| anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium build into the user cache directory.
/// Returns the path to the downloaded executable.
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine user cache directory, using temp directory fallback: {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen_articlescrape")
        .join("chromium");

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// Build a browser config with the stability and anti-automation flags.
///
/// With `executable = None` chromiumoxide resolves the browser on its own.
pub fn build_browser_config(
    options: &LaunchOptions,
    executable: Option<PathBuf>,
) -> Result<BrowserConfig> {
    let (width, height) = options.window_size;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(options.request_timeout)
        .window_size(width, height)
        .user_data_dir(options.user_data_dir.clone());

    if let Some(path) = executable {
        config_builder = config_builder.chrome_executable(path);
    }

    if options.headless {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder
        .arg(format!("--user-agent={}", options.user_agent))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-setuid-sandbox")
        .arg("--no-sandbox")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--deny-permission-prompts")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-hang-monitor")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    if !options.image_loading {
        config_builder = config_builder.arg("--blink-settings=imagesEnabled=false");
    }

    config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))
}

/// Launch a browser and spawn its CDP event handler.
pub async fn launch_browser(config: BrowserConfig) -> Result<(Browser, JoinHandle<()>)> {
    info!("Launching browser with config: {:?}", config);
    let (browser, mut handler) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(h) = handler.next().await {
            if let Err(e) = h {
                let error_msg = e.to_string();

                // Chrome emits CDP events chromiumoxide cannot decode; these are noise
                let is_benign_serialization_error = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");

                if is_benign_serialization_error {
                    trace!("Suppressed benign CDP serialization error: {}", error_msg);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}
