//! Browser engine abstraction
//!
//! Retrieval and lifecycle logic talk to a `RenderEngine`, never to
//! chromiumoxide directly. `ChromiumEngine` is the production adapter; tests
//! drive the same code with scripted fakes.

pub mod chromium;
pub mod factory;
pub mod manager;

use async_trait::async_trait;
use std::time::Duration;

use crate::crawl_engine::crawl_types::ScrapeResult;

pub use chromium::ChromiumEngine;
pub use factory::{EngineFactory, LaunchTier, SetupAction, apply_setup_actions};
pub use manager::{EngineLease, EngineManager, EngineState};

/// A controllable rendering engine. Not reentrant: callers serialize access.
#[async_trait]
pub trait RenderEngine: Send {
    /// Load `url` in the engine's page
    async fn navigate(&mut self, url: &str) -> anyhow::Result<()>;

    /// Wait until the document body exists, up to `timeout`
    async fn wait_for_ready(&mut self, timeout: Duration) -> anyhow::Result<()>;

    /// Current `scrollHeight` of the document body
    async fn document_height(&mut self) -> anyhow::Result<u64>;

    async fn scroll_to(&mut self, y: u64) -> anyhow::Result<()>;

    /// Serialized markup of the rendered document
    async fn page_markup(&mut self) -> anyhow::Result<String>;

    /// Register a script to run before any page script on every navigation
    async fn install_script(&mut self, source: &str) -> anyhow::Result<()>;

    /// Cheap liveness probe used before reusing a handle
    async fn is_alive(&mut self) -> bool;

    /// Terminate the engine process and release its resources
    async fn quit(&mut self) -> anyhow::Result<()>;
}

/// Produces engine handles for the lifecycle manager.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    async fn launch(
        &self,
        headless: bool,
        image_loading_enabled: bool,
    ) -> ScrapeResult<Box<dyn RenderEngine>>;
}
