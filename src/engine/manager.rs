//! Engine lifecycle manager
//!
//! Owns the single shared engine handle and walks it through
//! `Uninitialized -> Ready -> Dead -> Ready | Closed`. Every engine
//! interaction happens through an `EngineLease`, which holds the manager's
//! mutex, so retrievals queue in FIFO order and never overlap.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use super::{EngineLauncher, RenderEngine};
use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing launched yet; the first lease launches lazily
    Uninitialized,
    Ready,
    /// The handle failed a health check and was discarded
    Dead,
    /// Shut down; no further leases are granted
    Closed,
}

struct EngineSlot {
    state: EngineState,
    engine: Option<Box<dyn RenderEngine>>,
}

/// Exclusive access to the live engine for the duration of one retrieval.
pub struct EngineLease<'a> {
    slot: MutexGuard<'a, EngineSlot>,
}

impl EngineLease<'_> {
    /// The leased engine.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` if the handle was discarded through `mark_dead`.
    pub fn engine(&mut self) -> ScrapeResult<&mut dyn RenderEngine> {
        match self.slot.engine.as_deref_mut() {
            Some(engine) => Ok(engine),
            None => Err(ScrapeError::EngineUnavailable(
                "engine handle is no longer available".to_string(),
            )),
        }
    }

    /// Discard the handle so the next lease re-acquires from scratch.
    pub async fn mark_dead(mut self) {
        if let Some(mut engine) = self.slot.engine.take()
            && let Err(e) = engine.quit().await
        {
            warn!("Failed to quit dead engine: {e:#}");
        }
        self.slot.state = EngineState::Dead;
    }
}

/// Shared, lazily launched engine handle with re-acquisition on death.
pub struct EngineManager {
    launcher: Arc<dyn EngineLauncher>,
    headless: bool,
    image_loading: bool,
    slot: Mutex<EngineSlot>,
}

impl EngineManager {
    /// Create a manager. Nothing is launched until the first `lease()`.
    #[must_use]
    pub fn new(launcher: Arc<dyn EngineLauncher>, headless: bool, image_loading: bool) -> Self {
        Self {
            launcher,
            headless,
            image_loading,
            slot: Mutex::new(EngineSlot {
                state: EngineState::Uninitialized,
                engine: None,
            }),
        }
    }

    pub async fn state(&self) -> EngineState {
        self.slot.lock().await.state
    }

    /// Wait for exclusive access to a live engine.
    ///
    /// A handle that fails its health check is quit and replaced. Replacement
    /// gets one extra launcher invocation before giving up.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable` when the manager is closed or every launch failed.
    pub async fn lease(&self) -> ScrapeResult<EngineLease<'_>> {
        let mut slot = self.slot.lock().await;

        match slot.state {
            EngineState::Closed => {
                return Err(ScrapeError::EngineUnavailable(
                    "engine manager has been shut down".to_string(),
                ));
            }
            EngineState::Ready => {
                let alive = match slot.engine.as_deref_mut() {
                    Some(engine) => engine.is_alive().await,
                    None => false,
                };
                if alive {
                    tracing::debug!("Engine health check passed, reusing existing handle");
                    return Ok(EngineLease { slot });
                }

                warn!("Engine handle is dead, discarding it");
                if let Some(mut dead) = slot.engine.take() {
                    let _ = dead.quit().await;
                }
                slot.state = EngineState::Dead;
            }
            EngineState::Uninitialized | EngineState::Dead => {}
        }

        let recovering = slot.state == EngineState::Dead;
        info!(
            "Launching browser engine ({})",
            if recovering { "recovery" } else { "first use" }
        );

        let engine = self.launch(recovering).await?;
        slot.engine = Some(engine);
        slot.state = EngineState::Ready;
        Ok(EngineLease { slot })
    }

    async fn launch(&self, recovering: bool) -> ScrapeResult<Box<dyn RenderEngine>> {
        match self.launcher.launch(self.headless, self.image_loading).await {
            Ok(engine) => Ok(engine),
            Err(first) if recovering => {
                warn!("Engine re-acquisition failed ({first}), trying a fresh launch");
                self.launcher
                    .launch(self.headless, self.image_loading)
                    .await
                    .map_err(|second| {
                        ScrapeError::EngineUnavailable(format!("{first}; fresh launch: {second}"))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Quit the engine and refuse further leases. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        let mut slot = self.slot.lock().await;
        if slot.state == EngineState::Closed {
            return;
        }
        if let Some(mut engine) = slot.engine.take() {
            info!("Shutting down browser engine");
            if let Err(e) = engine.quit().await {
                warn!("Failed to quit engine cleanly: {e:#}");
            }
        }
        slot.state = EngineState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubEngine {
        alive: Arc<AtomicBool>,
        quits: Arc<AtomicUsize>,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RenderEngine for StubEngine {
        async fn navigate(&mut self, _url: &str) -> anyhow::Result<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
        async fn wait_for_ready(&mut self, _timeout: Duration) -> anyhow::Result<()> {
            Ok(())
        }
        async fn document_height(&mut self) -> anyhow::Result<u64> {
            Ok(0)
        }
        async fn scroll_to(&mut self, _y: u64) -> anyhow::Result<()> {
            Ok(())
        }
        async fn page_markup(&mut self) -> anyhow::Result<String> {
            Ok(String::new())
        }
        async fn install_script(&mut self, _source: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn is_alive(&mut self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
        async fn quit(&mut self) -> anyhow::Result<()> {
            self.quits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubLauncher {
        launches: AtomicUsize,
        /// Launch numbers (1-based) that fail
        failing: Vec<usize>,
        alive: Arc<AtomicBool>,
        quits: Arc<AtomicUsize>,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EngineLauncher for StubLauncher {
        async fn launch(&self, _headless: bool, _images: bool) -> ScrapeResult<Box<dyn RenderEngine>> {
            let n = self.launches.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.contains(&n) {
                return Err(ScrapeError::EngineUnavailable(format!("launch {n} failed")));
            }
            self.alive.store(true, Ordering::SeqCst);
            Ok(Box::new(StubEngine {
                alive: self.alive.clone(),
                quits: self.quits.clone(),
                active: self.active.clone(),
                peak: self.peak.clone(),
            }))
        }
    }

    fn manager(launcher: &Arc<StubLauncher>) -> EngineManager {
        EngineManager::new(launcher.clone(), true, true)
    }

    #[tokio::test]
    async fn launches_lazily_and_reuses_live_handle() {
        let launcher = Arc::new(StubLauncher::default());
        let manager = manager(&launcher);
        assert_eq!(manager.state().await, EngineState::Uninitialized);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);

        drop(manager.lease().await.unwrap());
        drop(manager.lease().await.unwrap());

        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state().await, EngineState::Ready);
    }

    #[tokio::test]
    async fn dead_handle_is_replaced() {
        let launcher = Arc::new(StubLauncher::default());
        let manager = manager(&launcher);
        drop(manager.lease().await.unwrap());

        launcher.alive.store(false, Ordering::SeqCst);
        drop(manager.lease().await.unwrap());

        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
        assert_eq!(launcher.quits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovery_gets_one_extra_launch() {
        let launcher = Arc::new(StubLauncher {
            failing: vec![2],
            ..StubLauncher::default()
        });
        let manager = manager(&launcher);
        drop(manager.lease().await.unwrap());
        launcher.alive.store(false, Ordering::SeqCst);

        assert!(manager.lease().await.is_ok());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovery_fails_after_two_launch_failures() {
        let launcher = Arc::new(StubLauncher {
            failing: vec![2, 3],
            ..StubLauncher::default()
        });
        let manager = manager(&launcher);
        drop(manager.lease().await.unwrap());
        launcher.alive.store(false, Ordering::SeqCst);

        let err = manager.lease().await.err().unwrap();
        assert!(matches!(err, ScrapeError::EngineUnavailable(_)));
        assert_eq!(manager.state().await, EngineState::Dead);
    }

    #[tokio::test]
    async fn first_launch_is_not_retried() {
        let launcher = Arc::new(StubLauncher {
            failing: vec![1],
            ..StubLauncher::default()
        });
        let manager = manager(&launcher);

        assert!(manager.lease().await.is_err());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state().await, EngineState::Uninitialized);
    }

    #[tokio::test]
    async fn shutdown_quits_once_and_closes() {
        let launcher = Arc::new(StubLauncher::default());
        let manager = manager(&launcher);
        drop(manager.lease().await.unwrap());

        manager.shutdown().await;
        manager.shutdown().await;

        assert_eq!(launcher.quits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state().await, EngineState::Closed);
        assert!(manager.lease().await.is_err());
    }

    #[tokio::test]
    async fn leases_never_overlap() {
        let launcher = Arc::new(StubLauncher::default());
        let manager = manager(&launcher);

        let run = || async {
            let mut lease = manager.lease().await.unwrap();
            lease.engine().unwrap().navigate("https://example.com").await.unwrap();
        };
        tokio::join!(run(), run(), run());

        assert_eq!(launcher.peak.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }
}
