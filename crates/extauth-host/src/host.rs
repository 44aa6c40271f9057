//! Host environment wiring the store, coordinator, and page contexts
//! together the way the extension runtime would.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use extauth_background::{CoordinatorHandle, ReloadHost, SessionCoordinator};
use extauth_core::{DataPaths, Error, ExtAuthConfig, Result};
use extauth_page::PageAgent;
use extauth_store::SessionStore;

/// Reload host that forwards requests onto a channel the host loop drains.
pub struct ChannelReloadHost {
    tx: mpsc::UnboundedSender<()>,
}

impl ReloadHost for ChannelReloadHost {
    fn reload(&self) -> Result<()> {
        self.tx
            .send(())
            .map_err(|_| Error::Host("Host event loop is gone".to_string()))
    }
}

/// A running host: one coordinator over one profile directory.
pub struct HostEnv {
    pub paths: DataPaths,
    pub config: ExtAuthConfig,
    pub coordinator: CoordinatorHandle,
    coordinator_task: JoinHandle<()>,
    reload_rx: mpsc::UnboundedReceiver<()>,
}

impl HostEnv {
    /// Open the profile and spawn the coordinator over it.
    pub fn open(profile_dir: &Path, config: ExtAuthConfig) -> Result<Self> {
        let paths = DataPaths::new(profile_dir)?;
        let store = Arc::new(SessionStore::open(&paths.session)?);
        let (tx, reload_rx) = mpsc::unbounded_channel();
        let (coordinator, coordinator_task) =
            SessionCoordinator::spawn(store, config.clone(), Arc::new(ChannelReloadHost { tx }));
        Ok(Self {
            paths,
            config,
            coordinator,
            coordinator_task,
            reload_rx,
        })
    }

    /// Open a page agent at the configured login URL.
    pub fn open_page(&self) -> PageAgent {
        PageAgent::new(
            &self.paths.page,
            self.coordinator.clone(),
            self.config.clone(),
        )
    }

    /// Open a page agent at an explicit URL, as after a navigation.
    pub fn open_page_at(&self, url: &str) -> PageAgent {
        PageAgent::with_url(
            &self.paths.page,
            url,
            self.coordinator.clone(),
            self.config.clone(),
        )
    }

    /// Wait for the coordinator's next reload request.
    pub async fn next_reload(&mut self) -> Option<()> {
        self.reload_rx.recv().await
    }

    /// Drop this handle and wait for the coordinator task to finish.
    /// Other live handle clones keep the coordinator running.
    pub async fn shutdown(self) {
        let HostEnv {
            coordinator,
            coordinator_task,
            ..
        } = self;
        drop(coordinator);
        let _ = coordinator_task.await;
    }
}
