//! Session Coordinator: the long-lived authority for login state.
//!
//! Owns the canonical in-memory `SessionState`, answers action-tagged
//! messages from page and content contexts, and mirrors state changes into
//! the persistent store. Acknowledgments go out before persistence: writes
//! are best-effort and never block a caller's reply.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use extauth_core::{Error, ExtAuthConfig, Result, SessionState};
use extauth_protocol::{Message, Response};
use extauth_store::SessionStore;

use crate::reload::ReloadHost;

/// A message paired with the reply slot of its sender.
struct Envelope {
    message: Message,
    reply: oneshot::Sender<Response>,
}

/// Cloneable sender half for talking to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl CoordinatorHandle {
    /// Send a message and wait for the coordinator's response.
    pub async fn send(&self, message: Message) -> Result<Response> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                message,
                reply: reply_tx,
            })
            .map_err(|_| Error::Channel("Coordinator is not running".to_string()))?;
        reply_rx
            .await
            .map_err(|_| Error::Channel("Coordinator dropped the reply".to_string()))
    }

    /// Announce a successful login.
    pub async fn login(&self, username: &str, token: &str) -> Result<Response> {
        self.send(Message::Login {
            username: username.to_string(),
            token: token.to_string(),
        })
        .await
    }

    /// Announce a logout, optionally requesting a page reload.
    pub async fn logout(
        &self,
        previous_user: Option<String>,
        request_reload: bool,
    ) -> Result<Response> {
        self.send(Message::Logout {
            previous_user,
            request_reload,
        })
        .await
    }

    /// Snapshot the authoritative session state.
    pub async fn auth_state(&self) -> Result<SessionState> {
        match self.send(Message::GetAuthState).await? {
            Response::State(state) => Ok(state),
            other => Err(Error::Channel(format!(
                "Unexpected response to getAuthState: {:?}",
                other
            ))),
        }
    }

    /// Forward a diagnostic line into the coordinator's log.
    pub async fn log(&self, text: &str) -> Result<Response> {
        self.send(Message::Log {
            text: text.to_string(),
        })
        .await
    }
}

/// Background session authority.
///
/// Restores persisted state at spawn, then serves messages one at a time
/// until every handle is dropped. Per-message handling is atomic; two
/// logins in quick succession simply overwrite each other, last write wins.
pub struct SessionCoordinator {
    state: SessionState,
    store: Arc<SessionStore>,
    config: ExtAuthConfig,
    host: Arc<dyn ReloadHost>,
    pending_reload: Option<JoinHandle<()>>,
}

impl SessionCoordinator {
    /// Spawn the coordinator task.
    ///
    /// Returns the message handle plus the task handle; awaiting the task
    /// after dropping all handles gives a clean shutdown.
    pub fn spawn(
        store: Arc<SessionStore>,
        config: ExtAuthConfig,
        host: Arc<dyn ReloadHost>,
    ) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut coordinator = SessionCoordinator::restore(store, config, host);
            while let Some(Envelope { message, reply }) = rx.recv().await {
                coordinator.handle(message, reply);
            }
            coordinator.shutdown();
        });

        (CoordinatorHandle { tx }, task)
    }

    /// Rebuild in-memory state from whatever the store last persisted.
    /// Restoration is unconditional trust; no token freshness check.
    fn restore(store: Arc<SessionStore>, config: ExtAuthConfig, host: Arc<dyn ReloadHost>) -> Self {
        let state = match store.load_session() {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to restore session: {}", e);
                SessionState::logged_out()
            }
        };
        if let Some(username) = &state.username {
            info!("Restored login state for {}", username);
        }
        Self {
            state,
            store,
            config,
            host,
            pending_reload: None,
        }
    }

    fn handle(&mut self, message: Message, reply: oneshot::Sender<Response>) {
        match message {
            Message::Login { username, token } => {
                self.state = SessionState::logged_in(username.clone(), token.clone());
                let _ = reply.send(Response::success());
                info!("User {} logged in", username);
                if let Err(e) = self.store.save_session(&username, &token) {
                    warn!("Failed to persist session: {}", e);
                }
            }
            Message::Logout {
                previous_user,
                request_reload,
            } => {
                info!(
                    "User {} logged out",
                    previous_user.as_deref().unwrap_or("unknown")
                );
                debug!(
                    "Logout message: previous_user={:?}, request_reload={}",
                    previous_user, request_reload
                );
                self.state = SessionState::logged_out();
                let _ = reply.send(Response::success());
                if let Err(e) = self.store.clear_session() {
                    warn!("Failed to clear persisted session: {}", e);
                }
                if request_reload {
                    info!("Preparing to reload page");
                    if self.config.test_mode {
                        info!("Skipping page reload in test mode");
                    } else {
                        self.schedule_reload();
                    }
                }
            }
            Message::GetAuthState => {
                let _ = reply.send(Response::State(self.state.clone()));
            }
            Message::SetTestMode => {
                // Accepted for wire compatibility; the flag itself comes
                // from `ExtAuthConfig`, not from callers.
                info!("Test mode message received");
                let _ = reply.send(Response::success());
            }
            Message::Log { text } => {
                info!("Content script log: {}", text);
                let _ = reply.send(Response::received());
            }
        }
    }

    /// Schedule a host reload after the configured delay. The delay gives
    /// callers time to finish their own post-logout UI updates. A newer
    /// logout replaces any reload still pending.
    fn schedule_reload(&mut self) {
        if let Some(pending) = self.pending_reload.take() {
            pending.abort();
        }
        let host = self.host.clone();
        let delay = Duration::from_millis(self.config.reload_delay_ms);
        self.pending_reload = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("Reloading page now");
            if let Err(e) = host.reload() {
                warn!("Failed to reload page: {}", e);
            }
        }));
    }

    fn shutdown(&mut self) {
        if let Some(pending) = self.pending_reload.take() {
            pending.abort();
        }
    }
}
