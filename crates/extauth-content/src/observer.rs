//! Read-only session observer, the content-script analog.
//!
//! Asks the coordinator for the current auth state exactly once and logs
//! what it saw. No mutation, no retry; a missing or failed response simply
//! means "not logged in".

use tracing::info;

use extauth_background::CoordinatorHandle;

/// What the observer saw and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverReport {
    pub logged_in: bool,
    pub username: Option<String>,
}

/// Content script context bound to one coordinator.
pub struct Observer {
    coordinator: CoordinatorHandle,
}

impl Observer {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }

    /// Query the coordinator once and record the result.
    pub async fn observe(&self) -> ObserverReport {
        let state = match self.coordinator.auth_state().await {
            Ok(state) => state,
            Err(_) => {
                info!("Content script: No user is logged in");
                return ObserverReport {
                    logged_in: false,
                    username: None,
                };
            }
        };

        if state.is_logged_in {
            info!(
                "Content script: User {} is logged in",
                state.username.as_deref().unwrap_or("unknown")
            );
            ObserverReport {
                logged_in: true,
                username: state.username,
            }
        } else {
            info!("Content script: No user is logged in");
            ObserverReport {
                logged_in: false,
                username: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extauth_background::{NoopReloadHost, SessionCoordinator};
    use extauth_core::ExtAuthConfig;
    use extauth_store::SessionStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn spawn_coordinator(
        dir: &std::path::Path,
    ) -> (CoordinatorHandle, tokio::task::JoinHandle<()>) {
        let store = Arc::new(SessionStore::open(dir).unwrap());
        SessionCoordinator::spawn(store, ExtAuthConfig::for_tests(), Arc::new(NoopReloadHost))
    }

    #[tokio::test]
    async fn test_observe_logged_in_user() {
        let dir = TempDir::new().unwrap();
        let (handle, task) = spawn_coordinator(dir.path());
        handle.login("alice", "tok").await.unwrap();

        let report = Observer::new(handle.clone()).observe().await;
        assert!(report.logged_in);
        assert_eq!(report.username.as_deref(), Some("alice"));

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_observe_nobody_logged_in() {
        let dir = TempDir::new().unwrap();
        let (handle, task) = spawn_coordinator(dir.path());

        let report = Observer::new(handle.clone()).observe().await;
        assert!(!report.logged_in);
        assert_eq!(report.username, None);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_observe_with_coordinator_gone() {
        let dir = TempDir::new().unwrap();
        let (handle, task) = spawn_coordinator(dir.path());
        task.abort();
        let _ = task.await;

        let report = Observer::new(handle).observe().await;
        assert!(!report.logged_in);
        assert_eq!(report.username, None);
    }
}
