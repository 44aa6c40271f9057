//! End-to-end login flow tests exercising a real coordinator, page, and
//! observer wired together over one profile directory.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;
use tokio::task::JoinHandle;

use extauth_background::{CoordinatorHandle, NoopReloadHost, ReloadHost, SessionCoordinator};
use extauth_content::Observer;
use extauth_core::ExtAuthConfig;
use extauth_page::{PageAgent, LOGOUT_PARAM};
use extauth_store::SessionStore;

struct RecordingReloadHost {
    reloads: Arc<AtomicUsize>,
}

impl ReloadHost for RecordingReloadHost {
    fn reload(&self) -> extauth_core::Result<()> {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn spawn_over(
    dir: &Path,
    config: ExtAuthConfig,
    host: Arc<dyn ReloadHost>,
) -> (CoordinatorHandle, JoinHandle<()>) {
    let store = Arc::new(SessionStore::open(dir.join("session")).unwrap());
    SessionCoordinator::spawn(store, config, host)
}

#[tokio::test]
async fn test_full_login_logout_cycle() {
    let dir = TempDir::new().unwrap();
    let config = ExtAuthConfig::for_tests();
    let (handle, task) = spawn_over(dir.path(), config.clone(), Arc::new(NoopReloadHost));
    let observer = Observer::new(handle.clone());

    // Nobody logged in yet.
    assert!(!observer.observe().await.logged_in);

    let page = PageAgent::new(&dir.path().join("page"), handle.clone(), config);
    page.load().await.unwrap();
    page.login("alice", "pw").await.unwrap();

    // Observer sees the session through the coordinator.
    let report = observer.observe().await;
    assert!(report.logged_in);
    assert_eq!(report.username.as_deref(), Some("alice"));

    page.perform_logout(true).await.unwrap();

    assert!(!observer.observe().await.logged_in);
    assert_eq!(page.ui().status_message(), "User alice logged out");
    assert!(page.local_auth_record().auth_token.is_none());

    drop(page);
    drop(observer);
    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_session_survives_coordinator_restart() {
    let dir = TempDir::new().unwrap();
    let config = ExtAuthConfig::for_tests();

    {
        let (handle, task) = spawn_over(dir.path(), config.clone(), Arc::new(NoopReloadHost));
        let page = PageAgent::new(&dir.path().join("page"), handle.clone(), config.clone());
        page.load().await.unwrap();
        page.login("bob", "pw").await.unwrap();
        drop(page);
        drop(handle);
        task.await.unwrap();
    }

    // Fresh coordinator restores from the store alone; no page involved.
    let (handle, task) = spawn_over(dir.path(), config, Arc::new(NoopReloadHost));
    let report = Observer::new(handle.clone()).observe().await;
    assert!(report.logged_in);
    assert_eq!(report.username.as_deref(), Some("bob"));

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_logout_marker_survives_missed_reload() {
    let dir = TempDir::new().unwrap();
    let config = ExtAuthConfig {
        test_mode: false,
        ..ExtAuthConfig::for_tests()
    };
    let (handle, task) = spawn_over(dir.path(), config.clone(), Arc::new(NoopReloadHost));
    let page_dir = dir.path().join("page");

    let page = PageAgent::new(&page_dir, handle.clone(), config.clone());
    page.load().await.unwrap();
    page.login("carol", "pw").await.unwrap();
    page.perform_logout(false).await.unwrap();

    // The navigation lands even though no host reload ever comes.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let href = page.window().href();
    assert_eq!(page.window().query_param(LOGOUT_PARAM).as_deref(), Some("true"));
    drop(page);

    // The next load at that URL consumes the marker and starts clean.
    let page = PageAgent::with_url(&page_dir, &href, handle.clone(), config);
    page.load().await.unwrap();
    assert_eq!(page.ui().status_message(), "Please log in");
    assert_eq!(page.window().query_param(LOGOUT_PARAM), None);

    drop(page);
    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_logout_reload_request_reaches_host() {
    let dir = TempDir::new().unwrap();
    let reloads = Arc::new(AtomicUsize::new(0));
    let config = ExtAuthConfig {
        test_mode: false,
        ..ExtAuthConfig::for_tests()
    };
    let (handle, task) = spawn_over(
        dir.path(),
        config.clone(),
        Arc::new(RecordingReloadHost {
            reloads: reloads.clone(),
        }),
    );

    let page = PageAgent::new(&dir.path().join("page"), handle.clone(), config);
    page.load().await.unwrap();
    page.login("dave", "pw").await.unwrap();
    page.perform_logout(false).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(reloads.load(Ordering::SeqCst), 1);

    drop(page);
    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn test_page_record_and_coordinator_are_independent() {
    let dir = TempDir::new().unwrap();
    let config = ExtAuthConfig::for_tests();
    let (handle, task) = spawn_over(dir.path(), config.clone(), Arc::new(NoopReloadHost));

    // Page A logs in.
    let page_a = PageAgent::new(&dir.path().join("page-a"), handle.clone(), config.clone());
    page_a.load().await.unwrap();
    page_a.login("erin", "pw").await.unwrap();

    // Page B has its own empty record and stays logged out locally,
    // while the coordinator still reports the session.
    let page_b = PageAgent::new(&dir.path().join("page-b"), handle.clone(), config);
    page_b.load().await.unwrap();
    assert_eq!(page_b.ui().status_message(), "Please log in");
    assert!(page_b.local_auth_record().auth_token.is_none());

    let report = Observer::new(handle.clone()).observe().await;
    assert!(report.logged_in);
    assert_eq!(report.username.as_deref(), Some("erin"));

    drop(page_a);
    drop(page_b);
    drop(handle);
    task.await.unwrap();
}
