//! Page Agent: mock authentication and the page-local view of login state.
//!
//! Owns the page's storage, cookie jar, window, and UI state, and talks to
//! the Session Coordinator over the message channel. The page record and
//! the coordinator's store are updated independently, best-effort; if one
//! write fails the other is not rolled back.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use extauth_background::CoordinatorHandle;
use extauth_core::{token, Error, ExtAuthConfig, Result};

use crate::cookies::{CookieJar, AUTH_COOKIE};
use crate::storage::{LocalStorage, KEY_AUTH_TOKEN, KEY_CURRENT_USER, KEY_IS_LOGGED_IN};
use crate::ui::UiState;
use crate::window::{PageWindow, LOGOUT_PARAM};

/// Result of the trust-on-read token check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCheck {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

impl AuthCheck {
    fn not_authenticated() -> Self {
        Self {
            is_authenticated: false,
            username: None,
        }
    }
}

/// Snapshot of the page-local auth record: storage keys plus the live
/// session cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAuthRecord {
    pub is_logged_in: Option<String>,
    pub current_user: Option<String>,
    pub auth_token: Option<String>,
    pub session_cookie: Option<String>,
}

/// The login page script.
pub struct PageAgent {
    storage: LocalStorage,
    cookies: CookieJar,
    window: Arc<PageWindow>,
    coordinator: CoordinatorHandle,
    config: ExtAuthConfig,
    ui: RwLock<UiState>,
    current_user: RwLock<Option<String>>,
    pending_navigation: Mutex<Option<JoinHandle<()>>>,
}

impl PageAgent {
    /// Create an agent for the configured login page URL.
    pub fn new(data_dir: &Path, coordinator: CoordinatorHandle, config: ExtAuthConfig) -> Self {
        let url = config.login_url.clone();
        Self::with_url(data_dir, &url, coordinator, config)
    }

    /// Create an agent with an explicit starting URL.
    pub fn with_url(
        data_dir: &Path,
        url: &str,
        coordinator: CoordinatorHandle,
        config: ExtAuthConfig,
    ) -> Self {
        Self {
            storage: LocalStorage::open(data_dir),
            cookies: CookieJar::open(data_dir),
            window: Arc::new(PageWindow::new(url)),
            coordinator,
            config,
            ui: RwLock::new(UiState::default()),
            current_user: RwLock::new(None),
            pending_navigation: Mutex::new(None),
        }
    }

    // ---------------------------------------------------------------
    // Page load
    // ---------------------------------------------------------------

    /// Run the page-load restoration policy.
    ///
    /// In order: a post-logout URL marker forces a clean logged-out state
    /// (marker consumed); otherwise the stored token is trusted if it
    /// decodes; otherwise a surviving `isLoggedIn` flag self-heals by
    /// regenerating the missing token.
    pub async fn load(&self) -> Result<()> {
        if self.window.query_param(LOGOUT_PARAM).as_deref() == Some("true") {
            info!("Page loaded after logout, ensuring clean state");
            self.window.strip_query();
            *self.current_user.write() = None;
            self.set_ui(UiState::LoggedOut {
                previous_user: None,
            });
            return Ok(());
        }

        let check = self.check_authentication();
        if check.is_authenticated {
            if let Some(username) = check.username {
                self.enter_logged_in(&username).await;
                return Ok(());
            }
        }

        if self.storage.get_item(KEY_IS_LOGGED_IN).as_deref() == Some("true") {
            // Token missing or unreadable but the flag survived; regenerate
            // the token and carry on as logged in.
            let username = self.storage.get_item(KEY_CURRENT_USER).unwrap_or_default();
            let fresh = token::issue(&username);
            self.storage.set_item(KEY_AUTH_TOKEN, &fresh);
            self.enter_logged_in(&username).await;
            return Ok(());
        }

        self.set_ui(UiState::LoggedOut {
            previous_user: None,
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Authentication
    // ---------------------------------------------------------------

    /// Mock credential check. Any non-empty pair succeeds after the
    /// configured delay; success writes the token and the session cookie.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        tokio::time::sleep(Duration::from_millis(self.config.auth_delay_ms)).await;

        let token = token::issue(username);
        self.storage.set_item(KEY_AUTH_TOKEN, &token);
        self.cookies.set_auth_session(&token);
        Ok(())
    }

    /// Full login flow, as driven from the login form.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.set_ui(UiState::LoggingIn);
        match self.authenticate(username, password).await {
            Ok(()) => {
                self.enter_logged_in(username).await;
                Ok(())
            }
            Err(e) => {
                self.set_ui(UiState::LoggedOut {
                    previous_user: None,
                });
                Err(e)
            }
        }
    }

    /// Trust-on-read check of the stored token. Decode failures are
    /// swallowed and report as not authenticated.
    pub fn check_authentication(&self) -> AuthCheck {
        let Some(token) = self.storage.get_item(KEY_AUTH_TOKEN) else {
            return AuthCheck::not_authenticated();
        };
        match token::decode(&token) {
            Ok(claims) => AuthCheck {
                is_authenticated: true,
                username: Some(claims.username),
            },
            Err(e) => {
                warn!("Invalid token format: {}", e);
                AuthCheck::not_authenticated()
            }
        }
    }

    /// Reach the logged-in state: update UI, refresh the page record, and
    /// notify the coordinator. Runs on fresh logins and on restores alike,
    /// so a restored page re-announces itself to the coordinator.
    async fn enter_logged_in(&self, username: &str) {
        *self.current_user.write() = Some(username.to_string());
        self.set_ui(UiState::LoggedIn {
            username: username.to_string(),
        });
        info!("User {} logged in successfully", username);

        self.storage.set_item(KEY_IS_LOGGED_IN, "true");
        self.storage.set_item(KEY_CURRENT_USER, username);

        let token = self.storage.get_item(KEY_AUTH_TOKEN).unwrap_or_default();
        if let Err(e) = self.coordinator.login(username, &token).await {
            warn!("Failed to notify coordinator of login: {}", e);
        }
    }

    // ---------------------------------------------------------------
    // Logout
    // ---------------------------------------------------------------

    /// Log out using the configured test-mode flag.
    pub async fn logout(&self) -> Result<()> {
        self.perform_logout(self.config.test_mode).await
    }

    /// Log out. Test mode suppresses the reload request and the post-logout
    /// navigation so a harness can inspect the final state in place.
    pub async fn perform_logout(&self, test_mode: bool) -> Result<()> {
        info!("Performing logout");

        self.storage.remove_item(KEY_IS_LOGGED_IN);
        self.storage.remove_item(KEY_CURRENT_USER);
        self.storage.remove_item(KEY_AUTH_TOKEN);
        self.cookies.expire_auth_session();
        info!("Cleared authentication data");

        let previous_user = self.current_user.read().clone();
        match self
            .coordinator
            .logout(previous_user.clone(), !test_mode)
            .await
        {
            Ok(response) => debug!("Coordinator acknowledged logout: {:?}", response),
            Err(e) => warn!("Failed to notify coordinator of logout: {}", e),
        }

        self.set_ui(UiState::LoggedOut {
            previous_user: previous_user.clone(),
        });
        if let Some(user) = &previous_user {
            info!("User {} logged out", user);
        }
        *self.current_user.write() = None;

        if test_mode {
            info!("Test mode: skipping page reload after logout");
        } else {
            self.schedule_post_logout_navigation(previous_user);
        }
        Ok(())
    }

    /// After the configured delay, rewrite the URL to its post-logout
    /// variant so the next load lands on the marker branch even if the
    /// host reload never happens.
    fn schedule_post_logout_navigation(&self, previous_user: Option<String>) {
        let mut pending = self.pending_navigation.lock();
        if let Some(task) = pending.take() {
            task.abort();
        }
        let window = self.window.clone();
        let delay = Duration::from_millis(self.config.navigate_delay_ms);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(user) = &previous_user {
                info!("Page ready for reload after logout of user: {}", user);
            }
            let target = format!("{}?{}=true", window.base_url(), LOGOUT_PARAM);
            window.navigate(&target);
        }));
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Current UI state.
    pub fn ui(&self) -> UiState {
        self.ui.read().clone()
    }

    /// The remembered username, if anyone is logged in.
    pub fn current_user(&self) -> Option<String> {
        self.current_user.read().clone()
    }

    /// The page's window handle.
    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    /// The page's local storage.
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// The page's cookie jar.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Snapshot the page-local auth record.
    pub fn local_auth_record(&self) -> LocalAuthRecord {
        LocalAuthRecord {
            is_logged_in: self.storage.get_item(KEY_IS_LOGGED_IN),
            current_user: self.storage.get_item(KEY_CURRENT_USER),
            auth_token: self.storage.get_item(KEY_AUTH_TOKEN),
            session_cookie: self.cookies.get(AUTH_COOKIE),
        }
    }

    fn set_ui(&self, state: UiState) {
        *self.ui.write() = state;
    }
}

impl Drop for PageAgent {
    fn drop(&mut self) {
        if let Some(task) = self.pending_navigation.lock().take() {
            task.abort();
        }
    }
}
