//! Configuration and profile directory management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Simulated network delay before mock authentication resolves, in milliseconds.
pub const DEFAULT_AUTH_DELAY_MS: u64 = 300;
/// Delay between a logout acknowledgment and the requested host reload,
/// long enough for UI updates and verification to land first.
pub const DEFAULT_RELOAD_DELAY_MS: u64 = 1500;
/// Delay before the post-logout navigation, in milliseconds.
pub const DEFAULT_NAVIGATE_DELAY_MS: u64 = 500;
/// URL of the emulated login page.
pub const DEFAULT_LOGIN_URL: &str = "extension://extauth/login.html";

/// Paths to all extauth profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Profile root directory (e.g., `profile/`).
    pub root: PathBuf,
    /// Session store directory (`profile/session/`).
    pub session: PathBuf,
    /// Page-scoped data directory (`profile/page/`): local storage and cookies.
    pub page: PathBuf,
}

impl DataPaths {
    /// Create profile paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            session: root.join("session"),
            page: root.join("page"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    /// Create all required directories.
    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.session)?;
        std::fs::create_dir_all(&self.page)
    }
}

/// Top-level extauth configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtAuthConfig {
    /// Test mode suppresses the post-logout navigation and the host reload
    /// request. A first-class flag: never derived from user-agent sniffing.
    pub test_mode: bool,
    /// Simulated delay for mock authentication, in milliseconds.
    pub auth_delay_ms: u64,
    /// Delay before a requested host reload fires, in milliseconds.
    pub reload_delay_ms: u64,
    /// Delay before the post-logout navigation fires, in milliseconds.
    pub navigate_delay_ms: u64,
    /// Page URL the emulated login page starts at.
    pub login_url: String,
}

impl Default for ExtAuthConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            auth_delay_ms: DEFAULT_AUTH_DELAY_MS,
            reload_delay_ms: DEFAULT_RELOAD_DELAY_MS,
            navigate_delay_ms: DEFAULT_NAVIGATE_DELAY_MS,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

impl ExtAuthConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        Self {
            test_mode: env_flag("EXTAUTH_TEST_MODE").unwrap_or(false),
            auth_delay_ms: env_parse("EXTAUTH_AUTH_DELAY_MS", DEFAULT_AUTH_DELAY_MS),
            reload_delay_ms: env_parse("EXTAUTH_RELOAD_DELAY_MS", DEFAULT_RELOAD_DELAY_MS),
            navigate_delay_ms: env_parse("EXTAUTH_NAVIGATE_DELAY_MS", DEFAULT_NAVIGATE_DELAY_MS),
            login_url: std::env::var("EXTAUTH_LOGIN_URL")
                .unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string()),
        }
    }

    /// Create with test mode on and zero simulated delays (for testing).
    pub fn for_tests() -> Self {
        Self {
            test_mode: true,
            auth_delay_ms: 0,
            reload_delay_ms: 0,
            navigate_delay_ms: 0,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
