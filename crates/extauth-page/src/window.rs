//! Page window, the `window.location` analog.
//!
//! Holds the current URL and the two mutations the login flow needs:
//! a full navigation and a history-style query strip.

use parking_lot::RwLock;

/// Query parameter marking the first load after a logout.
pub const LOGOUT_PARAM: &str = "logout";

/// Mutable URL handle for one page.
pub struct PageWindow {
    href: RwLock<String>,
}

impl PageWindow {
    pub fn new(href: &str) -> Self {
        Self {
            href: RwLock::new(href.to_string()),
        }
    }

    /// Current full URL.
    pub fn href(&self) -> String {
        self.href.read().clone()
    }

    /// Navigate to a new URL. In a real browser this is a page load.
    pub fn navigate(&self, href: &str) {
        *self.href.write() = href.to_string();
    }

    /// The URL with its query string removed.
    pub fn base_url(&self) -> String {
        let href = self.href.read();
        href.split('?').next().unwrap_or(&href).to_string()
    }

    /// Read a query parameter value, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let href = self.href.read();
        let (_, query) = href.split_once('?')?;
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == name {
                return Some(value.to_string());
            }
        }
        None
    }

    /// Drop the query string without a page load, like `history.replaceState`.
    pub fn strip_query(&self) {
        let base = self.base_url();
        *self.href.write() = base;
    }
}
