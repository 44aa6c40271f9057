//! Page cookie jar, the `document.cookie` analog, persisted as JSON.
//!
//! Reads behave like `document.cookie`: expired cookies are invisible but
//! stay in the jar until overwritten. Clearing a cookie means rewriting it
//! with an epoch expiry, not deleting it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_session";
/// Auth cookie lifetime in days.
pub const AUTH_COOKIE_DAYS: i64 = 7;

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A single cookie with the attributes the login flow uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Whether the cookie is at or past its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.map(|at| at <= now).unwrap_or(false)
    }
}

/// Page-scoped cookie jar.
pub struct CookieJar {
    cookies: RwLock<Vec<Cookie>>,
    path: PathBuf,
}

impl CookieJar {
    /// Open the jar backed by `dir/cookies.json`, or start empty.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join("cookies.json");
        let cookies = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        Self {
            cookies: RwLock::new(cookies),
            path,
        }
    }

    /// Set or replace a cookie by name, then persist.
    pub fn set(&self, cookie: Cookie) {
        {
            let mut cookies = self.cookies.write();
            cookies.retain(|c| c.name != cookie.name);
            cookies.push(cookie);
        }
        self.save();
    }

    /// Read a live cookie value by name. Expired cookies read as absent.
    pub fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        self.cookies
            .read()
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.clone())
    }

    /// Read a cookie record by name regardless of expiry.
    pub fn get_raw(&self, name: &str) -> Option<Cookie> {
        self.cookies.read().iter().find(|c| c.name == name).cloned()
    }

    /// Set the session cookie: path `/`, Secure, SameSite=Strict, 7-day expiry.
    pub fn set_auth_session(&self, token: &str) {
        self.set(Cookie {
            name: AUTH_COOKIE.to_string(),
            value: token.to_string(),
            path: "/".to_string(),
            secure: true,
            same_site: Some(SameSite::Strict),
            expires: Some(Utc::now() + Duration::days(AUTH_COOKIE_DAYS)),
        });
    }

    /// Expire the session cookie by rewriting it with an epoch expiry and
    /// an empty value.
    pub fn expire_auth_session(&self) {
        self.set(Cookie {
            name: AUTH_COOKIE.to_string(),
            value: String::new(),
            path: "/".to_string(),
            secure: false,
            same_site: None,
            expires: Some(DateTime::UNIX_EPOCH),
        });
    }

    fn save(&self) {
        let cookies = self.cookies.read();
        if let Ok(data) = serde_json::to_string_pretty(&*cookies) {
            if let Some(parent) = self.path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = std::fs::write(&self.path, data) {
                warn!("Failed to save cookies: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_jar() -> (CookieJar, TempDir) {
        let dir = TempDir::new().unwrap();
        let jar = CookieJar::open(dir.path());
        (jar, dir)
    }

    #[test]
    fn test_auth_session_attributes() {
        let (jar, _dir) = test_jar();

        jar.set_auth_session("dG9rZW4=");

        let cookie = jar.get_raw(AUTH_COOKIE).unwrap();
        assert_eq!(cookie.value, "dG9rZW4=");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, Some(SameSite::Strict));

        let expires = cookie.expires.unwrap();
        let lifetime = expires - Utc::now();
        assert!(lifetime > Duration::days(6) && lifetime <= Duration::days(7));

        assert_eq!(jar.get(AUTH_COOKIE).as_deref(), Some("dG9rZW4="));
    }

    #[test]
    fn test_expired_cookie_reads_as_absent() {
        let (jar, _dir) = test_jar();

        jar.set_auth_session("tok");
        jar.expire_auth_session();

        assert_eq!(jar.get(AUTH_COOKIE), None);

        // The record itself survives with an epoch expiry and empty value.
        let cookie = jar.get_raw(AUTH_COOKIE).unwrap();
        assert_eq!(cookie.value, "");
        assert_eq!(cookie.expires, Some(DateTime::UNIX_EPOCH));
    }

    #[test]
    fn test_set_replaces_by_name() {
        let (jar, _dir) = test_jar();

        jar.set_auth_session("first");
        jar.set_auth_session("second");

        assert_eq!(jar.get(AUTH_COOKIE).as_deref(), Some("second"));
        assert_eq!(jar.cookies.read().len(), 1);
    }

    #[test]
    fn test_reopen_preserves_cookies() {
        let dir = TempDir::new().unwrap();

        {
            let jar = CookieJar::open(dir.path());
            jar.set_auth_session("persisted");
        }

        let jar = CookieJar::open(dir.path());
        assert_eq!(jar.get(AUTH_COOKIE).as_deref(), Some("persisted"));
    }

    #[test]
    fn test_cookie_without_expiry_never_expires() {
        let (jar, _dir) = test_jar();

        jar.set(Cookie {
            name: "theme".to_string(),
            value: "dark".to_string(),
            path: "/".to_string(),
            secure: false,
            same_site: None,
            expires: None,
        });

        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
    }
}
