//! SQLite-backed session record with `chrome.storage.local` semantics.
//!
//! A single key-value table holding JSON-encoded values. The Session
//! Coordinator is the only writer; all access is last-write-wins with no
//! version check.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use extauth_core::{Error, Result, SessionState};

/// Store key for the logged-in flag.
pub const KEY_IS_LOGGED_IN: &str = "isLoggedIn";
/// Store key for the logged-in username.
pub const KEY_USERNAME: &str = "username";
/// Store key for the issued token.
pub const KEY_TOKEN: &str = "token";

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

/// SQLite store holding the persisted session record.
pub struct SessionStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SessionStore {
    /// Open or create the session store.
    ///
    /// `db_dir` is the directory (e.g., `profile/session/`). The file will be `db_dir/session.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("session.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let key_count = store.count_keys()?;
        info!(
            "SessionStore initialized: {} keys, path={}",
            key_count,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path)
            .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Raw key-value access
    // ---------------------------------------------------------------

    /// Read a raw value by key. Missing keys read as `None`.
    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn.lock();
        let raw: Option<String> = conn
            .prepare_cached("SELECT value FROM kv WHERE key = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Write a raw value under a key. Last write wins.
    pub fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![key, value.to_string()])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a set of keys under a single lock, so no reader sees a
    /// half-removed record from another store handle.
    pub fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("DELETE FROM kv WHERE key = ?1")
            .map_err(|e| Error::Database(e.to_string()))?;
        for key in keys {
            stmt.execute(params![key])
                .map_err(|e| Error::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Count stored keys.
    pub fn count_keys(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Session record
    // ---------------------------------------------------------------

    /// Persist a logged-in session: the three keys written under one lock.
    pub fn save_session(&self, username: &str, token: &str) -> Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")
            .map_err(|e| Error::Database(e.to_string()))?;
        for (key, value) in [
            (KEY_IS_LOGGED_IN, serde_json::Value::Bool(true)),
            (KEY_USERNAME, serde_json::Value::String(username.to_string())),
            (KEY_TOKEN, serde_json::Value::String(token.to_string())),
        ] {
            stmt.execute(params![key, value.to_string()])
                .map_err(|e| Error::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Restore the persisted session, if any.
    ///
    /// Whatever was last persisted is trusted as-is; there is no freshness
    /// or signature check. A login flag without both identity fields is an
    /// interrupted write and restores as logged out.
    pub fn load_session(&self) -> Result<SessionState> {
        let logged_in = matches!(
            self.get(KEY_IS_LOGGED_IN)?,
            Some(serde_json::Value::Bool(true))
        );
        if !logged_in {
            return Ok(SessionState::logged_out());
        }

        let username = self.get_string(KEY_USERNAME)?;
        let token = self.get_string(KEY_TOKEN)?;
        match (username, token) {
            (Some(username), Some(token)) => Ok(SessionState::logged_in(username, token)),
            _ => {
                warn!("Login flag persisted without username/token; restoring as logged out");
                Ok(SessionState::logged_out())
            }
        }
    }

    /// Delete the persisted session keys as a unit.
    pub fn clear_session(&self) -> Result<()> {
        self.remove_many(&[KEY_IS_LOGGED_IN, KEY_USERNAME, KEY_TOKEN])
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .get(key)?
            .and_then(|v| v.as_str().map(|s| s.to_string())))
    }
}
