//! Page-local key-value storage, the `localStorage` analog.
//!
//! String keys to string values, persisted as one JSON file. Independent
//! of the coordinator's session store; the two are never reconciled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::warn;

/// Storage key for the string-encoded login flag ("true" or absent).
pub const KEY_IS_LOGGED_IN: &str = "isLoggedIn";
/// Storage key for the displayed username.
pub const KEY_CURRENT_USER: &str = "currentUser";
/// Storage key for the encoded auth token.
pub const KEY_AUTH_TOKEN: &str = "auth_token";

/// String key-value storage scoped to one page.
pub struct LocalStorage {
    entries: RwLock<HashMap<String, String>>,
    path: PathBuf,
}

impl LocalStorage {
    /// Open storage backed by `dir/local-storage.json`, or start empty.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join("local-storage.json");
        let entries = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
            Err(_) => HashMap::new(),
        };
        Self {
            entries: RwLock::new(entries),
            path,
        }
    }

    /// Read an item. Missing keys read as `None`.
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Write an item and persist.
    pub fn set_item(&self, key: &str, value: &str) {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        self.save();
    }

    /// Remove an item and persist. Removing a missing key is a no-op.
    pub fn remove_item(&self, key: &str) {
        self.entries.write().remove(key);
        self.save();
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn save(&self) {
        let entries = self.entries.read();
        if let Ok(data) = serde_json::to_string_pretty(&*entries) {
            if let Some(parent) = self.path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = std::fs::write(&self.path, data) {
                warn!("Failed to save local storage: {}", e);
            }
        }
    }
}
