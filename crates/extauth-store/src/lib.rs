//! SQLite-backed persistent session record.

pub mod sqlite;

pub use sqlite::{SessionStore, KEY_IS_LOGGED_IN, KEY_TOKEN, KEY_USERNAME};
