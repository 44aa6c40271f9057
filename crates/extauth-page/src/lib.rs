//! Login page agent and its local auth record.
//!
//! Everything here is page-scoped: local storage, the cookie jar, the
//! window URL, and the UI state machine. The coordinator's session store
//! is a different authority; the page only talks to it by message.

pub mod agent;
pub mod cookies;
pub mod storage;
pub mod ui;
pub mod window;

pub use agent::{AuthCheck, LocalAuthRecord, PageAgent};
pub use cookies::{Cookie, CookieJar, SameSite, AUTH_COOKIE};
pub use storage::{LocalStorage, KEY_AUTH_TOKEN, KEY_CURRENT_USER, KEY_IS_LOGGED_IN};
pub use ui::UiState;
pub use window::{PageWindow, LOGOUT_PARAM};
