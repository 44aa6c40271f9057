//! Canonical login session state.

use serde::{Deserialize, Serialize};

/// Login state held by the Session Coordinator and mirrored to the session
/// store.
///
/// `username` and `token` are both present exactly when `is_logged_in` is
/// true; all three fields clear together on logout. The wire shape keeps
/// explicit nulls because clients check `isLoggedIn` on a full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_logged_in: bool,
    pub username: Option<String>,
    pub token: Option<String>,
}

impl SessionState {
    /// Logged-out state with all fields cleared.
    pub fn logged_out() -> Self {
        Self {
            is_logged_in: false,
            username: None,
            token: None,
        }
    }

    /// Logged-in state for the given identity.
    pub fn logged_in(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            is_logged_in: true,
            username: Some(username.into()),
            token: Some(token.into()),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::logged_out()
    }
}
