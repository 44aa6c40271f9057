//! Request and reply shapes on the extension message channel.

use serde::{Deserialize, Serialize};

use extauth_core::SessionState;

/// A request addressed to the Session Coordinator.
///
/// On the wire this is an `action`-tagged JSON object, exactly as the page
/// and content scripts send it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Record a completed page-side login.
    Login { username: String, token: String },
    /// Clear the session; optionally ask the host to reload afterwards.
    #[serde(rename_all = "camelCase")]
    Logout {
        previous_user: Option<String>,
        request_reload: bool,
    },
    /// Snapshot the in-memory session state.
    GetAuthState,
    /// Accepted for wire compatibility and acknowledged, but behaviorally
    /// inert: test mode is configuration, not a message.
    SetTestMode,
    /// Pass-through diagnostic echo.
    Log { text: String },
}

/// Reply to a [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Full state snapshot (`getAuthState`).
    State(SessionState),
    /// `{success}` acknowledgment (`login`, `logout`, `setTestMode`).
    Ack(Ack),
    /// `{received}` receipt (`log`).
    Log(LogReceipt),
}

impl Response {
    /// A `{success: true}` acknowledgment.
    pub fn success() -> Self {
        Self::Ack(Ack { success: true })
    }

    /// A `{received: true}` receipt.
    pub fn received() -> Self {
        Self::Log(LogReceipt { received: true })
    }
}

/// Command acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

/// Receipt for a diagnostic log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogReceipt {
    pub received: bool,
}
