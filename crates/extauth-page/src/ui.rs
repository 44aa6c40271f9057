//! Login page UI state machine.
//!
//! The observable surface of the page: which form shows, the status line,
//! its CSS class, and the user display slot. Transitions are driven only
//! by the agent; the page is single-threaded so no concurrent transitions
//! are possible.

/// Observable login page states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    /// No one logged in. Remembers who just logged out, if anyone.
    LoggedOut { previous_user: Option<String> },
    /// Credentials submitted, waiting on authentication.
    LoggingIn,
    /// Logged in as the named user.
    LoggedIn { username: String },
}

impl Default for UiState {
    fn default() -> Self {
        UiState::LoggedOut {
            previous_user: None,
        }
    }
}

impl UiState {
    /// Status line shown to the user.
    pub fn status_message(&self) -> String {
        match self {
            UiState::LoggedOut {
                previous_user: Some(user),
            } => format!("User {} logged out", user),
            UiState::LoggedOut {
                previous_user: None,
            } => "Please log in".to_string(),
            UiState::LoggingIn => "Logging in...".to_string(),
            UiState::LoggedIn { .. } => "Successfully logged in!".to_string(),
        }
    }

    /// CSS class on the status element.
    pub fn status_class(&self) -> &'static str {
        match self {
            UiState::LoggedOut { .. } => "status logged-out",
            UiState::LoggingIn => "status",
            UiState::LoggedIn { .. } => "status logged-in",
        }
    }

    /// Name shown in the user display slot.
    pub fn user_display(&self) -> Option<&str> {
        match self {
            UiState::LoggedIn { username } => Some(username),
            _ => None,
        }
    }

    /// Whether the login form is visible (the logout form shows otherwise).
    pub fn login_form_visible(&self) -> bool {
        !matches!(self, UiState::LoggedIn { .. })
    }
}
