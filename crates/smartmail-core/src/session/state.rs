//! Session state.

use crate::error::Error;
use crate::model::AuthStatus;

/// Where the session state machine stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Initial status query outstanding.
    #[default]
    Checking,
    /// Backend has no valid credentials.
    Unauthenticated,
    /// Login requested; the browser is about to leave the page.
    Authenticating,
    /// Backend has valid credentials.
    Authenticated,
    /// The last operation failed; `message` says why.
    Error,
}

/// The client's belief about the session.
///
/// `phase == Authenticated` implies `authenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Whether the user is believed to be logged in.
    pub authenticated: bool,
    /// Human-readable status or error.
    pub message: String,
    /// State machine phase.
    pub phase: SessionPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::checking()
    }
}

impl SessionState {
    /// State right after construction.
    #[must_use]
    pub fn checking() -> Self {
        Self {
            authenticated: false,
            message: "Checking authentication status...".to_string(),
            phase: SessionPhase::Checking,
        }
    }

    /// State derived from a status response and nothing else.
    #[must_use]
    pub fn from_status(status: &AuthStatus) -> Self {
        Self {
            authenticated: status.authenticated,
            message: status.message.clone(),
            phase: if status.authenticated {
                SessionPhase::Authenticated
            } else {
                SessionPhase::Unauthenticated
            },
        }
    }

    /// State after a successful logout.
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            authenticated: false,
            message: "Logged out successfully.".to_string(),
            phase: SessionPhase::Unauthenticated,
        }
    }

    /// State after a failed operation.
    #[must_use]
    pub fn failed(error: &Error, authenticated: bool) -> Self {
        Self {
            authenticated,
            message: error.to_string(),
            phase: SessionPhase::Error,
        }
    }

    /// Returns true when the phase is `Authenticated`.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}
