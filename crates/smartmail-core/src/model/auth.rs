//! Authentication responses.

use serde::{Deserialize, Serialize};

/// Response of the auth status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the backend holds valid credentials.
    pub authenticated: bool,
    /// Human-readable status.
    #[serde(default)]
    pub message: String,
}

impl AuthStatus {
    /// Creates a status response.
    #[must_use]
    pub fn new(authenticated: bool, message: impl Into<String>) -> Self {
        Self {
            authenticated,
            message: message.into(),
        }
    }
}

/// Response of the begin-login request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRedirect {
    /// Provider consent URL to send the browser to.
    #[serde(alias = "authorizationUrl")]
    pub authorization_url: String,
}

impl LoginRedirect {
    /// Creates a login redirect response.
    #[must_use]
    pub fn new(authorization_url: impl Into<String>) -> Self {
        Self {
            authorization_url: authorization_url.into(),
        }
    }
}

/// Acknowledgement of a logout request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutAck {
    /// Message from the backend (e.g., "No active session to log out from.").
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok` when the API is running.
    pub status: String,
    /// Free-form message.
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    /// Returns true if the backend reports itself healthy.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
