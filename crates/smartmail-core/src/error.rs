//! Error types for the controllers.
//!
//! Every variant is non-fatal: controllers capture it into their state and
//! the `Display` text is exactly what the view shows.

use thiserror::Error;

/// Errors surfaced by the session and sync controllers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The auth status query failed.
    #[error("Failed to check authentication status.")]
    StatusCheckFailed,

    /// The authorization URL could not be obtained or opened.
    #[error("Failed to initiate Google login.")]
    LoginInitiationFailed,

    /// The logout request failed.
    #[error("Failed to logout.")]
    LogoutFailed,

    /// The provider redirected back with an error code.
    #[error("OAuth Error: {0}")]
    CallbackError(String),

    /// Fetching today's records failed.
    #[error("Failed to process emails.")]
    RecordFetchFailed,

    /// Refresh interval out of range.
    #[error("Refresh interval must be greater than zero (got {0} ms)")]
    InvalidInterval(u64),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
