//! Error types for redirect handling.

/// Result type alias for redirect handling.
pub type Result<T> = std::result::Result<T, Error>;

/// Redirect handling errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    /// The authorization URL cannot be used for a top-level redirect.
    #[error("Invalid authorization URL: {0}")]
    InvalidRedirect(String),
}

impl Error {
    /// Creates an invalid redirect error.
    #[must_use]
    pub fn invalid_redirect(reason: impl Into<String>) -> Self {
        Self::InvalidRedirect(reason.into())
    }
}
