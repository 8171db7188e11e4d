//! Backend collaborator.
//!
//! The controllers know the backend only through [`Backend`]: four logical
//! operations plus a health probe. How they are fulfilled (token exchange,
//! summarisation, reply drafting) is not their concern.

mod http;

use std::future::Future;

pub use http::{HttpBackend, HttpSettings};

use crate::command::{Command, Event};
use crate::model::{AuthStatus, EmailRecord, HealthStatus, LoginRedirect, LogoutAck};

/// Errors from talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport, timeout or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code.
    #[error("Backend returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        detail: String,
    },

    /// Malformed JSON body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Backend cannot be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// The remote service the controllers talk to.
pub trait Backend: Send + Sync {
    /// Returns whether the backend holds valid credentials.
    fn auth_status(&self) -> impl Future<Output = BackendResult<AuthStatus>> + Send;

    /// Returns the provider consent URL.
    fn begin_login(&self) -> impl Future<Output = BackendResult<LoginRedirect>> + Send;

    /// Revokes and forgets the backend's credentials.
    fn logout(&self) -> impl Future<Output = BackendResult<LogoutAck>> + Send;

    /// Returns today's processed records, in display order.
    fn todays_emails(&self) -> impl Future<Output = BackendResult<Vec<EmailRecord>>> + Send;

    /// Probes whether the API is running.
    fn health(&self) -> impl Future<Output = BackendResult<HealthStatus>> + Send;
}

/// Runs one command against `backend` and wraps the outcome as an event.
pub async fn execute<B: Backend>(backend: &B, command: Command) -> Event {
    match command {
        Command::QueryStatus(id) => Event::StatusLoaded(id, backend.auth_status().await),
        Command::BeginLogin(id) => Event::LoginReady(id, backend.begin_login().await),
        Command::Logout(id) => Event::LoggedOut(id, backend.logout().await),
        Command::FetchRecords(id) => Event::RecordsLoaded(id, backend.todays_emails().await),
    }
}
