//! Commands the controllers ask the host to run, and the events it feeds back.

use crate::backend::BackendError;
use crate::model::{AuthStatus, EmailRecord, LoginRedirect, LogoutAck};
use crate::platform::TimerId;
use crate::request::RequestId;

/// A backend call to issue on behalf of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Query the auth status.
    QueryStatus(RequestId),
    /// Request an authorization URL.
    BeginLogin(RequestId),
    /// Request logout.
    Logout(RequestId),
    /// Fetch today's records.
    FetchRecords(RequestId),
}

impl Command {
    /// Returns the request id the completion must carry.
    #[must_use]
    pub const fn request(self) -> RequestId {
        match self {
            Self::QueryStatus(id)
            | Self::BeginLogin(id)
            | Self::Logout(id)
            | Self::FetchRecords(id) => id,
        }
    }
}

/// Something that happened outside the controllers.
#[derive(Debug)]
pub enum Event {
    /// Auth status query finished.
    StatusLoaded(RequestId, Result<AuthStatus, BackendError>),
    /// Begin-login request finished.
    LoginReady(RequestId, Result<LoginRedirect, BackendError>),
    /// Logout request finished.
    LoggedOut(RequestId, Result<LogoutAck, BackendError>),
    /// Records fetch finished.
    RecordsLoaded(RequestId, Result<Vec<EmailRecord>, BackendError>),
    /// A timer came due.
    Tick(TimerId),
}
