//! # smartmail-core
//!
//! Session and synchronization controllers for the smartmail client.
//!
//! This crate provides:
//! - **Session Manager** - authentication status, login/logout and the
//!   `OAuth2` callback handshake
//! - **Sync Scheduler** - recurring fetch of today's emails with overlap-safe
//!   result application
//! - **Dashboard** - composes both the way the client's main view does
//! - **Backend** - the collaborator contract and its HTTP implementation
//! - **Platform** - navigation and timer capabilities, with in-memory fakes
//!
//! Controllers never perform I/O. Each operation updates owned state and
//! returns [`Command`]s; the host runs them and feeds the outcome back as an
//! [`Event`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod command;
pub mod dashboard;
mod error;
pub mod model;
pub mod platform;
pub mod request;
pub mod session;
pub mod sync;

pub use backend::{Backend, BackendError, BackendResult, HttpBackend, HttpSettings, execute};
pub use command::{Command, Event};
pub use dashboard::{Dashboard, DashboardSnapshot, Intent};
pub use error::{Error, Result};
pub use model::{
    AuthStatus, EmailRecord, HealthStatus, LoginRedirect, LogoutAck, MessageDate, Priority,
};
pub use platform::{
    InMemoryNavigator, ManualScheduler, NavigationError, Navigator, Scheduler, TimerId,
    replace_query,
};
pub use request::{RequestId, RequestTracker};
pub use session::{SessionManager, SessionPhase, SessionState};
pub use sync::{RefreshInterval, SyncScheduler, SyncState};
