//! Wire models exchanged with the backend.

mod auth;
mod record;

pub use auth::{AuthStatus, HealthStatus, LoginRedirect, LogoutAck};
pub use record::{EmailRecord, MessageDate, Priority};
