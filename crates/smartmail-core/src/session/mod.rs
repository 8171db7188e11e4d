//! Session manager.
//!
//! Owns the client's belief about authentication and drives the
//! authorization-code handshake from the page's side:
//!
//! ```text
//! Checking ──status──▶ Unauthenticated ──login()──▶ Authenticating ──▶ (browser leaves)
//!    │                        ▲
//!    └──status──▶ Authenticated ──logout()──┘
//!
//! any operation ──failure──▶ Error   (recovered only by a new check/login/logout)
//! ```
//!
//! After the provider redirects back, a fresh manager starts in `Checking`
//! and [`SessionManager::mount`] picks up the `code`/`error` parameters.
//!
//! Status responses are applied in issue order. Login and logout completions
//! are always applied and make every status query issued before them stale;
//! status queries issued after them are unaffected.

mod state;

pub use state::{SessionPhase, SessionState};

use std::collections::BTreeSet;

use smartmail_oauth::{
    AuthorizationRedirect, CallbackOutcome, CallbackParams, retain_non_callback,
};
use tracing::{debug, info, warn};

use crate::backend::BackendResult;
use crate::command::Command;
use crate::error::Error;
use crate::model::{AuthStatus, LoginRedirect, LogoutAck};
use crate::platform::Navigator;
use crate::request::{RequestId, RequestTracker};

/// Authentication state machine.
#[derive(Debug)]
pub struct SessionManager<N: Navigator> {
    state: SessionState,
    navigator: N,
    status: RequestTracker,
    actions: BTreeSet<RequestId>,
    mounted: bool,
}

impl<N: Navigator> SessionManager<N> {
    /// Creates a manager in `Checking`.
    #[must_use]
    pub fn new(navigator: N) -> Self {
        Self {
            state: SessionState::checking(),
            navigator,
            status: RequestTracker::new(),
            actions: BTreeSet::new(),
            mounted: false,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the navigator.
    #[must_use]
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Returns true while a login, a logout or a live status query is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.actions.is_empty() || self.status.is_loading()
    }

    /// Runs the initial status check, then consumes any callback in the address.
    ///
    /// Only the first call does anything.
    pub fn mount(&mut self) -> Vec<Command> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;

        let mut commands = vec![self.check_status()];
        let params = CallbackParams::from_pairs(self.navigator.query_params());
        commands.extend(self.consume_callback(&params));
        commands
    }

    /// Queries the auth status. Safe to call repeatedly.
    pub fn check_status(&mut self) -> Command {
        let id = self.status.issue();
        debug!(request = %id, "Checking authentication status");
        Command::QueryStatus(id)
    }

    /// Handles authorization response parameters found in the address.
    ///
    /// With a `code`, the parameters are cleared from the address and the
    /// status is queried again (the backend has already exchanged the code).
    /// With an `error`, the parameters are cleared and the session moves to
    /// `Error`; status queries still in flight are discarded.
    pub fn consume_callback(&mut self, params: &CallbackParams) -> Option<Command> {
        match params.outcome() {
            CallbackOutcome::None => None,
            CallbackOutcome::Code { .. } => {
                info!("Authorization code received, re-checking status");
                self.clear_callback_params();
                Some(self.check_status())
            }
            CallbackOutcome::Error(err) => {
                warn!(
                    code = %err.code,
                    description = ?err.description,
                    "Provider redirected back with an error"
                );
                self.clear_callback_params();
                self.status.supersede();
                self.state = SessionState::failed(&Error::CallbackError(err.to_string()), false);
                None
            }
        }
    }

    /// Requests an authorization URL. The redirect happens when it arrives.
    ///
    /// The phase becomes `Authenticating`; `authenticated` is left unchanged,
    /// so a signed-in user who starts a new login stays signed in until the
    /// browser leaves or the request fails.
    pub fn login(&mut self) -> Command {
        let id = self.issue_action();
        debug!(request = %id, "Requesting authorization URL");
        self.state.phase = SessionPhase::Authenticating;
        self.state.message = "Redirecting to sign-in...".to_string();
        Command::BeginLogin(id)
    }

    /// Requests logout.
    pub fn logout(&mut self) -> Command {
        let id = self.issue_action();
        debug!(request = %id, "Requesting logout");
        Command::Logout(id)
    }

    /// Applies a status response.
    pub fn status_loaded(&mut self, id: RequestId, result: BackendResult<AuthStatus>) {
        if !self.status.settle(id) {
            debug!(request = %id, "Discarding stale status response");
            return;
        }

        self.state = match result {
            Ok(status) => {
                debug!(authenticated = status.authenticated, "Status received");
                SessionState::from_status(&status)
            }
            Err(e) => {
                warn!(error = %e, "Status check failed");
                SessionState::failed(&Error::StatusCheckFailed, false)
            }
        };
    }

    /// Navigates to the authorization URL, or fails without navigating.
    pub fn login_ready(&mut self, id: RequestId, result: BackendResult<LoginRedirect>) {
        if !self.settle_action(id) {
            debug!(request = %id, "Ignoring unknown login response");
            return;
        }

        let navigator = &mut self.navigator;
        let outcome = result
            .map_err(|e| e.to_string())
            .and_then(|redirect| {
                AuthorizationRedirect::parse(&redirect.authorization_url)
                    .map_err(|e| e.to_string())
            })
            .and_then(|target| {
                navigator
                    .navigate(target.url())
                    .map(|()| target)
                    .map_err(|e| e.to_string())
            });

        match outcome {
            Ok(target) => info!(host = target.host(), "Redirecting to identity provider"),
            Err(reason) => {
                warn!(%reason, "Failed to initiate login");
                self.state =
                    SessionState::failed(&Error::LoginInitiationFailed, self.state.authenticated);
            }
        }
    }

    /// Applies a logout response.
    ///
    /// Success is trusted as-is: the state becomes `Unauthenticated` without
    /// re-querying the status.
    pub fn logout_finished(&mut self, id: RequestId, result: BackendResult<LogoutAck>) {
        if !self.settle_action(id) {
            debug!(request = %id, "Ignoring unknown logout response");
            return;
        }

        match result {
            Ok(ack) => {
                info!(backend_message = ?ack.message, "Logged out");
                self.state = SessionState::logged_out();
            }
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.state = SessionState::failed(&Error::LogoutFailed, self.state.authenticated);
            }
        }
    }

    fn issue_action(&mut self) -> RequestId {
        let id = RequestId::next();
        self.actions.insert(id);
        id
    }

    /// Settles a login/logout completion. Status queries issued before it
    /// can no longer override its outcome.
    fn settle_action(&mut self, id: RequestId) -> bool {
        if !self.actions.remove(&id) {
            return false;
        }
        self.status.supersede_before(id);
        true
    }

    fn clear_callback_params(&mut self) {
        let retained = retain_non_callback(self.navigator.query_params());
        self.navigator.replace_query_params(retained);
    }
}
