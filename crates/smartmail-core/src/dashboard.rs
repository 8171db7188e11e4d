//! Dashboard composition.
//!
//! Ties one [`SessionManager`] to a [`SyncScheduler`] that only exists while
//! the session believes the user is logged in. The host forwards user
//! [`Intent`]s and backend/timer [`Event`]s, runs the returned [`Command`]s
//! and renders [`Dashboard::snapshot`].

use tracing::{debug, info};

use crate::command::{Command, Event};
use crate::platform::{Navigator, Scheduler};
use crate::session::{SessionManager, SessionState};
use crate::sync::{RefreshInterval, SyncScheduler, SyncState};

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Sign in.
    Login,
    /// Sign out.
    Logout,
    /// Fetch today's records now.
    Refresh,
    /// Re-query the auth status.
    CheckStatus,
    /// Change the polling period.
    SetInterval(RefreshInterval),
}

/// Read-only copy of everything a view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    /// Session state.
    pub session: SessionState,
    /// Sync state, present while the sync scheduler is mounted.
    pub sync: Option<SyncState>,
    /// Configured polling period.
    pub interval: RefreshInterval,
}

/// Session plus (while authenticated) a polling sync scheduler.
#[derive(Debug)]
pub struct Dashboard<N: Navigator, S: Scheduler + Clone> {
    session: SessionManager<N>,
    sync: Option<SyncScheduler<S>>,
    scheduler: S,
    interval: RefreshInterval,
}

impl<N: Navigator, S: Scheduler + Clone> Dashboard<N, S> {
    /// Creates a dashboard. Nothing runs until [`mount`](Self::mount).
    #[must_use]
    pub fn new(navigator: N, scheduler: S, interval: RefreshInterval) -> Self {
        Self {
            session: SessionManager::new(navigator),
            sync: None,
            scheduler,
            interval,
        }
    }

    /// Mounts the session. Records are not fetched until it is authenticated.
    pub fn mount(&mut self) -> Vec<Command> {
        self.session.mount()
    }

    /// Returns the session manager.
    #[must_use]
    pub const fn session(&self) -> &SessionManager<N> {
        &self.session
    }

    /// Returns the mounted sync scheduler, if any.
    #[must_use]
    pub const fn sync(&self) -> Option<&SyncScheduler<S>> {
        self.sync.as_ref()
    }

    /// Returns the configured polling period.
    #[must_use]
    pub const fn interval(&self) -> RefreshInterval {
        self.interval
    }

    /// Forwards a user intent.
    pub fn dispatch(&mut self, intent: Intent) -> Vec<Command> {
        debug!(?intent, "Dispatching intent");
        match intent {
            Intent::Login => vec![self.session.login()],
            Intent::Logout => vec![self.session.logout()],
            Intent::CheckStatus => vec![self.session.check_status()],
            Intent::Refresh => self
                .sync
                .as_mut()
                .and_then(SyncScheduler::refresh_now)
                .into_iter()
                .collect(),
            Intent::SetInterval(interval) => {
                self.interval = interval;
                if let Some(sync) = self.sync.as_mut() {
                    sync.set_interval(interval);
                }
                Vec::new()
            }
        }
    }

    /// Applies a backend completion or timer tick.
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        let commands = match event {
            Event::StatusLoaded(id, result) => {
                self.session.status_loaded(id, result);
                Vec::new()
            }
            Event::LoginReady(id, result) => {
                self.session.login_ready(id, result);
                Vec::new()
            }
            Event::LoggedOut(id, result) => {
                self.session.logout_finished(id, result);
                Vec::new()
            }
            Event::RecordsLoaded(id, result) => {
                if let Some(sync) = self.sync.as_mut() {
                    sync.records_loaded(id, result);
                } else {
                    debug!(request = %id, "Dropping fetch result with no sync mounted");
                }
                Vec::new()
            }
            Event::Tick(timer) => self
                .sync
                .as_mut()
                .and_then(|sync| sync.on_tick(timer))
                .into_iter()
                .collect(),
        };

        self.reconcile();
        commands
    }

    /// Returns an owned copy of the renderable state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            session: self.session.state().clone(),
            sync: self.sync.as_ref().map(|sync| sync.state().clone()),
            interval: self.interval,
        }
    }

    /// Mounts or tears down the sync scheduler to follow the session.
    fn reconcile(&mut self) {
        let authenticated = self.session.state().authenticated;
        if authenticated && self.sync.is_none() {
            info!(interval = %self.interval, "Session authenticated, starting sync");
            let mut sync = SyncScheduler::new(self.scheduler.clone(), self.interval);
            sync.start(self.interval);
            self.sync = Some(sync);
        } else if !authenticated && let Some(mut sync) = self.sync.take() {
            info!("Session ended, stopping sync");
            sync.teardown();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{AuthStatus, LogoutAck};
    use crate::platform::{InMemoryNavigator, ManualScheduler};
    use std::rc::Rc;
    use url::Url;

    type TestDashboard = Dashboard<InMemoryNavigator, Rc<ManualScheduler>>;

    fn dashboard() -> (Rc<ManualScheduler>, TestDashboard) {
        let clock = ManualScheduler::shared();
        let navigator = InMemoryNavigator::new(Url::parse("http://localhost:5173/").unwrap());
        let dashboard = Dashboard::new(navigator, Rc::clone(&clock), RefreshInterval::DEFAULT);
        (clock, dashboard)
    }

    fn authenticate(dashboard: &mut TestDashboard) {
        let commands = dashboard.mount();
        for command in commands {
            dashboard.handle(Event::StatusLoaded(
                command.request(),
                Ok(AuthStatus::new(true, "Backend is authenticated.")),
            ));
        }
    }

    #[test]
    fn test_sync_mounts_on_authentication() {
        let (clock, mut dashboard) = dashboard();
        authenticate(&mut dashboard);

        let sync = dashboard.sync().unwrap();
        assert!(sync.is_running());
        assert_eq!(clock.active_timers(), vec![sync.timer().unwrap()]);
    }

    #[test]
    fn test_logout_tears_down_sync() {
        let (clock, mut dashboard) = dashboard();
        authenticate(&mut dashboard);

        let commands = dashboard.dispatch(Intent::Logout);
        dashboard.handle(Event::LoggedOut(commands[0].request(), Ok(LogoutAck::default())));

        assert!(dashboard.sync().is_none());
        assert!(dashboard.snapshot().sync.is_none());
        assert!(clock.active_timers().is_empty());
    }

    #[test]
    fn test_first_tick_fetches() {
        let (clock, mut dashboard) = dashboard();
        authenticate(&mut dashboard);

        let due = clock.fire_due();
        assert_eq!(due.len(), 1);
        let commands = dashboard.handle(Event::Tick(due[0]));
        assert!(matches!(commands.as_slice(), [Command::FetchRecords(_)]));
        assert!(dashboard.snapshot().sync.unwrap().loading);
    }

    #[test]
    fn test_refresh_without_sync_is_noop() {
        let (_clock, mut dashboard) = dashboard();
        dashboard.mount();
        assert!(dashboard.dispatch(Intent::Refresh).is_empty());
    }

    #[test]
    fn test_set_interval_without_sync_is_remembered() {
        let (clock, mut dashboard) = dashboard();
        let one_minute = RefreshInterval::from_millis(60_000).unwrap();
        dashboard.dispatch(Intent::SetInterval(one_minute));
        assert_eq!(dashboard.interval(), one_minute);

        authenticate(&mut dashboard);
        let timer = dashboard.sync().unwrap().timer().unwrap();
        assert_eq!(dashboard.snapshot().sync.unwrap().interval, one_minute);
        assert_eq!(clock.active_timers(), vec![timer]);
    }
}
