//! Sync scheduler.
//!
//! Keeps today's records fresh by polling on a recurring timer. Ticks fire
//! at a fixed cadence regardless of how long a fetch takes, so fetches may
//! overlap. Completions are applied in issue order and a completion older
//! than one already applied is dropped, which keeps the final state equal
//! to the newest response.
//!
//! The active timer is owned like any other resource: it is released by
//! [`SyncScheduler::stop`], by an interval change, by
//! [`SyncScheduler::teardown`] and when the scheduler is dropped.

mod state;

pub use state::{RefreshInterval, SyncState};

use tracing::{debug, info, warn};

use crate::backend::BackendResult;
use crate::command::Command;
use crate::error::Error;
use crate::model::EmailRecord;
use crate::platform::{Scheduler, TimerId};
use crate::request::{RequestId, RequestTracker};

/// Polling controller for today's records.
#[derive(Debug)]
pub struct SyncScheduler<S: Scheduler> {
    state: SyncState,
    scheduler: S,
    timer: Option<TimerId>,
    requests: RequestTracker,
    torn_down: bool,
}

impl<S: Scheduler> SyncScheduler<S> {
    /// Creates an idle scheduler with empty records.
    #[must_use]
    pub fn new(scheduler: S, interval: RefreshInterval) -> Self {
        Self {
            state: SyncState::new(interval),
            scheduler,
            timer: None,
            requests: RequestTracker::new(),
            torn_down: false,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SyncState {
        &self.state
    }

    /// Returns the active timer, if polling.
    #[must_use]
    pub const fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Returns true while a timer is active.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Starts polling every `interval`, with a first tick due immediately.
    ///
    /// Any timer already running is cancelled first. Returns the handle to
    /// pass to [`stop`](Self::stop).
    pub fn start(&mut self, interval: RefreshInterval) -> Option<TimerId> {
        if self.torn_down {
            return None;
        }
        self.release_timer();

        let timer = TimerId::next();
        self.state.interval = interval;
        self.scheduler.after(std::time::Duration::ZERO, timer);
        self.timer = Some(timer);
        info!(%timer, %interval, "Polling started");
        Some(timer)
    }

    /// Cancels polling. A fetch already in flight is still applied.
    ///
    /// A handle that is not the active timer is ignored.
    pub fn stop(&mut self, timer: TimerId) {
        if self.timer == Some(timer) {
            self.release_timer();
            info!(%timer, "Polling stopped");
        }
    }

    /// Changes the polling period.
    ///
    /// While running, the old timer is cancelled and a new one started in the
    /// same call, so there is never zero or two timers. Returns the new handle.
    pub fn set_interval(&mut self, interval: RefreshInterval) -> Option<TimerId> {
        if self.is_running() {
            self.start(interval)
        } else {
            self.state.interval = interval;
            None
        }
    }

    /// Handles a timer tick: re-arms the timer and fetches.
    ///
    /// Ticks from anything but the active timer are ignored.
    pub fn on_tick(&mut self, timer: TimerId) -> Option<Command> {
        if self.torn_down || self.timer != Some(timer) {
            debug!(%timer, "Ignoring tick from inactive timer");
            return None;
        }

        self.scheduler.after(self.state.interval.as_duration(), timer);
        self.refresh_now()
    }

    /// Fetches now. `None` after teardown.
    pub fn refresh_now(&mut self) -> Option<Command> {
        if self.torn_down {
            return None;
        }

        let id = self.requests.issue();
        self.state.error = None;
        self.state.loading = true;
        debug!(request = %id, "Fetching today's records");
        Some(Command::FetchRecords(id))
    }

    /// Applies a fetch completion.
    ///
    /// Success replaces the records wholesale. Failure keeps the previous
    /// records and sets the error. Stale completions and anything arriving
    /// after teardown are dropped.
    pub fn records_loaded(&mut self, id: RequestId, result: BackendResult<Vec<EmailRecord>>) {
        if self.torn_down {
            debug!(request = %id, "Dropping fetch result after teardown");
            return;
        }

        if self.requests.settle(id) {
            match result {
                Ok(records) => {
                    info!(request = %id, count = records.len(), "Records refreshed");
                    self.state.records = records;
                    self.state.error = None;
                }
                Err(e) => {
                    warn!(request = %id, error = %e, "Record fetch failed, keeping old records");
                    self.state.error = Some(Error::RecordFetchFailed.to_string());
                }
            }
        } else {
            debug!(request = %id, "Discarding stale fetch result");
        }

        self.state.loading = self.requests.is_loading();
    }

    /// Stops polling and ignores every later completion or tick.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.release_timer();
        self.requests.clear();
        self.state.loading = false;
        self.torn_down = true;
        debug!("Sync scheduler torn down");
    }

    fn release_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.scheduler.cancel(timer);
        }
    }
}

impl<S: Scheduler> Drop for SyncScheduler<S> {
    fn drop(&mut self) {
        self.release_timer();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::model::{MessageDate, Priority};
    use crate::platform::ManualScheduler;
    use std::rc::Rc;
    use std::time::Duration;

    fn record(id: &str) -> EmailRecord {
        EmailRecord {
            id: id.to_string(),
            sender: "alice@example.com".to_string(),
            subject: format!("Subject {id}"),
            date: MessageDate::parse("Fri, 8 Aug 2025 09:00:00 +0000"),
            summary: String::new(),
            replied: false,
            draft_reply: String::new(),
            priority: Priority::Low,
            thread_id: format!("t-{id}"),
        }
    }

    fn offline() -> BackendError {
        BackendError::Unavailable("connection refused".into())
    }

    fn fetch_id(command: Option<Command>) -> RequestId {
        match command {
            Some(Command::FetchRecords(id)) => id,
            other => panic!("expected a fetch, got {other:?}"),
        }
    }

    fn scheduler() -> (Rc<ManualScheduler>, SyncScheduler<Rc<ManualScheduler>>) {
        let clock = ManualScheduler::shared();
        let sync = SyncScheduler::new(Rc::clone(&clock), RefreshInterval::DEFAULT);
        (clock, sync)
    }

    #[test]
    fn test_refresh_replaces_records() {
        let (_clock, mut sync) = scheduler();
        let id = fetch_id(sync.refresh_now());
        assert!(sync.state().loading);
        assert!(sync.state().error.is_none());

        sync.records_loaded(id, Ok(vec![record("a"), record("b")]));
        assert!(!sync.state().loading);
        assert_eq!(sync.state().records.len(), 2);

        let id = fetch_id(sync.refresh_now());
        sync.records_loaded(id, Ok(vec![record("c")]));
        assert_eq!(sync.state().records, vec![record("c")]);
    }

    #[test]
    fn test_failure_keeps_stale_records() {
        let (_clock, mut sync) = scheduler();
        let id = fetch_id(sync.refresh_now());
        sync.records_loaded(id, Ok(vec![record("a"), record("b")]));

        let id = fetch_id(sync.refresh_now());
        sync.records_loaded(id, Err(offline()));
        assert_eq!(sync.state().records.len(), 2);
        assert_eq!(sync.state().error.as_deref(), Some("Failed to process emails."));
        assert!(!sync.state().loading);

        let id = fetch_id(sync.refresh_now());
        assert!(sync.state().error.is_none());
        sync.records_loaded(id, Ok(vec![record("z")]));
        assert_eq!(sync.state().records, vec![record("z")]);
        assert!(sync.state().error.is_none());
    }

    #[test]
    fn test_late_older_response_is_discarded() {
        let (_clock, mut sync) = scheduler();
        let first = fetch_id(sync.refresh_now());
        let second = fetch_id(sync.refresh_now());

        sync.records_loaded(second, Ok(vec![record("new")]));
        assert!(!sync.state().loading);
        sync.records_loaded(first, Ok(vec![record("old")]));

        assert_eq!(sync.state().records, vec![record("new")]);
        assert!(!sync.state().loading);
    }

    #[test]
    fn test_late_older_failure_is_discarded() {
        let (_clock, mut sync) = scheduler();
        let first = fetch_id(sync.refresh_now());
        let second = fetch_id(sync.refresh_now());

        sync.records_loaded(second, Ok(vec![record("new")]));
        sync.records_loaded(first, Err(offline()));

        assert!(sync.state().error.is_none());
        assert_eq!(sync.state().records, vec![record("new")]);
    }

    #[test]
    fn test_loading_until_newest_settles() {
        let (_clock, mut sync) = scheduler();
        let first = fetch_id(sync.refresh_now());
        let second = fetch_id(sync.refresh_now());

        sync.records_loaded(first, Ok(vec![record("old")]));
        assert!(sync.state().loading);
        assert_eq!(sync.state().records, vec![record("old")]);

        sync.records_loaded(second, Ok(vec![record("new")]));
        assert!(!sync.state().loading);
        assert_eq!(sync.state().records, vec![record("new")]);
    }

    #[test]
    fn test_start_fires_immediately_then_every_period() {
        let (clock, mut sync) = scheduler();
        let timer = sync.start(RefreshInterval::DEFAULT).unwrap();

        assert_eq!(clock.fire_due(), vec![timer]);
        assert!(sync.on_tick(timer).is_some());

        assert!(clock.advance(Duration::from_secs(299)).is_empty());
        assert_eq!(clock.advance(Duration::from_secs(1)), vec![timer]);
        assert!(sync.on_tick(timer).is_some());
        assert_eq!(clock.active_timers(), vec![timer]);
    }

    #[test]
    fn test_stop_cancels_timer() {
        let (clock, mut sync) = scheduler();
        let timer = sync.start(RefreshInterval::DEFAULT).unwrap();
        sync.stop(timer);

        assert!(!sync.is_running());
        assert!(clock.active_timers().is_empty());
        assert!(sync.on_tick(timer).is_none());
    }

    #[test]
    fn test_stop_with_foreign_handle_is_ignored() {
        let (clock, mut sync) = scheduler();
        let timer = sync.start(RefreshInterval::DEFAULT).unwrap();
        sync.stop(TimerId::next());

        assert_eq!(sync.timer(), Some(timer));
        assert_eq!(clock.active_timers(), vec![timer]);
    }

    #[test]
    fn test_set_interval_swaps_single_timer() {
        let (clock, mut sync) = scheduler();
        let old = sync.start(RefreshInterval::DEFAULT).unwrap();
        let first = clock.fire_due();
        assert_eq!(first, vec![old]);
        sync.on_tick(old);

        let one_minute = RefreshInterval::from_millis(60_000).unwrap();
        let new = sync.set_interval(one_minute).unwrap();

        assert_ne!(old, new);
        assert_eq!(clock.active_timers(), vec![new]);
        assert!(sync.on_tick(old).is_none());

        assert_eq!(clock.fire_due(), vec![new]);
        sync.on_tick(new);
        assert_eq!(clock.remaining(new), Some(Duration::from_secs(60)));
        assert_eq!(clock.advance(Duration::from_secs(60)), vec![new]);
        assert_eq!(clock.active_timers(), Vec::<TimerId>::new());
        sync.on_tick(new);
        assert_eq!(clock.active_timers(), vec![new]);
    }

    #[test]
    fn test_set_interval_while_idle_only_records() {
        let (clock, mut sync) = scheduler();
        let one_minute = RefreshInterval::from_millis(60_000).unwrap();

        assert!(sync.set_interval(one_minute).is_none());
        assert_eq!(sync.state().interval, one_minute);
        assert!(clock.active_timers().is_empty());
    }

    #[test]
    fn test_teardown_makes_late_results_noop() {
        let (clock, mut sync) = scheduler();
        let timer = sync.start(RefreshInterval::DEFAULT).unwrap();
        clock.fire_due();
        let id = fetch_id(sync.on_tick(timer));

        sync.teardown();
        assert!(clock.active_timers().is_empty());

        sync.records_loaded(id, Ok(vec![record("late")]));
        assert!(sync.state().records.is_empty());
        assert!(sync.refresh_now().is_none());
        assert!(sync.start(RefreshInterval::DEFAULT).is_none());
    }

    #[test]
    fn test_drop_releases_timer() {
        let clock = ManualScheduler::shared();
        {
            let mut sync = SyncScheduler::new(Rc::clone(&clock), RefreshInterval::DEFAULT);
            sync.start(RefreshInterval::DEFAULT);
            assert_eq!(clock.active_timers().len(), 1);
        }
        assert!(clock.active_timers().is_empty());
    }
}
