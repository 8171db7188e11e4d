//! Real timers and navigation for the terminal host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use smartmail_core::{Event, NavigationError, Navigator, Scheduler, TimerId, replace_query};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::{debug, info};
use url::Url;

/// Scheduler backed by tokio sleeps.
///
/// Each armed timer is a task that sleeps and then sends [`Event::Tick`]
/// into the host's event loop. Cancelling aborts the task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    events: UnboundedSender<Event>,
    timers: Arc<Mutex<HashMap<TimerId, AbortHandle>>>,
}

impl TokioScheduler {
    /// Creates a scheduler delivering ticks to `events`.
    #[must_use]
    pub fn new(events: UnboundedSender<Event>) -> Self {
        Self {
            events,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns how many timers are armed or have fired without being re-armed.
    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, timer: TimerId) {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The loop may already be gone during shutdown.
            let _ = events.send(Event::Tick(timer));
        });

        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = timers.insert(timer, task.abort_handle()) {
            previous.abort();
        }
    }

    fn cancel(&self, timer: TimerId) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timers.remove(&timer) {
            handle.abort();
            debug!(%timer, "Timer cancelled");
        }
    }
}

/// Navigator over a page address held in memory.
///
/// Top-level redirects open the target in the system browser.
#[derive(Debug, Clone)]
pub struct UrlNavigator {
    location: Url,
}

impl UrlNavigator {
    /// Creates a navigator at `location`.
    #[must_use]
    pub const fn new(location: Url) -> Self {
        Self { location }
    }

    /// Returns the current address.
    #[must_use]
    pub const fn location(&self) -> &Url {
        &self.location
    }
}

impl Navigator for UrlNavigator {
    fn query_params(&self) -> Vec<(String, String)> {
        self.location.query_pairs().into_owned().collect()
    }

    fn replace_query_params(&mut self, params: Vec<(String, String)>) {
        replace_query(&mut self.location, &params);
        debug!(location = %self.location, "Address updated");
    }

    fn navigate(&mut self, url: &Url) -> Result<(), NavigationError> {
        info!("Opening {} in the browser", url);
        opener::open(url.as_str()).map_err(|e| NavigationError::Open {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
