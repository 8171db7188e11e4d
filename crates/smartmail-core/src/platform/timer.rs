//! One-shot timers.
//!
//! A [`Scheduler`] arms a timer and, once the delay has elapsed, the host
//! delivers the [`TimerId`] back to whoever armed it. Recurring timers are
//! built on top by re-arming the same id on every tick.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_TIMER: AtomicU64 = AtomicU64::new(1);

/// Identifies an armed timer. Unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Allocates the next id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_TIMER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Timer capability.
///
/// Arming an id that is already armed replaces the earlier deadline.
/// Cancelling an unknown id is a no-op.
pub trait Scheduler {
    /// Fires `timer` once after `delay`.
    fn after(&self, delay: Duration, timer: TimerId);

    /// Cancels `timer` if it has not fired yet.
    fn cancel(&self, timer: TimerId);
}

impl<T: Scheduler + ?Sized> Scheduler for Rc<T> {
    fn after(&self, delay: Duration, timer: TimerId) {
        (**self).after(delay, timer);
    }

    fn cancel(&self, timer: TimerId) {
        (**self).cancel(timer);
    }
}

impl<T: Scheduler + ?Sized> Scheduler for Arc<T> {
    fn after(&self, delay: Duration, timer: TimerId) {
        (**self).after(delay, timer);
    }

    fn cancel(&self, timer: TimerId) {
        (**self).cancel(timer);
    }
}

/// A scheduler driven by a virtual clock.
///
/// Time only moves when [`advance`](Self::advance) is called. Share it with
/// `Rc` to keep a handle for inspection.
///
/// # Example
///
/// ```
/// use smartmail_core::platform::{ManualScheduler, Scheduler, TimerId};
/// use std::time::Duration;
///
/// let scheduler = ManualScheduler::new();
/// let timer = TimerId::next();
/// scheduler.after(Duration::from_secs(5), timer);
///
/// assert!(scheduler.advance(Duration::from_secs(4)).is_empty());
/// assert_eq!(scheduler.advance(Duration::from_secs(1)), vec![timer]);
/// assert!(scheduler.active_timers().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ManualScheduler {
    inner: RefCell<ManualClock>,
}

#[derive(Debug, Default)]
struct ManualClock {
    now: Duration,
    deadlines: BTreeMap<TimerId, Duration>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler that can be shared with a controller.
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Returns the virtual time elapsed so far.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Moves the clock forward and returns the timers that came due, earliest first.
    ///
    /// Fired timers are disarmed. Each timer fires at most once per call, so
    /// recurring timers should be advanced one period at a time.
    pub fn advance(&self, by: Duration) -> Vec<TimerId> {
        let mut clock = self.inner.borrow_mut();
        clock.now += by;
        let now = clock.now;

        let mut due: Vec<(Duration, TimerId)> = clock
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&timer, &deadline)| (deadline, timer))
            .collect();
        due.sort();

        for (_, timer) in &due {
            clock.deadlines.remove(timer);
        }

        due.into_iter().map(|(_, timer)| timer).collect()
    }

    /// Returns timers already due without moving the clock.
    pub fn fire_due(&self) -> Vec<TimerId> {
        self.advance(Duration::ZERO)
    }

    /// Returns every armed timer.
    #[must_use]
    pub fn active_timers(&self) -> Vec<TimerId> {
        self.inner.borrow().deadlines.keys().copied().collect()
    }

    /// Returns the time left until `timer` fires.
    #[must_use]
    pub fn remaining(&self, timer: TimerId) -> Option<Duration> {
        let clock = self.inner.borrow();
        clock
            .deadlines
            .get(&timer)
            .map(|deadline| deadline.saturating_sub(clock.now))
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, timer: TimerId) {
        let mut clock = self.inner.borrow_mut();
        let deadline = clock.now + delay;
        clock.deadlines.insert(timer, deadline);
    }

    fn cancel(&self, timer: TimerId) {
        self.inner.borrow_mut().deadlines.remove(&timer);
    }
}
