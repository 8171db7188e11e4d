//! Sync state and refresh interval.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::EmailRecord;

/// Polling period. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    /// Five minutes.
    pub const DEFAULT: Self = Self(300_000);

    /// Creates an interval from milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInterval`] for zero.
    pub const fn from_millis(ms: u64) -> Result<Self> {
        if ms == 0 {
            return Err(Error::InvalidInterval(ms));
        }
        Ok(Self(ms))
    }

    /// Returns the interval in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns the interval as a duration.
    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u64> for RefreshInterval {
    type Error = Error;

    fn try_from(ms: u64) -> Result<Self> {
        Self::from_millis(ms)
    }
}

impl From<RefreshInterval> for u64 {
    fn from(interval: RefreshInterval) -> Self {
        interval.0
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0;
        if ms % 60_000 == 0 {
            write!(f, "{} min", ms / 60_000)
        } else if ms % 1_000 == 0 {
            write!(f, "{} s", ms / 1_000)
        } else {
            write!(f, "{ms} ms")
        }
    }
}

/// The local view of today's records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncState {
    /// Records from the last successful fetch, in backend order.
    pub records: Vec<EmailRecord>,
    /// True while a fetch that could still be applied is outstanding.
    pub loading: bool,
    /// Failure of the last applied fetch, cleared when a new fetch starts.
    pub error: Option<String>,
    /// Polling period.
    pub interval: RefreshInterval,
}

impl SyncState {
    /// Creates an empty state.
    #[must_use]
    pub fn new(interval: RefreshInterval) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}
