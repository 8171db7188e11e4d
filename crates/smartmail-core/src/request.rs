//! Request identifiers and issue-order bookkeeping.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// Identifies one outstanding backend call.
///
/// Ids are unique within the process and increase in issue order, so a
/// completion can be compared against anything applied before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates the next id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_REQUEST.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tracks issued requests so completions are applied in issue order.
///
/// A completion is applied only if it was issued by this tracker, is still
/// pending, and is newer than every completion applied so far. Anything else
/// is stale and must be dropped by the caller.
#[derive(Debug, Default)]
pub struct RequestTracker {
    pending: BTreeSet<RequestId>,
    applied: Option<RequestId>,
}

impl RequestTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new request.
    pub fn issue(&mut self) -> RequestId {
        let id = RequestId::next();
        self.pending.insert(id);
        id
    }

    /// Settles a completion. Returns true if it should be applied.
    pub fn settle(&mut self, id: RequestId) -> bool {
        if !self.pending.remove(&id) {
            return false;
        }
        if self.applied.is_some_and(|applied| id <= applied) {
            return false;
        }
        self.applied = Some(id);
        true
    }

    /// Marks every pending request stale without forgetting it.
    pub fn supersede(&mut self) {
        if let Some(&last) = self.pending.last() {
            self.applied = Some(self.applied.map_or(last, |applied| applied.max(last)));
        }
    }

    /// Marks every request issued before `id` stale.
    ///
    /// `id` may come from another tracker; requests issued after it are
    /// unaffected.
    pub fn supersede_before(&mut self, id: RequestId) {
        self.applied = Some(self.applied.map_or(id, |applied| applied.max(id)));
    }

    /// Forgets every pending request.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Returns true if a request newer than the last applied one is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending
            .last()
            .is_some_and(|&id| self.applied.is_none_or(|applied| id > applied))
    }

    /// Number of requests still outstanding, stale ones included.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
