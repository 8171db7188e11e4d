//! Capabilities the controllers need from their host.
//!
//! The page address and the timer are ambient in a browser. Here they are
//! explicit values injected at construction, with in-memory versions for tests
//! and headless hosts.

mod navigator;
mod timer;

pub use navigator::{InMemoryNavigator, NavigationError, Navigator, replace_query};
pub use timer::{ManualScheduler, Scheduler, TimerId};
