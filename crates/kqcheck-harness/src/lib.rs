// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # kqcheck-harness
//!
//! Conformance operations for kqueue implementations.
//!
//! The queue under test sits behind [`EventQueue`]. A [`Harness`] borrows
//! it and offers the four checks a test case is built from:
//!
//! - **register / update**: submit a control record
//! - **retrieve**: wait for one notification, optionally bounded
//! - **assert_no_events**: poll and fail if anything is pending
//! - **compare**: field-wise equality, with one opt-in tolerance
//!
//! Every check returns a [`HarnessFailure`] on violation. Failures are not
//! meant to be handled: end the test with [`OrTerminate::or_terminate`] or
//! [`HarnessFailure::terminate`]. The only non-fatal outcome is
//! [`Retrieved::TimedOut`].
//!
//! ## Example
//!
//! ```rust
//! use kqcheck_harness::{ActionFlags, Filter, Harness, MemoryQueue, OrTerminate, UserFlags};
//!
//! let queue = MemoryQueue::new();
//! let h = Harness::new(&queue);
//!
//! let expected = h
//!     .register(1, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)
//!     .or_terminate();
//! h.assert_no_events().or_terminate();
//!
//! h.register(1, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
//!     .or_terminate();
//! let event = h.get_event().or_terminate();
//! h.compare(&expected, &event).or_terminate();
//! h.assert_no_events().or_terminate();
//! ```
//!
//! ## Backends
//!
//! | Backend | Type | `EV_ADD` echoed |
//! |---------|------|-----------------|
//! | FreeBSD kernel | [`Kqueue`] | no |
//! | Darwin kernel | [`Kqueue`] | yes |
//! | libkqueue | external | yes |
//! | in-process | [`MemoryQueue`] | configurable |
//!
//! Comparison only tolerates the missing echo when [`Quirks`] says so,
//! normally via [`HarnessConfig::quirks`].

#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod harness;
pub mod location;
pub mod memory;
pub mod queue;
pub mod scenarios;

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
pub mod native;

pub use config::{Backend, HarnessConfig, HarnessConfigBuilder, Quirks};
pub use error::{ConfigError, HarnessFailure, OrTerminate, Result};
pub use harness::{Harness, compare_events};
pub use location::Location;
pub use memory::MemoryQueue;
pub use queue::{EventQueue, Retrieved};

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
pub use native::{Kqueue, open_kqueue};

pub use kqcheck_event::{
    ActionFlags, EventRecord, Filter, UserControl, UserData, UserFlags, describe_event,
};
