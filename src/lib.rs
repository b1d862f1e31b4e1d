//! kqcheck: kqueue conformance test harness
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kqcheck::prelude::*;
//!
//! let queue = MemoryQueue::new();
//! let h = Harness::new(&queue);
//! h.assert_no_events().or_terminate();
//! ```

pub use kqcheck_event as event;
pub use kqcheck_harness as harness;

/// Prelude module for common imports.
pub mod prelude {
    pub use kqcheck_event::{
        ActionFlags, EventRecord, Filter, UserControl, UserData, UserFlags, describe_event,
    };
    pub use kqcheck_harness::{
        Backend, EventQueue, Harness, HarnessConfig, HarnessFailure, MemoryQueue, OrTerminate,
        Quirks, Retrieved,
    };

    #[cfg(any(target_os = "macos", target_os = "freebsd"))]
    pub use kqcheck_harness::{Kqueue, open_kqueue};
}
