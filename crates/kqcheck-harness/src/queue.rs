//! The seam between the harness and the queue under test.

use std::io;
use std::time::Duration;

use kqcheck_event::EventRecord;

/// A kqueue-like queue the harness can drive.
///
/// Implementations forward to the queue under test and report its errors
/// unchanged. They are not required to be safe for concurrent readers; one
/// context retrieves from a queue at a time.
pub trait EventQueue {
    /// Submits one control record. No notification is read back.
    fn submit(&self, change: &EventRecord) -> io::Result<()>;

    /// Waits for at most one notification.
    ///
    /// `None` blocks until one arrives; `Some(Duration::ZERO)` polls.
    /// Returns `Ok(None)` when the timeout elapsed first.
    fn wait(&self, timeout: Option<Duration>) -> io::Result<Option<EventRecord>>;

    /// Name of the underlying primitive, used in failure reports.
    fn primitive(&self) -> &'static str {
        "kevent(2)"
    }
}

impl<Q: EventQueue + ?Sized> EventQueue for &Q {
    fn submit(&self, change: &EventRecord) -> io::Result<()> {
        (**self).submit(change)
    }

    fn wait(&self, timeout: Option<Duration>) -> io::Result<Option<EventRecord>> {
        (**self).wait(timeout)
    }

    fn primitive(&self) -> &'static str {
        (**self).primitive()
    }
}

/// Outcome of a bounded retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Retrieved {
    /// A notification arrived.
    Delivered(EventRecord),
    /// The timeout elapsed first.
    TimedOut,
}

impl Retrieved {
    /// Whether a notification arrived.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// Whether the timeout elapsed.
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }

    /// Returns the delivered record, if any.
    #[must_use]
    pub const fn event(self) -> Option<EventRecord> {
        match self {
            Self::Delivered(event) => Some(event),
            Self::TimedOut => None,
        }
    }
}
