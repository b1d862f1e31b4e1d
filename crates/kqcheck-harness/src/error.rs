//! Harness failure and configuration error types.
//!
//! # Toyota Way: Jidoka (自働化)
//! A conformance failure stops the line. Every [`HarnessFailure`] is fatal;
//! it exists as a value only so the test boundary can report it before the
//! process goes down.

use std::io;

use kqcheck_event::EventRecord;

use crate::location::Location;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessFailure>;

/// A violated conformance invariant or a broken queue.
///
/// Records are rendered through [`kqcheck_event::describe_event`].
#[derive(Debug, thiserror::Error)]
pub enum HarnessFailure {
    /// The wait primitive reported an OS error.
    #[error("{primitive}: {source}")]
    Primitive {
        /// Name of the failing primitive.
        primitive: &'static str,
        /// OS error.
        source: io::Error,
    },

    /// A control record could not be submitted.
    #[error("{primitive}: unable to submit the following kevent:\n{record}\n{source}")]
    Submit {
        /// Name of the failing primitive.
        primitive: &'static str,
        /// The record that was being submitted.
        record: EventRecord,
        /// OS error.
        source: io::Error,
    },

    /// The queue held a notification when none was expected.
    #[error("[{location}]: unexpected event: {event}")]
    UnexpectedEvent {
        /// Where the check was made.
        location: Location,
        /// First pending notification.
        event: EventRecord,
    },

    /// Two records differed after normalization.
    #[error("[{location}]: event comparison failed:\nexpected {expected}\nbut got  {actual}")]
    Mismatch {
        /// Where the check was made.
        location: Location,
        /// Expected record.
        expected: EventRecord,
        /// Record as retrieved, before normalization.
        actual: EventRecord,
    },
}

impl HarnessFailure {
    /// Reports the failure on stderr and ends the process.
    ///
    /// Mismatches abort, leaving a core for inspection. Everything else exits
    /// with status 1.
    pub fn terminate(self) -> ! {
        tracing::error!(failure = %self, "conformance check failed, terminating");
        eprintln!("{self}");
        match self {
            Self::Mismatch { .. } => std::process::abort(),
            Self::Primitive { .. } | Self::Submit { .. } | Self::UnexpectedEvent { .. } => {
                std::process::exit(1)
            }
        }
    }

    /// Whether the queue under test returned an OS error.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive { .. } | Self::Submit { .. })
    }
}

/// Turns a harness result into its value or a terminated process.
///
/// ```rust,no_run
/// use kqcheck_harness::{Harness, MemoryQueue, OrTerminate};
///
/// let queue = MemoryQueue::new();
/// Harness::new(&queue).assert_no_events().or_terminate();
/// ```
pub trait OrTerminate<T> {
    /// Returns the value, or terminates through [`HarnessFailure::terminate`].
    fn or_terminate(self) -> T;
}

impl<T> OrTerminate<T> for Result<T> {
    fn or_terminate(self) -> T {
        match self {
            Ok(value) => value,
            Err(failure) => failure.terminate(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for [`crate::HarnessConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration is inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
