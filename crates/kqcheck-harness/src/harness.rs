//! Conformance operations.
//!
//! # Toyota Way: Built-in Quality (品質の作り込み)
//! Every operation either succeeds or returns a [`HarnessFailure`] that the
//! caller is expected to end the test with. Nothing is retried and nothing
//! is recovered, except a bounded retrieval timing out.

use std::io;
use std::time::Duration;

use kqcheck_event::{ActionFlags, EventRecord, Filter, UserData};

use crate::config::{HarnessConfig, Quirks};
use crate::error::{HarnessFailure, Result};
use crate::location::Location;
use crate::queue::{EventQueue, Retrieved};

/// Compares two records field by field.
///
/// When `quirks` allows it, `EV_ADD` set on `expected` is copied onto a
/// local copy of `actual` first. Nothing else is normalized.
///
/// # Errors
/// Returns [`HarnessFailure::Mismatch`] with both records if they differ.
pub fn compare_events(
    expected: &EventRecord,
    actual: &EventRecord,
    quirks: Quirks,
    location: Location,
) -> Result<()> {
    let mut normalized = *actual;
    if quirks.normalize_add_flag() && expected.flags().contains(ActionFlags::ADD) {
        normalized.insert_flags(ActionFlags::ADD);
    }

    if *expected == normalized {
        return Ok(());
    }

    Err(HarnessFailure::Mismatch {
        location,
        expected: *expected,
        actual: *actual,
    })
}

/// Conformance harness bound to one queue.
///
/// The harness borrows the queue and never closes it. Use one harness per
/// execution context.
#[derive(Debug)]
pub struct Harness<'q, Q: ?Sized> {
    queue: &'q Q,
    quirks: Quirks,
}

impl<'q, Q: EventQueue + ?Sized> Harness<'q, Q> {
    /// Creates a harness with strict comparison.
    #[must_use]
    pub const fn new(queue: &'q Q) -> Self {
        Self::with_quirks(queue, Quirks::STRICT)
    }

    /// Creates a harness that tolerates the given backend quirks.
    #[must_use]
    pub const fn with_quirks(queue: &'q Q, quirks: Quirks) -> Self {
        Self { queue, quirks }
    }

    /// Creates a harness from configuration.
    #[must_use]
    pub fn from_config(queue: &'q Q, config: &HarnessConfig) -> Self {
        Self::with_quirks(queue, config.quirks())
    }

    /// Returns the queue under test.
    #[must_use]
    pub const fn queue(&self) -> &'q Q {
        self.queue
    }

    /// Returns the tolerated quirks.
    #[must_use]
    pub const fn quirks(&self) -> Quirks {
        self.quirks
    }

    fn primitive_failure(&self, source: io::Error) -> HarnessFailure {
        HarnessFailure::Primitive {
            primitive: self.queue.primitive(),
            source,
        }
    }

    /// Checks that nothing is pending, reporting the caller's location.
    #[track_caller]
    pub fn assert_no_events(&self) -> Result<()> {
        self.assert_no_events_at(Location::caller())
    }

    /// Polls the queue and fails if a notification is pending.
    ///
    /// # Errors
    /// [`HarnessFailure::Primitive`] if the poll fails,
    /// [`HarnessFailure::UnexpectedEvent`] with the first pending record.
    pub fn assert_no_events_at(&self, location: Location) -> Result<()> {
        match self.queue.wait(Some(Duration::ZERO)) {
            Ok(None) => Ok(()),
            Ok(Some(event)) => {
                tracing::debug!(%location, %event, "unexpected pending event");
                Err(HarnessFailure::UnexpectedEvent { location, event })
            }
            Err(source) => Err(self.primitive_failure(source)),
        }
    }

    /// Waits for one notification.
    ///
    /// `None` blocks until one arrives; `Some(Duration::ZERO)` polls.
    ///
    /// # Errors
    /// [`HarnessFailure::Primitive`] if the wait fails, or if an unbounded
    /// wait returns without a notification.
    pub fn retrieve(&self, timeout: Option<Duration>) -> Result<Retrieved> {
        match self.queue.wait(timeout) {
            Ok(Some(event)) => {
                tracing::debug!(%event, "event retrieved");
                Ok(Retrieved::Delivered(event))
            }
            Ok(None) if timeout.is_some() => {
                tracing::debug!(?timeout, "retrieve timed out");
                Ok(Retrieved::TimedOut)
            }
            Ok(None) => Err(self.primitive_failure(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unbounded wait returned no event",
            ))),
            Err(source) => Err(self.primitive_failure(source)),
        }
    }

    /// Blocks until a notification arrives and returns it.
    ///
    /// # Errors
    /// Same as [`Harness::retrieve`] with no timeout.
    pub fn get_event(&self) -> Result<EventRecord> {
        match self.retrieve(None)? {
            Retrieved::Delivered(event) => Ok(event),
            Retrieved::TimedOut => Err(self.primitive_failure(io::Error::from(
                io::ErrorKind::TimedOut,
            ))),
        }
    }

    /// Waits at most `timeout` for a notification and returns it.
    ///
    /// Unlike [`Harness::retrieve`], running out of time is a failure.
    ///
    /// # Errors
    /// [`HarnessFailure::Primitive`] if the wait fails or times out.
    pub fn get_event_within(&self, timeout: Duration) -> Result<EventRecord> {
        match self.retrieve(Some(timeout))? {
            Retrieved::Delivered(event) => Ok(event),
            Retrieved::TimedOut => Err(self.primitive_failure(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no event within {timeout:?}"),
            ))),
        }
    }

    /// Submits a record as a control update, unchanged.
    ///
    /// # Errors
    /// [`HarnessFailure::Submit`] with the record if the queue rejects it.
    pub fn update(&self, record: &EventRecord) -> Result<()> {
        self.queue.submit(record).map_err(|source| {
            tracing::debug!(%record, error = %source, "kevent submission failed");
            HarnessFailure::Submit {
                primitive: self.queue.primitive(),
                record: *record,
                source,
            }
        })?;
        tracing::debug!(%record, "kevent submitted");
        Ok(())
    }

    /// Builds a record with a null user token and submits it.
    ///
    /// Returns the submitted record so it can serve as an expectation.
    ///
    /// # Errors
    /// Same as [`Harness::update`].
    pub fn register(
        &self,
        ident: usize,
        filter: Filter,
        flags: ActionFlags,
        fflags: u32,
        data: isize,
    ) -> Result<EventRecord> {
        let record = EventRecord::new(ident, filter, flags, fflags, data, UserData::NULL);
        self.update(&record)?;
        Ok(record)
    }

    /// Compares two records, reporting the caller's location.
    #[track_caller]
    pub fn compare(&self, expected: &EventRecord, actual: &EventRecord) -> Result<()> {
        self.compare_at(expected, actual, Location::caller())
    }

    /// Compares two records under this harness's quirks.
    ///
    /// # Errors
    /// [`HarnessFailure::Mismatch`] if they differ.
    pub fn compare_at(
        &self,
        expected: &EventRecord,
        actual: &EventRecord,
        location: Location,
    ) -> Result<()> {
        compare_events(expected, actual, self.quirks, location)
    }
}
