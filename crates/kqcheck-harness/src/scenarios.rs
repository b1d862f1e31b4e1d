//! `EVFILT_USER` conformance cases.
//!
//! Each case starts and ends with an empty queue, so they can run back to
//! back on one descriptor.

use kqcheck_event::{ActionFlags, EventRecord, Filter, UserControl, UserData, UserFlags};

use crate::error::Result;
use crate::harness::Harness;
use crate::queue::EventQueue;

/// A named conformance case.
pub struct Scenario<Q: EventQueue + ?Sized> {
    /// Case name, for reports.
    pub name: &'static str,
    /// Case body.
    pub run: fn(&Harness<'_, Q>) -> Result<()>,
}

/// Every case, in run order.
#[must_use]
pub fn all<Q: EventQueue + ?Sized>() -> Vec<Scenario<Q>> {
    vec![
        Scenario {
            name: "empty_queue_is_quiet",
            run: empty_queue_is_quiet::<Q>,
        },
        Scenario {
            name: "user_oneshot_trigger",
            run: user_oneshot_trigger::<Q>,
        },
        Scenario {
            name: "user_dispatch_reenable",
            run: user_dispatch_reenable::<Q>,
        },
        Scenario {
            name: "user_payload_copy",
            run: user_payload_copy::<Q>,
        },
    ]
}

/// Runs every case, stopping at the first failure.
///
/// # Errors
/// The first failing case's [`crate::HarnessFailure`].
pub fn run_all<Q: EventQueue + ?Sized>(harness: &Harness<'_, Q>) -> Result<()> {
    for scenario in all::<Q>() {
        tracing::info!(scenario = scenario.name, "running");
        (scenario.run)(harness)?;
        tracing::info!(scenario = scenario.name, "passed");
    }
    Ok(())
}

/// A fresh queue has nothing pending.
pub fn empty_queue_is_quiet<Q: EventQueue + ?Sized>(h: &Harness<'_, Q>) -> Result<()> {
    h.assert_no_events()
}

/// A one-shot trigger fires once and removes itself.
pub fn user_oneshot_trigger<Q: EventQueue + ?Sized>(h: &Harness<'_, Q>) -> Result<()> {
    let expected = h.register(1, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)?;
    h.assert_no_events()?;

    h.register(1, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)?;
    let event = h.get_event()?;
    h.compare(&expected, &event)?;

    h.assert_no_events()
}

/// A dispatch registration goes quiet after delivery until re-enabled.
pub fn user_dispatch_reenable<Q: EventQueue + ?Sized>(h: &Harness<'_, Q>) -> Result<()> {
    let flags = ActionFlags::ADD | ActionFlags::CLEAR | ActionFlags::DISPATCH;
    let expected = h.register(2, Filter::User, flags, 0, 0)?;

    h.register(2, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)?;
    let event = h.get_event()?;
    h.compare(&expected, &event)?;

    // Disabled by dispatch: a second trigger stays pending but invisible.
    h.register(2, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)?;
    h.assert_no_events()?;

    h.register(2, Filter::User, ActionFlags::ENABLE, 0, 0)?;
    let event = h.get_event()?;
    h.compare(&expected, &event)?;

    h.register(2, Filter::User, ActionFlags::DELETE, 0, 0)?;
    h.assert_no_events()
}

/// `NOTE_FFCOPY` replaces the payload reported on delivery.
pub fn user_payload_copy<Q: EventQueue + ?Sized>(h: &Harness<'_, Q>) -> Result<()> {
    const PAYLOAD: u32 = 0x0000_0abc;

    h.register(3, Filter::User, ActionFlags::ADD | ActionFlags::CLEAR, 0, 0)?;
    let fflags = UserControl::Copy.bits() | UserFlags::TRIGGER.bits() | PAYLOAD;
    h.register(3, Filter::User, ActionFlags::empty(), fflags, 0)?;

    let event = h.get_event()?;
    let expected = EventRecord::new(
        3,
        Filter::User,
        ActionFlags::ADD | ActionFlags::CLEAR,
        PAYLOAD,
        0,
        UserData::NULL,
    );
    h.compare(&expected, &event)?;

    h.register(3, Filter::User, ActionFlags::DELETE, 0, 0)?;
    h.assert_no_events()
}
