//! Falsification Tests: Category A - Retrieval and Empty-Queue Assertions (F001-F010, F036)

use std::thread;
use std::time::{Duration, Instant};

use kqcheck_harness::{
    ActionFlags, Filter, Harness, HarnessFailure, MemoryQueue, Retrieved, UserFlags,
};

/// F001: An empty queue passes the no-events assertion
///
/// # Falsification Attempt
/// Assert on a queue that never had a registration.
#[test]
fn f001_empty_queue_passes() {
    let queue = MemoryQueue::new();
    let result = Harness::new(&queue).assert_no_events();
    assert!(result.is_ok(), "F001 FALSIFIED: empty queue reported {result:?}");
}

/// F002: A pending one-shot trigger fails the assertion exactly once
///
/// # Falsification Attempt
/// Fire a one-shot user event and assert twice; fire another, drain it
/// with retrieve and assert again.
#[test]
fn f002_pending_trigger_fails_once() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);

    h.register(1, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)
        .unwrap();
    assert!(
        h.assert_no_events().is_ok(),
        "F002 FALSIFIED: registration alone produced an event"
    );

    h.register(1, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap();
    let err = h.assert_no_events().unwrap_err();
    assert!(
        matches!(err, HarnessFailure::UnexpectedEvent { .. }),
        "F002 FALSIFIED: pending trigger not reported, got {err}"
    );

    // The failed poll retrieved the one-shot event.
    assert!(
        h.assert_no_events().is_ok(),
        "F002 FALSIFIED: one-shot event reported twice"
    );

    h.register(2, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)
        .unwrap();
    h.register(2, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap();
    assert!(h.retrieve(None).unwrap().is_delivered(), "F002 FALSIFIED: event lost");
    assert!(
        h.assert_no_events().is_ok(),
        "F002 FALSIFIED: drained queue still reports events"
    );
}

/// F003: The unexpected-event report names the call site and the event
///
/// # Falsification Attempt
/// Trigger an event, assert, inspect the rendered failure.
#[test]
fn f003_unexpected_event_report() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);
    h.register(5, Filter::User, ActionFlags::ADD, 0, 0).unwrap();
    h.register(5, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap();

    let msg = h.assert_no_events().unwrap_err().to_string();
    assert!(
        msg.contains("retrieval.rs:"),
        "F003 FALSIFIED: location missing from {msg}"
    );
    assert!(
        msg.contains("ident=5") && msg.contains("EVFILT_USER"),
        "F003 FALSIFIED: event not rendered in {msg}"
    );
}

/// F004: A zero timeout on an empty queue times out
///
/// # Falsification Attempt
/// Poll an empty queue; it must neither deliver nor fail.
#[test]
fn f004_zero_timeout_times_out() {
    let queue = MemoryQueue::new();
    let outcome = Harness::new(&queue).retrieve(Some(Duration::ZERO));
    assert!(
        matches!(outcome, Ok(Retrieved::TimedOut)),
        "F004 FALSIFIED: poll returned {outcome:?}"
    );
}

/// F005: A finite timeout is honoured
///
/// # Falsification Attempt
/// Wait 30ms on an empty queue, measure elapsed time.
#[test]
fn f005_finite_timeout_waits() {
    let queue = MemoryQueue::new();
    let start = Instant::now();
    let outcome = Harness::new(&queue)
        .retrieve(Some(Duration::from_millis(30)))
        .unwrap();
    assert!(outcome.is_timed_out(), "F005 FALSIFIED: {outcome:?}");
    assert!(
        start.elapsed() >= Duration::from_millis(30),
        "F005 FALSIFIED: returned after {:?}",
        start.elapsed()
    );
}

/// F006: An unbounded retrieval delivers the registered event
///
/// # Falsification Attempt
/// Block in retrieve while another thread fires the trigger.
#[test]
fn f006_unbounded_retrieval_delivers() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);
    h.register(42, Filter::User, ActionFlags::ADD | ActionFlags::CLEAR, 0, 0)
        .unwrap();

    let outcome = thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(20));
            Harness::new(&queue)
                .register(42, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
                .unwrap();
        });
        h.retrieve(None).unwrap()
    });

    let event = outcome
        .event()
        .expect("F006 FALSIFIED: unbounded retrieval timed out");
    assert_eq!(event.ident(), 42, "F006 FALSIFIED: wrong ident");
    assert_eq!(event.filter(), Filter::User, "F006 FALSIFIED: wrong filter");
}

/// F007: A bounded retrieval delivers an event that is already pending
///
/// # Falsification Attempt
/// Trigger first, then retrieve with a short timeout.
#[test]
fn f007_bounded_retrieval_delivers_pending() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);
    h.register(3, Filter::User, ActionFlags::ADD, 0, 0).unwrap();
    h.register(3, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap();

    let outcome = h.retrieve(Some(Duration::from_millis(10))).unwrap();
    assert!(outcome.is_delivered(), "F007 FALSIFIED: {outcome:?}");
}

/// F008: Submitting to a missing registration is fatal and shows the record
///
/// # Falsification Attempt
/// Trigger an ident that was never added.
#[test]
fn f008_submission_failure_is_reported() {
    let queue = MemoryQueue::new();
    let err = Harness::new(&queue)
        .register(99, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap_err();

    assert!(err.is_primitive(), "F008 FALSIFIED: {err}");
    let msg = err.to_string();
    assert!(
        msg.contains("kevent(2)") && msg.contains("ident=99"),
        "F008 FALSIFIED: report incomplete: {msg}"
    );
}

/// F009: Delivery order follows registration order
///
/// # Falsification Attempt
/// Trigger two registrations in reverse order and drain.
#[test]
fn f009_delivery_order_is_stable() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);
    for ident in [10, 11] {
        h.register(ident, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)
            .unwrap();
    }
    for ident in [11, 10] {
        h.register(ident, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
            .unwrap();
    }

    let first = h.get_event().unwrap();
    let second = h.get_event().unwrap();
    assert_eq!(
        (first.ident(), second.ident()),
        (10, 11),
        "F009 FALSIFIED: delivery order changed"
    );
    assert!(h.assert_no_events().is_ok());
}

/// F010: Kernel backends agree with the memory queue on the basic case
///
/// # Falsification Attempt
/// Run the one-shot scenario on a real kqueue where one exists.
#[cfg(any(target_os = "macos", target_os = "freebsd"))]
#[test]
fn f010_kernel_oneshot_scenario() {
    use kqcheck_harness::{Kqueue, open_kqueue, scenarios};
    use std::os::fd::AsFd;

    let fd = open_kqueue().unwrap();
    let queue = Kqueue::new(fd.as_fd());
    let h = Harness::new(&queue);
    let result = scenarios::empty_queue_is_quiet(&h);
    assert!(result.is_ok(), "F010 FALSIFIED: {result:?}");

    h.register(1, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)
        .unwrap();
    h.register(1, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap();
    let event = h.get_event().unwrap();
    assert_eq!(event.ident(), 1, "F010 FALSIFIED: wrong ident");
    assert!(h.assert_no_events().is_ok(), "F010 FALSIFIED: oneshot repeated");
}

/// F036: A sub-millisecond bounded retrieval delivers or fails, never times out
///
/// # Falsification Attempt
/// Ask for an event within 250µs with and without one pending.
#[test]
fn f036_bounded_get_event_sub_millisecond() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);
    let within = Duration::from_micros(250);

    let err = h.get_event_within(within).unwrap_err();
    assert!(err.is_primitive(), "F036 FALSIFIED: empty queue gave {err}");

    h.register(7, Filter::User, ActionFlags::ADD | ActionFlags::ONESHOT, 0, 0)
        .unwrap();
    h.register(7, Filter::User, ActionFlags::empty(), UserFlags::TRIGGER.bits(), 0)
        .unwrap();
    let event = h.get_event_within(within).unwrap();
    assert_eq!(event.ident(), 7, "F036 FALSIFIED: wrong ident");
}
