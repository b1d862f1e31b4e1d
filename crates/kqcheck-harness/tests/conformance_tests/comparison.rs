//! Falsification Tests: Category B - Comparison and Normalization (F011-F020, F035)
//!
//! # Toyota Way: Jidoka (自働化)
//! The one tolerated inconsistency must not hide any other defect.

use kqcheck_harness::{
    ActionFlags, Backend, EventRecord, Filter, Harness, HarnessConfig, HarnessFailure, Location,
    MemoryQueue, Quirks, UserData, compare_events, scenarios,
};

use super::user_event;

/// F011: Strict comparison rejects a missing EV_ADD
///
/// # Falsification Attempt
/// Compare records differing only in EV_ADD with normalization off.
#[test]
fn f011_strict_rejects_add_difference() {
    let expected = user_event(1, ActionFlags::ADD | ActionFlags::ONESHOT);
    let actual = user_event(1, ActionFlags::ONESHOT);

    let result = compare_events(&expected, &actual, Quirks::STRICT, Location::caller());
    assert!(
        matches!(result, Err(HarnessFailure::Mismatch { .. })),
        "F011 FALSIFIED: strict comparison accepted {actual}"
    );
}

/// F012: Normalized comparison accepts a missing EV_ADD
///
/// # Falsification Attempt
/// Same records, normalization on.
#[test]
fn f012_normalized_accepts_add_difference() {
    let expected = user_event(1, ActionFlags::ADD | ActionFlags::ONESHOT);
    let actual = user_event(1, ActionFlags::ONESHOT);
    let quirks = Quirks::for_backend(Backend::FreebsdKernel);

    let result = compare_events(&expected, &actual, quirks, Location::caller());
    assert!(result.is_ok(), "F012 FALSIFIED: {result:?}");
}

/// F013: Normalization does not hide other flag differences
///
/// # Falsification Attempt
/// Drop EV_CLEAR as well as EV_ADD with normalization on.
#[test]
fn f013_normalization_is_narrow() {
    let expected = user_event(1, ActionFlags::ADD | ActionFlags::CLEAR);
    let actual = user_event(1, ActionFlags::empty());
    let quirks = Quirks::STRICT.with_normalize_add_flag(true);

    let result = compare_events(&expected, &actual, quirks, Location::caller());
    assert!(result.is_err(), "F013 FALSIFIED: EV_CLEAR loss was hidden");
}

/// F014: The mismatch report carries both records as retrieved
///
/// # Falsification Attempt
/// Inspect the failure for an ident mismatch.
#[test]
fn f014_mismatch_report_has_both_records() {
    let expected = user_event(1, ActionFlags::ADD);
    let actual = user_event(2, ActionFlags::ADD);
    let err = compare_events(&expected, &actual, Quirks::STRICT, Location::new("case.rs", 7))
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("[case.rs:7]"), "F014 FALSIFIED: {msg}");
    assert!(
        msg.contains("expected [ident=1") && msg.contains("but got  [ident=2"),
        "F014 FALSIFIED: records missing from {msg}"
    );
}

/// F015: The caller's location is captured by `Harness::compare`
///
/// # Falsification Attempt
/// Compare through the harness and check the reported line.
#[test]
fn f015_compare_reports_caller() {
    let queue = MemoryQueue::new();
    let h = Harness::new(&queue);
    let expected = user_event(1, ActionFlags::ADD);
    let actual = user_event(1, ActionFlags::DELETE);

    let line = line!() + 1;
    let err = h.compare(&expected, &actual).unwrap_err();
    match err {
        HarnessFailure::Mismatch { location, .. } => {
            assert_eq!(location.line(), line, "F015 FALSIFIED: wrong line");
        }
        other => panic!("F015 FALSIFIED: unexpected failure {other}"),
    }
}

/// F016: Scenarios pass on a backend that strips EV_ADD when configured for it
///
/// # Falsification Attempt
/// Run every scenario on a FreeBSD-emulating queue with FreeBSD quirks.
#[test]
fn f016_scenarios_pass_with_matching_quirks() {
    let config = HarnessConfig::builder()
        .backend(Backend::FreebsdKernel)
        .build();
    let queue = MemoryQueue::emulating(config.backend());
    let result = scenarios::run_all(&Harness::from_config(&queue, &config));
    assert!(result.is_ok(), "F016 FALSIFIED: {result:?}");
}

/// F017: The same backend fails strict comparison
///
/// # Falsification Attempt
/// Run the scenarios on a FreeBSD-emulating queue with the quirk overridden off.
#[test]
fn f017_scenarios_fail_without_quirks() {
    let config = HarnessConfig::builder()
        .backend(Backend::FreebsdKernel)
        .normalize_add_flag(false)
        .build();
    let queue = MemoryQueue::emulating(config.backend());
    let result = scenarios::run_all(&Harness::from_config(&queue, &config));
    assert!(
        matches!(result, Err(HarnessFailure::Mismatch { .. })),
        "F017 FALSIFIED: strict run passed on a non-echoing backend"
    );
}

/// F018: Scenarios pass on an echoing backend with strict comparison
///
/// # Falsification Attempt
/// Run every scenario on the default memory queue.
#[test]
fn f018_scenarios_pass_strict() {
    let queue = MemoryQueue::new();
    let result = scenarios::run_all(&Harness::new(&queue));
    assert!(result.is_ok(), "F018 FALSIFIED: {result:?}");
}

/// F019: The user token takes part in comparison
///
/// # Falsification Attempt
/// Compare records differing only in udata under every quirk setting.
#[test]
fn f019_udata_is_compared() {
    let expected = user_event(1, ActionFlags::ADD);
    let actual = EventRecord::new(1, Filter::User, ActionFlags::ADD, 0, 0, UserData::new(8));
    for quirks in [Quirks::STRICT, Quirks::STRICT.with_normalize_add_flag(true)] {
        assert!(
            compare_events(&expected, &actual, quirks, Location::caller()).is_err(),
            "F019 FALSIFIED: udata difference ignored under {quirks:?}"
        );
    }
}

/// F020: Comparison never mutates the caller's records
///
/// # Falsification Attempt
/// Normalize, then check the actual record still lacks EV_ADD.
#[test]
fn f020_actual_is_not_mutated() {
    let expected = user_event(1, ActionFlags::ADD | ActionFlags::ONESHOT);
    let actual = user_event(1, ActionFlags::ONESHOT);
    let quirks = Quirks::STRICT.with_normalize_add_flag(true);

    compare_events(&expected, &actual, quirks, Location::caller()).unwrap();
    assert_eq!(
        actual.flags(),
        ActionFlags::ONESHOT,
        "F020 FALSIFIED: actual record was modified"
    );
}

/// F035: An unconfigured harness compares strictly on every target
///
/// # Falsification Attempt
/// Build a harness from an empty config and run the scenarios on a queue
/// that strips EV_ADD.
#[test]
fn f035_unnamed_backend_is_strict() {
    let config = HarnessConfig::from_toml("").unwrap();
    assert_eq!(config.quirks(), Quirks::STRICT, "F035 FALSIFIED: {config:?}");

    let queue = MemoryQueue::emulating(Backend::FreebsdKernel);
    let result = scenarios::run_all(&Harness::from_config(&queue, &config));
    assert!(
        matches!(result, Err(HarnessFailure::Mismatch { .. })),
        "F035 FALSIFIED: missing EV_ADD tolerated without a named backend"
    );
}
