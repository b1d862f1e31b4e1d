//! Diagnostic rendering of event records.
//!
//! Action flags decode the same way for every filter. Filter flags are
//! decoded by [`decode_filter_flags`], which is the only place that maps a
//! [`Filter`] to its vocabulary.

use std::fmt;

use bitflags::Flags;

use crate::filter::Filter;
use crate::flags::{ActionFlags, LowWaterFlags, ProcFlags, UserControl, UserFlags, VnodeFlags};
use crate::record::EventRecord;

const ACTION_NAMES: &[(ActionFlags, &str)] = &[
    (ActionFlags::ADD, "EV_ADD"),
    (ActionFlags::ENABLE, "EV_ENABLE"),
    (ActionFlags::DISABLE, "EV_DISABLE"),
    (ActionFlags::DELETE, "EV_DELETE"),
    (ActionFlags::ONESHOT, "EV_ONESHOT"),
    (ActionFlags::CLEAR, "EV_CLEAR"),
    (ActionFlags::EOF, "EV_EOF"),
    (ActionFlags::ERROR, "EV_ERROR"),
    (ActionFlags::DISPATCH, "EV_DISPATCH"),
    (ActionFlags::RECEIPT, "EV_RECEIPT"),
];

const VNODE_NAMES: &[(VnodeFlags, &str)] = &[
    (VnodeFlags::DELETE, "NOTE_DELETE"),
    (VnodeFlags::WRITE, "NOTE_WRITE"),
    (VnodeFlags::EXTEND, "NOTE_EXTEND"),
    (VnodeFlags::ATTRIB, "NOTE_ATTRIB"),
    (VnodeFlags::LINK, "NOTE_LINK"),
    (VnodeFlags::RENAME, "NOTE_RENAME"),
    (VnodeFlags::REVOKE, "NOTE_REVOKE"),
];

const PROC_NAMES: &[(ProcFlags, &str)] = &[
    (ProcFlags::CHILD, "NOTE_CHILD"),
    (ProcFlags::EXIT, "NOTE_EXIT"),
    (ProcFlags::EXITSTATUS, "NOTE_EXITSTATUS"),
    (ProcFlags::FORK, "NOTE_FORK"),
    (ProcFlags::EXEC, "NOTE_EXEC"),
    (ProcFlags::SIGNAL, "NOTE_SIGNAL"),
    (ProcFlags::TRACK, "NOTE_TRACK"),
    (ProcFlags::TRACKERR, "NOTE_TRACKERR"),
];

const LOW_WATER_NAMES: &[(LowWaterFlags, &str)] = &[(LowWaterFlags::LOWAT, "NOTE_LOWAT")];

const USER_NAMES: &[(UserFlags, &str)] = &[(UserFlags::TRIGGER, "NOTE_TRIGGER")];

/// Names every set bit of `value` in table order.
///
/// Bits missing from the table are appended as one hex item.
fn set_names<F>(value: F, table: &[(F, &'static str)]) -> Vec<String>
where
    F: Flags + Copy,
    F::Bits: fmt::LowerHex,
{
    let mut names: Vec<String> = table
        .iter()
        .filter(|(flag, _)| value.contains(*flag))
        .map(|(_, name)| (*name).to_string())
        .collect();

    let known = table
        .iter()
        .fold(F::empty(), |acc, (flag, _)| acc.union(*flag));
    let unknown = value.difference(known);
    if !unknown.is_empty() {
        names.push(format!("{:#x}", unknown.bits()));
    }

    names
}

fn user_names(fflags: u32) -> Vec<String> {
    let mut names = Vec::new();

    let control = UserControl::from_fflags(fflags);
    if control != UserControl::Nop {
        names.push(control.name().to_string());
    }

    let rest = fflags & !(UserFlags::CONTROL_MASK | UserFlags::PAYLOAD_MASK);
    names.extend(set_names(UserFlags::from_bits_retain(rest), USER_NAMES));

    let payload = fflags & UserFlags::PAYLOAD_MASK;
    if payload != 0 {
        names.push(format!("payload={payload:#x}"));
    }

    names
}

/// Renders action flags as `flags = <n> (EV_..., EV_...)`.
#[must_use]
pub fn decode_action_flags(flags: ActionFlags) -> String {
    format!(
        "flags = {} ({})",
        flags.bits(),
        set_names(flags, ACTION_NAMES).join(", ")
    )
}

/// Renders filter flags using the vocabulary of `filter`.
///
/// Filters without a vocabulary render only the raw value.
#[must_use]
pub fn decode_filter_flags(filter: Filter, fflags: u32) -> String {
    let raw = format!("fflags={fflags:#06x}");
    let names = match filter {
        Filter::Vnode => set_names(VnodeFlags::from_bits_retain(fflags), VNODE_NAMES),
        Filter::Proc => set_names(ProcFlags::from_bits_retain(fflags), PROC_NAMES),
        Filter::Read | Filter::Write => {
            set_names(LowWaterFlags::from_bits_retain(fflags), LOW_WATER_NAMES)
        }
        Filter::User => user_names(fflags),
        Filter::Aio | Filter::Signal | Filter::Timer | Filter::Other(_) => return raw,
    };
    format!("{raw} ({})", names.join(", "))
}

/// Renders a whole record on one line.
///
/// Every failure report goes through this function.
#[must_use]
pub fn describe_event(record: &EventRecord) -> String {
    format!(
        "[ident={}, filter={}, {}, {}, data={}, udata={}]",
        record.ident(),
        record.filter(),
        decode_action_flags(record.flags()),
        decode_filter_flags(record.filter(), record.fflags()),
        record.data(),
        record.udata(),
    )
}
