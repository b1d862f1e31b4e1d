//! Action flags and per-filter flag vocabularies.
//!
//! Action flags mean the same thing for every filter. Filter flags do not:
//! bit `0x1` is `NOTE_DELETE` on a vnode, `NOTE_TRACK` on a process and
//! `NOTE_LOWAT` on a socket. Each vocabulary therefore gets its own type, and
//! only [`crate::decode`] picks which one applies to a record.

use bitflags::bitflags;

bitflags! {
    /// Filter-independent control bits (`EV_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionFlags: u16 {
        /// Add the registration, or modify it if it exists.
        const ADD = 0x0001;
        /// Remove the registration.
        const DELETE = 0x0002;
        /// Allow the registration to deliver events.
        const ENABLE = 0x0004;
        /// Suppress delivery without removing the registration.
        const DISABLE = 0x0008;
        /// Remove the registration after its first delivery.
        const ONESHOT = 0x0010;
        /// Reset the event state after delivery.
        const CLEAR = 0x0020;
        /// Report the submission outcome instead of draining events.
        const RECEIPT = 0x0040;
        /// Disable the registration after each delivery.
        const DISPATCH = 0x0080;
        /// Submission error; `data` carries the errno.
        const ERROR = 0x4000;
        /// Filter-specific end-of-file condition.
        const EOF = 0x8000;
    }
}

bitflags! {
    /// `EVFILT_VNODE` filter flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VnodeFlags: u32 {
        /// The node was unlinked.
        const DELETE = 0x0000_0001;
        /// The node's contents changed.
        const WRITE = 0x0000_0002;
        /// The node grew.
        const EXTEND = 0x0000_0004;
        /// The node's attributes changed.
        const ATTRIB = 0x0000_0008;
        /// The node's link count changed.
        const LINK = 0x0000_0010;
        /// The node was renamed.
        const RENAME = 0x0000_0020;
        /// Access to the node was revoked.
        const REVOKE = 0x0000_0040;
    }
}

bitflags! {
    /// `EVFILT_PROC` filter flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProcFlags: u32 {
        /// The process exited.
        const EXIT = 0x8000_0000;
        /// The process forked.
        const FORK = 0x4000_0000;
        /// The process called `exec`.
        const EXEC = 0x2000_0000;
        /// The process received a signal.
        const SIGNAL = 0x0800_0000;
        /// Exit status is reported in `data`.
        const EXITSTATUS = 0x0400_0000;
        /// Follow the process across forks.
        const TRACK = 0x0000_0001;
        /// Tracking a child failed.
        const TRACKERR = 0x0000_0002;
        /// The event describes a tracked child.
        const CHILD = 0x0000_0004;
    }
}

bitflags! {
    /// `EVFILT_READ` and `EVFILT_WRITE` filter flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LowWaterFlags: u32 {
        /// `data` holds a low-water mark.
        const LOWAT = 0x0000_0001;
    }
}

bitflags! {
    /// `EVFILT_USER` trigger bit.
    ///
    /// The control field and payload share the same word; see
    /// [`UserControl`] and [`UserFlags::PAYLOAD_MASK`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UserFlags: u32 {
        /// Fire the user event.
        const TRIGGER = 0x0100_0000;
    }
}

impl UserFlags {
    /// Bits selecting how the payload is combined with the stored value.
    pub const CONTROL_MASK: u32 = 0xc000_0000;
    /// Bits carrying the user payload.
    pub const PAYLOAD_MASK: u32 = 0x00ff_ffff;
}

/// How an `EVFILT_USER` update combines its payload with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserControl {
    /// Leave the stored payload alone (`NOTE_FFNOP`).
    Nop,
    /// Bitwise AND (`NOTE_FFAND`).
    And,
    /// Bitwise OR (`NOTE_FFOR`).
    Or,
    /// Replace (`NOTE_FFCOPY`).
    Copy,
}

impl UserControl {
    /// Extracts the control field from raw `EVFILT_USER` filter flags.
    #[must_use]
    pub const fn from_fflags(fflags: u32) -> Self {
        match fflags & UserFlags::CONTROL_MASK {
            0x4000_0000 => Self::And,
            0x8000_0000 => Self::Or,
            0xc000_0000 => Self::Copy,
            _ => Self::Nop,
        }
    }

    /// Returns the control field bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Nop => 0,
            Self::And => 0x4000_0000,
            Self::Or => 0x8000_0000,
            Self::Copy => 0xc000_0000,
        }
    }

    /// Returns the symbolic name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nop => "NOTE_FFNOP",
            Self::And => "NOTE_FFAND",
            Self::Or => "NOTE_FFOR",
            Self::Copy => "NOTE_FFCOPY",
        }
    }

    /// Applies the control operation to a stored payload.
    #[must_use]
    pub const fn apply(self, stored: u32, fflags: u32) -> u32 {
        let payload = fflags & UserFlags::PAYLOAD_MASK;
        match self {
            Self::Nop => stored,
            Self::And => stored & payload,
            Self::Or => stored | payload,
            Self::Copy => payload,
        }
    }
}
