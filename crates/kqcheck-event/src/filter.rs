//! Filter categories.
//!
//! A filter names the class of condition a registration monitors. The raw
//! codes of [`Filter::from_raw`] and [`Filter::raw`] are FreeBSD's
//! (`EVFILT_USER` is -11 there, -10 on macOS). Kernel backends map through
//! their own platform headers instead, and hand codes they cannot name back
//! as [`Filter::Other`].

use std::fmt;

/// Condition class monitored by a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Descriptor has data to read (`EVFILT_READ`).
    Read,
    /// Descriptor can be written (`EVFILT_WRITE`).
    Write,
    /// Asynchronous I/O completion (`EVFILT_AIO`).
    Aio,
    /// File-system node changes (`EVFILT_VNODE`).
    Vnode,
    /// Process lifecycle (`EVFILT_PROC`).
    Proc,
    /// Signal delivery (`EVFILT_SIGNAL`).
    Signal,
    /// Timer expiry (`EVFILT_TIMER`).
    Timer,
    /// User-defined trigger (`EVFILT_USER`).
    User,
    /// A filter code this crate has no name for.
    Other(i16),
}

impl Filter {
    /// Every named filter, in code order.
    pub const ALL: [Self; 8] = [
        Self::Read,
        Self::Write,
        Self::Aio,
        Self::Vnode,
        Self::Proc,
        Self::Signal,
        Self::Timer,
        Self::User,
    ];

    /// Maps a FreeBSD filter code to its category.
    ///
    /// Codes from other platforms must be translated by their backend.
    #[must_use]
    pub const fn from_raw(code: i16) -> Self {
        match code {
            -1 => Self::Read,
            -2 => Self::Write,
            -3 => Self::Aio,
            -4 => Self::Vnode,
            -5 => Self::Proc,
            -6 => Self::Signal,
            -7 => Self::Timer,
            -11 => Self::User,
            other => Self::Other(other),
        }
    }

    /// Returns the FreeBSD filter code.
    ///
    /// For [`Filter::Other`] this is the backend-native code it carries.
    #[must_use]
    pub const fn raw(self) -> i16 {
        match self {
            Self::Read => -1,
            Self::Write => -2,
            Self::Aio => -3,
            Self::Vnode => -4,
            Self::Proc => -5,
            Self::Signal => -6,
            Self::Timer => -7,
            Self::User => -11,
            Self::Other(code) => code,
        }
    }

    /// Returns the symbolic name, or `None` for [`Filter::Other`].
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Read => Some("EVFILT_READ"),
            Self::Write => Some("EVFILT_WRITE"),
            Self::Aio => Some("EVFILT_AIO"),
            Self::Vnode => Some("EVFILT_VNODE"),
            Self::Proc => Some("EVFILT_PROC"),
            Self::Signal => Some("EVFILT_SIGNAL"),
            Self::Timer => Some("EVFILT_TIMER"),
            Self::User => Some("EVFILT_USER"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.raw()),
        }
    }
}
