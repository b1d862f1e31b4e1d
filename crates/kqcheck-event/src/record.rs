//! The event record.

use std::fmt;

use crate::decode::describe_event;
use crate::filter::Filter;
use crate::flags::ActionFlags;

/// Opaque pointer-sized correlation token.
///
/// Carried unchanged from registration to notification. Never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UserData(usize);

impl UserData {
    /// The cleared token.
    pub const NULL: Self = Self(0);

    /// Wraps a raw token.
    #[must_use]
    pub const fn new(token: usize) -> Self {
        Self(token)
    }

    /// Returns the raw token.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Whether this is the cleared token.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One registration or notification.
///
/// The filter and filter flags are fixed at construction. Action flags may
/// only gain bits afterwards, through [`EventRecord::insert_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventRecord {
    ident: usize,
    filter: Filter,
    flags: ActionFlags,
    fflags: u32,
    data: isize,
    udata: UserData,
}

impl EventRecord {
    /// Builds a record from its fields.
    #[must_use]
    pub const fn new(
        ident: usize,
        filter: Filter,
        flags: ActionFlags,
        fflags: u32,
        data: isize,
        udata: UserData,
    ) -> Self {
        Self {
            ident,
            filter,
            flags,
            fflags,
            data,
            udata,
        }
    }

    /// Resource handle, typically a descriptor number.
    #[must_use]
    pub const fn ident(&self) -> usize {
        self.ident
    }

    /// Condition class.
    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// Action flags.
    #[must_use]
    pub const fn flags(&self) -> ActionFlags {
        self.flags
    }

    /// Raw filter flags; their meaning depends on [`EventRecord::filter`].
    #[must_use]
    pub const fn fflags(&self) -> u32 {
        self.fflags
    }

    /// Filter-defined payload.
    #[must_use]
    pub const fn data(&self) -> isize {
        self.data
    }

    /// Correlation token.
    #[must_use]
    pub const fn udata(&self) -> UserData {
        self.udata
    }

    /// Sets additional action flags.
    pub fn insert_flags(&mut self, flags: ActionFlags) {
        self.flags.insert(flags);
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_event(self))
    }
}
