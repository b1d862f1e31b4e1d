//! Kernel kqueue backend.
//!
//! Drives a kqueue descriptor through `kevent(2)`. Compiled on macOS and
//! FreeBSD.

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};
use std::ptr;
use std::time::Duration;

use kqcheck_event::{ActionFlags, EventRecord, Filter, UserData};

use crate::queue::EventQueue;

/// Creates a kqueue descriptor.
///
/// The harness never creates queues itself; this exists for self-tests.
pub fn open_kqueue() -> io::Result<OwnedFd> {
    // SAFETY: kqueue takes no arguments and returns a new descriptor or -1.
    let fd = unsafe { libc::kqueue() };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: fd is a freshly created descriptor owned by nobody else.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// A borrowed kqueue descriptor.
///
/// The descriptor is never inspected or closed.
#[derive(Debug, Clone, Copy)]
pub struct Kqueue<'fd> {
    fd: BorrowedFd<'fd>,
}

impl<'fd> Kqueue<'fd> {
    /// Wraps a kqueue descriptor.
    #[must_use]
    pub const fn new(fd: BorrowedFd<'fd>) -> Self {
        Self { fd }
    }
}

fn filter_to_raw(filter: Filter) -> i16 {
    match filter {
        Filter::Read => libc::EVFILT_READ,
        Filter::Write => libc::EVFILT_WRITE,
        Filter::Aio => libc::EVFILT_AIO,
        Filter::Vnode => libc::EVFILT_VNODE,
        Filter::Proc => libc::EVFILT_PROC,
        Filter::Signal => libc::EVFILT_SIGNAL,
        Filter::Timer => libc::EVFILT_TIMER,
        Filter::User => libc::EVFILT_USER,
        Filter::Other(code) => code,
    }
}

fn filter_from_raw(code: i16) -> Filter {
    match code {
        libc::EVFILT_READ => Filter::Read,
        libc::EVFILT_WRITE => Filter::Write,
        libc::EVFILT_AIO => Filter::Aio,
        libc::EVFILT_VNODE => Filter::Vnode,
        libc::EVFILT_PROC => Filter::Proc,
        libc::EVFILT_SIGNAL => Filter::Signal,
        libc::EVFILT_TIMER => Filter::Timer,
        libc::EVFILT_USER => Filter::User,
        other => Filter::Other(other),
    }
}

fn to_raw(record: &EventRecord) -> libc::kevent {
    // SAFETY: kevent is plain data; all-zero is valid for every field,
    // including FreeBSD's trailing `ext` words.
    let mut raw: libc::kevent = unsafe { std::mem::zeroed() };
    raw.ident = record.ident() as libc::uintptr_t;
    raw.filter = filter_to_raw(record.filter());
    raw.flags = record.flags().bits() as _;
    raw.fflags = record.fflags() as _;
    raw.data = record.data() as _;
    raw.udata = record.udata().get() as *mut libc::c_void;
    raw
}

fn from_raw(raw: &libc::kevent) -> EventRecord {
    EventRecord::new(
        raw.ident as usize,
        filter_from_raw(raw.filter),
        ActionFlags::from_bits_retain(raw.flags as u16),
        raw.fflags as u32,
        raw.data as isize,
        UserData::new(raw.udata as usize),
    )
}

fn to_timespec(timeout: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: libc::time_t::try_from(timeout.as_secs()).unwrap_or(libc::time_t::MAX),
        tv_nsec: timeout.subsec_nanos() as _,
    }
}

impl EventQueue for Kqueue<'_> {
    fn submit(&self, change: &EventRecord) -> io::Result<()> {
        let raw = to_raw(change);
        // SAFETY: one valid change record in, no event list out, no timeout.
        let rc = unsafe {
            libc::kevent(
                self.fd.as_raw_fd(),
                &raw,
                1,
                ptr::null_mut(),
                0,
                ptr::null(),
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::trace!(fd = self.fd.as_raw_fd(), "kevent change applied");
        Ok(())
    }

    fn wait(&self, timeout: Option<Duration>) -> io::Result<Option<EventRecord>> {
        let timespec = timeout.map(to_timespec);
        let timespec_ptr = timespec
            .as_ref()
            .map_or(ptr::null(), |ts| ts as *const libc::timespec);

        // SAFETY: see to_raw.
        let mut raw: libc::kevent = unsafe { std::mem::zeroed() };
        // SAFETY: no change list, room for exactly one event, and the
        // timespec (if any) outlives the call.
        let nfds = unsafe {
            libc::kevent(
                self.fd.as_raw_fd(),
                ptr::null(),
                0,
                &mut raw,
                1,
                timespec_ptr,
            )
        };

        match nfds {
            n if n < 0 => Err(io::Error::last_os_error()),
            0 => Ok(None),
            _ => Ok(Some(from_raw(&raw))),
        }
    }
}
