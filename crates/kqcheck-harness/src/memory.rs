//! In-process reference queue.
//!
//! Implements `EVFILT_USER` the way the BSD kernels do, so the harness can
//! check itself on targets without a kernel kqueue. Registrations for other
//! filters are accepted and kept, but never fire.

use std::io;
use std::time::{Duration, Instant};

use kqcheck_event::{ActionFlags, EventRecord, Filter, UserControl, UserData, UserFlags};
use parking_lot::{Condvar, Mutex};

use crate::config::Backend;
use crate::queue::EventQueue;

/// Flags a registration remembers and reports back on delivery.
const STICKY: ActionFlags = ActionFlags::ADD
    .union(ActionFlags::ONESHOT)
    .union(ActionFlags::CLEAR)
    .union(ActionFlags::DISPATCH);

/// One registration, keyed by `(ident, filter)`.
#[derive(Debug)]
struct Knote {
    ident: usize,
    filter: Filter,
    flags: ActionFlags,
    enabled: bool,
    active: bool,
    payload: u32,
    data: isize,
    udata: UserData,
}

impl Knote {
    fn new(change: &EventRecord) -> Self {
        Self {
            ident: change.ident(),
            filter: change.filter(),
            flags: change.flags() & STICKY,
            enabled: true,
            active: false,
            payload: 0,
            data: change.data(),
            udata: change.udata(),
        }
    }

    const fn is_ready(&self) -> bool {
        self.enabled && self.active
    }
}

/// Queue state behind the lock.
#[derive(Debug, Default)]
struct State {
    // Vec keeps delivery order deterministic: oldest registration first.
    knotes: Vec<Knote>,
}

impl State {
    fn position(&self, ident: usize, filter: Filter) -> Option<usize> {
        self.knotes
            .iter()
            .position(|kn| kn.ident == ident && kn.filter == filter)
    }

    fn apply(&mut self, change: &EventRecord) -> io::Result<()> {
        if let Filter::Other(code) = change.filter() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown filter {code}"),
            ));
        }

        let flags = change.flags();
        let existing = self.position(change.ident(), change.filter());

        if flags.contains(ActionFlags::DELETE) {
            let index = existing.ok_or_else(|| not_found(change))?;
            self.knotes.remove(index);
            return Ok(());
        }

        let index = match existing {
            Some(index) => {
                if flags.contains(ActionFlags::ADD) {
                    let kn = &mut self.knotes[index];
                    kn.flags = flags & STICKY;
                    kn.data = change.data();
                    kn.udata = change.udata();
                }
                index
            }
            None if flags.contains(ActionFlags::ADD) => {
                self.knotes.push(Knote::new(change));
                self.knotes.len() - 1
            }
            None => return Err(not_found(change)),
        };

        let kn = &mut self.knotes[index];
        if kn.filter == Filter::User {
            let fflags = change.fflags();
            kn.payload = UserControl::from_fflags(fflags).apply(kn.payload, fflags);
            if UserFlags::from_bits_retain(fflags).contains(UserFlags::TRIGGER) {
                kn.active = true;
            }
        }
        if flags.contains(ActionFlags::DISABLE) {
            kn.enabled = false;
        }
        if flags.contains(ActionFlags::ENABLE) {
            kn.enabled = true;
        }

        Ok(())
    }

    /// Removes and returns the first ready notification.
    fn deliver(&mut self, echo_add_flag: bool) -> Option<EventRecord> {
        let index = self.knotes.iter().position(Knote::is_ready)?;
        let kn = &mut self.knotes[index];

        let mut flags = kn.flags;
        if !echo_add_flag {
            flags.remove(ActionFlags::ADD);
        }
        let event = EventRecord::new(kn.ident, kn.filter, flags, kn.payload, kn.data, kn.udata);

        if kn.flags.contains(ActionFlags::CLEAR) {
            kn.active = false;
        }
        if kn.flags.contains(ActionFlags::DISPATCH) {
            kn.enabled = false;
        }
        if kn.flags.contains(ActionFlags::ONESHOT) {
            self.knotes.remove(index);
        }

        Some(event)
    }
}

fn not_found(change: &EventRecord) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!(
            "no registration for ident={} filter={}",
            change.ident(),
            change.filter()
        ),
    )
}

/// In-process kqueue with `EVFILT_USER` semantics.
///
/// Safe to share between threads: one thread may trigger while another
/// blocks in [`EventQueue::wait`].
#[derive(Debug)]
pub struct MemoryQueue {
    state: Mutex<State>,
    ready: Condvar,
    echo_add_flag: bool,
}

impl MemoryQueue {
    /// Creates an empty queue that echoes `EV_ADD` on delivery.
    #[must_use]
    pub fn new() -> Self {
        Self::with_add_echo(true)
    }

    /// Creates an empty queue that does or does not echo `EV_ADD`.
    #[must_use]
    pub fn with_add_echo(echo_add_flag: bool) -> Self {
        Self {
            state: Mutex::new(State::default()),
            ready: Condvar::new(),
            echo_add_flag,
        }
    }

    /// Creates an empty queue that reports flags the way `backend` does.
    #[must_use]
    pub fn emulating(backend: Backend) -> Self {
        Self::with_add_echo(backend.echoes_add_flag())
    }

    /// Whether delivered events carry `EV_ADD`.
    #[must_use]
    pub const fn echoes_add_flag(&self) -> bool {
        self.echo_add_flag
    }

    /// Number of live registrations.
    #[must_use]
    pub fn registrations(&self) -> usize {
        self.state.lock().knotes.len()
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue for MemoryQueue {
    fn submit(&self, change: &EventRecord) -> io::Result<()> {
        let mut state = self.state.lock();
        state.apply(change)?;
        if state.knotes.iter().any(Knote::is_ready) {
            self.ready.notify_all();
        }
        Ok(())
    }

    fn wait(&self, timeout: Option<Duration>) -> io::Result<Option<EventRecord>> {
        // A deadline past what Instant can represent is the same as none.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        let mut state = self.state.lock();
        loop {
            if let Some(event) = state.deliver(self.echo_add_flag) {
                return Ok(Some(event));
            }
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut state, deadline).timed_out() {
                        return Ok(state.deliver(self.echo_add_flag));
                    }
                }
                None => self.ready.wait(&mut state),
            }
        }
    }
}
