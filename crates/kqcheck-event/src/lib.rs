// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # kqcheck-event
//!
//! The kevent record model and its diagnostic rendering.
//!
//! An [`EventRecord`] is what a test submits to a kqueue and what it gets
//! back. When a conformance check fails, [`describe_event`] renders every
//! record involved on a single line:
//!
//! ```rust
//! use kqcheck_event::{ActionFlags, EventRecord, Filter, UserData, UserFlags};
//!
//! let record = EventRecord::new(
//!     1,
//!     Filter::User,
//!     ActionFlags::ADD | ActionFlags::ONESHOT,
//!     UserFlags::TRIGGER.bits(),
//!     0,
//!     UserData::NULL,
//! );
//!
//! assert_eq!(
//!     record.to_string(),
//!     "[ident=1, filter=EVFILT_USER, flags = 17 (EV_ADD, EV_ONESHOT), \
//!      fflags=0x1000000 (NOTE_TRIGGER), data=0, udata=0x0]"
//! );
//! ```
//!
//! ## Filter flags
//!
//! The same filter-flag bit means different things under different filters.
//! [`decode_filter_flags`] takes the filter explicitly and is the only
//! function that chooses a vocabulary:
//!
//! | Filter | Vocabulary |
//! |--------|------------|
//! | `EVFILT_VNODE` | [`VnodeFlags`] |
//! | `EVFILT_PROC` | [`ProcFlags`] |
//! | `EVFILT_READ`, `EVFILT_WRITE` | [`LowWaterFlags`] |
//! | `EVFILT_USER` | [`UserControl`], [`UserFlags`], 24-bit payload |
//! | others | raw value only |

#![warn(missing_docs, rust_2018_idioms)]

pub mod decode;
pub mod filter;
pub mod flags;
pub mod record;

pub use decode::{decode_action_flags, decode_filter_flags, describe_event};
pub use filter::Filter;
pub use flags::{ActionFlags, LowWaterFlags, ProcFlags, UserControl, UserFlags, VnodeFlags};
pub use record::{EventRecord, UserData};
