//! Attendance and monitoring state machine for rollcalld
//!
//! This crate is the heart of rollcalld, containing:
//! - The roster (student identities with reference face descriptors)
//! - The class schedule (period lookup, break gate)
//! - Session state (absent/permitted sets, alert deduplication markers)
//! - The class period tracker (one reminder per period)
//! - The monitoring engine (per-tick frame scan and alert policy)

mod engine;
mod events;
mod periods;
mod roster;
mod schedule;
mod session;

pub use engine::*;
pub use events::*;
pub use periods::*;
pub use roster::*;
pub use schedule::*;
pub use session::*;
