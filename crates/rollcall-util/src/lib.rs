//! Shared utilities for rollcalld
//!
//! This crate provides:
//! - ID types (StudentId, ClientId)
//! - Wall-clock time types for the class schedule (WallClock, TimeInterval, PeriodId)
//! - The default path for the control socket

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
