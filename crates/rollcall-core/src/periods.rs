//! Class period tracker: one reminder per period

use crate::Schedule;
use rollcall_util::{PeriodId, WallClock};
use tracing::debug;

/// Wall-clock state machine over the schedule's period list.
///
/// Tracks which period is active and arms a one-shot "class started"
/// reminder whenever the active period changes. Driven once per tick;
/// the tick result says whether the reminder is due right now.
#[derive(Debug, Default)]
pub struct PeriodTracker {
    current: Option<PeriodId>,
    reminder_shown: bool,
}

impl PeriodTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now`. Returns the period whose reminder should fire on
    /// this tick, at most once per period.
    pub fn tick(&mut self, now: WallClock, schedule: &Schedule) -> Option<PeriodId> {
        let new = schedule.active_period(now);

        if new != self.current {
            debug!(from = ?self.current, to = ?new, "Class period changed");
            self.current = new;
            self.reminder_shown = false;
        }

        match self.current {
            Some(period) if !self.reminder_shown => {
                self.reminder_shown = true;
                Some(period)
            }
            _ => None,
        }
    }

    /// The period the tracker last observed as active. The monitoring
    /// loop reads this for alert deduplication rather than recomputing
    /// from the clock, so both ticks agree on the period value.
    pub fn current(&self) -> Option<PeriodId> {
        self.current
    }
}
