//! Class schedule: period lookup and the break gate

use rollcall_util::{PeriodId, TimeInterval, WallClock};

/// The class schedule: ordered period intervals plus ordered breaks.
///
/// Order is configuration order throughout. Lookups are linear scans
/// where the first containing interval wins; overlapping intervals are
/// not validated away, the earlier entry simply shadows the later one.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    periods: Vec<TimeInterval>,
    breaks: Vec<TimeInterval>,
}

impl Schedule {
    pub fn new(periods: Vec<TimeInterval>, breaks: Vec<TimeInterval>) -> Self {
        Self { periods, breaks }
    }

    /// The active class period at `now`: the first period interval (in
    /// configuration order) containing `now`, identified by its start time.
    pub fn active_period(&self, now: WallClock) -> Option<PeriodId> {
        self.periods
            .iter()
            .find(|interval| interval.contains(now))
            .map(|interval| PeriodId::new(interval.start))
    }

    /// Whether `now` falls inside any scheduled break.
    pub fn is_break(&self, now: WallClock) -> bool {
        self.breaks.iter().any(|interval| interval.contains(now))
    }

    /// The break interval containing `now`, if any (first match wins).
    pub fn active_break(&self, now: WallClock) -> Option<TimeInterval> {
        self.breaks.iter().find(|i| i.contains(now)).copied()
    }

    pub fn periods(&self) -> &[TimeInterval] {
        &self.periods
    }

    pub fn breaks(&self) -> &[TimeInterval] {
        &self.breaks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(h: u8, m: u8) -> WallClock {
        WallClock::new(h, m).unwrap()
    }

    fn interval(start: (u8, u8), end: (u8, u8)) -> TimeInterval {
        TimeInterval::new(clock(start.0, start.1), clock(end.0, end.1))
    }

    #[test]
    fn active_period_is_keyed_by_start_time() {
        let schedule = Schedule::new(vec![interval((8, 0), (8, 38))], vec![]);

        assert_eq!(
            schedule.active_period(clock(8, 15)),
            Some(PeriodId::new(clock(8, 0)))
        );
        assert_eq!(schedule.active_period(clock(8, 38)), None);
        assert_eq!(schedule.active_period(clock(7, 59)), None);
    }

    #[test]
    fn overlapping_periods_first_listed_wins() {
        // 08:00-09:00 listed before 08:30-08:45; at 08:35 both contain
        // now, and the earlier list entry shadows the later one.
        let schedule = Schedule::new(
            vec![interval((8, 0), (9, 0)), interval((8, 30), (8, 45))],
            vec![],
        );

        assert_eq!(
            schedule.active_period(clock(8, 35)),
            Some(PeriodId::new(clock(8, 0)))
        );
    }

    #[test]
    fn list_order_beats_chronological_order() {
        let schedule = Schedule::new(
            vec![interval((10, 0), (11, 0)), interval((9, 0), (12, 0))],
            vec![],
        );

        // 09:30 only falls in the second entry.
        assert_eq!(
            schedule.active_period(clock(9, 30)),
            Some(PeriodId::new(clock(9, 0)))
        );
        // 10:30 falls in both; the first listed wins.
        assert_eq!(
            schedule.active_period(clock(10, 30)),
            Some(PeriodId::new(clock(10, 0)))
        );
    }

    #[test]
    fn break_gate_is_half_open() {
        let schedule = Schedule::new(vec![], vec![interval((2, 45), (2, 50))]);

        assert!(schedule.is_break(clock(2, 45)));
        assert!(schedule.is_break(clock(2, 46)));
        assert!(!schedule.is_break(clock(2, 50)));
        assert!(!schedule.is_break(clock(2, 44)));
    }

    #[test]
    fn inverted_interval_never_activates() {
        let schedule = Schedule::new(
            vec![interval((17, 20), (17, 0))],
            vec![interval((17, 20), (17, 0))],
        );

        assert_eq!(schedule.active_period(clock(17, 10)), None);
        assert!(!schedule.is_break(clock(17, 10)));
    }

    #[test]
    fn empty_schedule_has_no_period_and_no_break() {
        let schedule = Schedule::default();
        assert_eq!(schedule.active_period(clock(12, 0)), None);
        assert!(!schedule.is_break(clock(12, 0)));
    }
}
