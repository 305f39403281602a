//! Per-session attendance state

use rollcall_api::AttendanceSheet;
use rollcall_util::{PeriodId, StudentId};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Outcome of recording an attendance sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub absent: usize,
    pub permitted: usize,
    /// True on the submission that first enabled monitoring.
    pub monitoring_just_started: bool,
}

/// Mutable attendance state for the running session.
///
/// The absent and permitted sets are rebuilt in full on every submission;
/// alert markers survive submissions so a re-marked student is not
/// re-alerted within the same period.
#[derive(Debug, Default)]
pub struct SessionState {
    absent: HashSet<StudentId>,
    permitted_outside: HashSet<StudentId>,
    /// Last period value for which an alert was raised, per student.
    /// A missing entry compares equal to a stored `None`.
    alert_markers: HashMap<StudentId, Option<PeriodId>>,
    /// False until the first submission, then latched true for the
    /// remainder of the process.
    monitoring_enabled: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted sheet against the roster.
    ///
    /// Absence is the complement of the checked-present set over the
    /// roster: a roster name missing from the sheet counts as unchecked.
    /// Sheet names not in the roster are ignored with a warning.
    pub fn record_submission(
        &mut self,
        sheet: &AttendanceSheet,
        roster_names: &[StudentId],
    ) -> SubmissionOutcome {
        for name in sheet.present.keys().chain(sheet.permitted.keys()) {
            if !roster_names.contains(name) {
                warn!(student = %name, "Sheet names a student not in the roster; ignored");
            }
        }

        self.absent = roster_names
            .iter()
            .filter(|name| !sheet.is_present(name))
            .cloned()
            .collect();
        self.permitted_outside = roster_names
            .iter()
            .filter(|name| sheet.is_permitted(name))
            .cloned()
            .collect();

        let monitoring_just_started = !self.monitoring_enabled;
        self.monitoring_enabled = true;

        SubmissionOutcome {
            absent: self.absent.len(),
            permitted: self.permitted_outside.len(),
            monitoring_just_started,
        }
    }

    /// Whether a sighting of `student` during `period` warrants an alert.
    ///
    /// True only for absent, non-permitted students whose last alert was
    /// raised under a different period value. `None` (between periods)
    /// dedups as its own value, so one alert per idle stretch.
    pub fn should_alert(&self, student: &StudentId, period: Option<PeriodId>) -> bool {
        if !self.absent.contains(student) || self.permitted_outside.contains(student) {
            return false;
        }
        let last = self.alert_markers.get(student).copied().unwrap_or(None);
        last != period
    }

    /// Record that an alert was raised for `student` under `period`.
    pub fn mark_alerted(&mut self, student: &StudentId, period: Option<PeriodId>) {
        self.alert_markers.insert(student.clone(), period);
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring_enabled
    }

    pub fn absent(&self) -> &HashSet<StudentId> {
        &self.absent
    }

    pub fn permitted_outside(&self) -> &HashSet<StudentId> {
        &self.permitted_outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_util::WallClock;

    fn roster() -> Vec<StudentId> {
        vec![
            StudentId::new("Alice"),
            StudentId::new("Bob"),
            StudentId::new("Carol"),
        ]
    }

    fn period(h: u8, m: u8) -> Option<PeriodId> {
        Some(PeriodId::new(WallClock::new(h, m).unwrap()))
    }

    #[test]
    fn absence_is_complement_of_checked_present() {
        let mut state = SessionState::new();
        let mut sheet = AttendanceSheet::new();
        sheet.set_present("Alice", true);
        // Bob explicitly unchecked, Carol missing from the sheet entirely.
        sheet.set_present("Bob", false);

        let outcome = state.record_submission(&sheet, &roster());

        assert_eq!(outcome.absent, 2);
        assert!(!state.absent().contains(&StudentId::new("Alice")));
        assert!(state.absent().contains(&StudentId::new("Bob")));
        assert!(state.absent().contains(&StudentId::new("Carol")));

        // Disjoint partition: no student is both absent and present.
        let present: Vec<_> = roster()
            .into_iter()
            .filter(|s| !state.absent().contains(s))
            .collect();
        assert_eq!(present.len() + state.absent().len(), 3);
    }

    #[test]
    fn submission_rebuilds_sets_in_full() {
        let mut state = SessionState::new();

        let mut first = AttendanceSheet::new();
        first.set_permitted("Alice", true);
        state.record_submission(&first, &roster());
        assert!(state.permitted_outside().contains(&StudentId::new("Alice")));

        // Second submission without Alice's permission clears it.
        let mut second = AttendanceSheet::new();
        second.set_permitted("Bob", true);
        state.record_submission(&second, &roster());
        assert!(!state.permitted_outside().contains(&StudentId::new("Alice")));
        assert!(state.permitted_outside().contains(&StudentId::new("Bob")));
    }

    #[test]
    fn monitoring_latches_on_first_submission() {
        let mut state = SessionState::new();
        assert!(!state.monitoring_enabled());

        let outcome = state.record_submission(&AttendanceSheet::new(), &roster());
        assert!(outcome.monitoring_just_started);
        assert!(state.monitoring_enabled());

        let outcome = state.record_submission(&AttendanceSheet::new(), &roster());
        assert!(!outcome.monitoring_just_started);
        assert!(state.monitoring_enabled());
    }

    #[test]
    fn resubmission_is_idempotent() {
        let mut state = SessionState::new();
        let mut sheet = AttendanceSheet::new();
        sheet.set_present("Alice", true);
        sheet.set_permitted("Bob", true);

        let first = state.record_submission(&sheet, &roster());
        let absent_before = state.absent().clone();
        let second = state.record_submission(&sheet, &roster());

        assert_eq!(first.absent, second.absent);
        assert_eq!(first.permitted, second.permitted);
        assert_eq!(&absent_before, state.absent());
    }

    #[test]
    fn alert_dedup_within_period_and_rearm_on_change() {
        let mut state = SessionState::new();
        state.record_submission(&AttendanceSheet::new(), &roster());
        let alice = StudentId::new("Alice");

        assert!(state.should_alert(&alice, period(8, 0)));
        state.mark_alerted(&alice, period(8, 0));
        // Same period: deduplicated.
        assert!(!state.should_alert(&alice, period(8, 0)));
        // Period change re-arms.
        assert!(state.should_alert(&alice, period(9, 0)));
        // Between periods is its own dedup value.
        assert!(state.should_alert(&alice, None));
        state.mark_alerted(&alice, None);
        assert!(!state.should_alert(&alice, None));
    }

    #[test]
    fn never_alerted_student_is_quiet_between_periods() {
        // A missing marker reads as None, which equals a None period: a
        // student who was never alerted inside a period does not alert
        // during idle stretches between periods.
        let mut state = SessionState::new();
        state.record_submission(&AttendanceSheet::new(), &roster());
        let bob = StudentId::new("Bob");

        assert!(!state.should_alert(&bob, None));
        // A real period arms the alert as usual.
        assert!(state.should_alert(&bob, period(10, 0)));
    }

    #[test]
    fn permitted_student_never_alerts() {
        let mut state = SessionState::new();
        let mut sheet = AttendanceSheet::new();
        sheet.set_permitted("Alice", true);
        state.record_submission(&sheet, &roster());

        // Alice is absent (unchecked) but permitted.
        assert!(state.absent().contains(&StudentId::new("Alice")));
        assert!(!state.should_alert(&StudentId::new("Alice"), period(8, 0)));
    }

    #[test]
    fn present_student_never_alerts() {
        let mut state = SessionState::new();
        let mut sheet = AttendanceSheet::new();
        sheet.set_present("Alice", true);
        state.record_submission(&sheet, &roster());

        assert!(!state.should_alert(&StudentId::new("Alice"), period(8, 0)));
    }

    #[test]
    fn markers_survive_resubmission() {
        let mut state = SessionState::new();
        state.record_submission(&AttendanceSheet::new(), &roster());
        let alice = StudentId::new("Alice");

        state.mark_alerted(&alice, period(8, 0));
        // Re-marking Alice absent mid-period does not re-arm the alert.
        state.record_submission(&AttendanceSheet::new(), &roster());
        assert!(!state.should_alert(&alice, period(8, 0)));
    }
}
