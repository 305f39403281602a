//! The monitoring engine: per-tick frame scan and alert policy

use rollcall_api::{AttendanceSheet, RosterInfo, StateSnapshot, API_VERSION};
use rollcall_util::WallClock;
use rollcall_vision::{FaceEmbedder, FrameSource};
use tracing::{debug, info, warn};

use crate::{CoreEvent, PeriodTracker, Roster, Schedule, SessionState};

/// Owns the roster, schedule, session state, and the vision seams, and
/// turns timer ticks and submissions into [`CoreEvent`]s.
///
/// Two entry points are driven by timers at the same cadence:
/// [`tick_reminder`](Self::tick_reminder) advances the period tracker and
/// [`poll_camera`](Self::poll_camera) runs the monitoring pass. Both are
/// synchronous and complete within a tick; an early exit mutates no
/// session state.
pub struct MonitorEngine {
    roster: Roster,
    schedule: Schedule,
    session: SessionState,
    tracker: PeriodTracker,
    source: Box<dyn FrameSource>,
    embedder: Box<dyn FaceEmbedder>,
    tolerance: f32,
    break_notice_shown: bool,
    /// Outcome of the most recent grab attempt, for the health probe.
    frame_source_ok: bool,
}

impl MonitorEngine {
    pub fn new(
        roster: Roster,
        schedule: Schedule,
        source: Box<dyn FrameSource>,
        embedder: Box<dyn FaceEmbedder>,
        tolerance: f32,
    ) -> Self {
        info!(
            roster = roster.len(),
            periods = schedule.periods().len(),
            breaks = schedule.breaks().len(),
            tolerance,
            source = %source.describe(),
            "Monitor engine initialized"
        );

        Self {
            roster,
            schedule,
            session: SessionState::new(),
            tracker: PeriodTracker::new(),
            source,
            embedder,
            tolerance,
            break_notice_shown: false,
            frame_source_ok: true,
        }
    }

    /// Reminder tick: advance the period tracker, surfacing the one-shot
    /// "class started" reminder when a period becomes active.
    pub fn tick_reminder(&mut self, now: WallClock) -> Option<CoreEvent> {
        let period = self.tracker.tick(now, &self.schedule)?;
        info!(period = %period, "Class started, attendance due");
        Some(CoreEvent::ClassReminderDue { period })
    }

    /// Camera tick: the monitoring pass.
    ///
    /// Gated on monitoring enablement and the break schedule; otherwise
    /// grabs one frame, embeds it, identifies each face first-match-wins
    /// against the roster, and applies the alert policy. Frame and embed
    /// failures are transient: the tick is skipped and the next one
    /// retries, indefinitely and without backoff.
    pub fn poll_camera(&mut self, now: WallClock) -> Vec<CoreEvent> {
        if !self.session.monitoring_enabled() {
            return Vec::new();
        }

        if let Some(interval) = self.schedule.active_break(now) {
            if self.break_notice_shown {
                return Vec::new();
            }
            self.break_notice_shown = true;
            info!(interval = %interval, "Break time, camera polling paused");
            return vec![CoreEvent::BreakStarted { interval }];
        }
        self.break_notice_shown = false;

        let frame = match self.source.grab() {
            Ok(Some(frame)) => {
                self.frame_source_ok = true;
                frame
            }
            Ok(None) => {
                self.frame_source_ok = true;
                debug!("No frame available this tick");
                return Vec::new();
            }
            Err(e) => {
                self.frame_source_ok = false;
                warn!(error = %e, "Frame grab failed, skipping tick");
                return Vec::new();
            }
        };

        let mut events = Vec::new();

        // Presentation is independent of the alert policy: every acquired
        // frame reaches the sink, even when embedding fails or finds
        // nothing.
        let descriptors = match self.embedder.embed(&frame) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                warn!(error = %e, "Embedding failed, skipping detections this tick");
                events.push(CoreEvent::FrameCaptured {
                    frame,
                    detections: 0,
                });
                return events;
            }
        };

        events.push(CoreEvent::FrameCaptured {
            frame,
            detections: descriptors.len(),
        });

        // The period tracker's view of "current period", updated by the
        // reminder tick, is the alert dedup value. Both ticks share one
        // cadence, so the two stay within a tick of each other.
        let period = self.tracker.current();

        for descriptor in &descriptors {
            let Some(student) = self.roster.identify(descriptor, self.tolerance) else {
                debug!("Unknown face detected");
                continue;
            };

            if self.session.should_alert(student, period) {
                warn!(
                    student = %student,
                    period = ?period.map(|p| p.to_string()),
                    "Student marked absent detected outside without permission"
                );
                let student = student.clone();
                self.session.mark_alerted(&student, period);
                events.push(CoreEvent::AbsenceAlert { student, period });
            }
        }

        events
    }

    /// Record a submitted attendance sheet.
    ///
    /// Rebuilds the absent and permitted sets in full and latches
    /// monitoring on. Alert markers are left untouched, so a student
    /// re-marked absent mid-period is not re-alerted until the period
    /// changes.
    pub fn submit_attendance(&mut self, sheet: &AttendanceSheet) -> Vec<CoreEvent> {
        let outcome = self.session.record_submission(sheet, self.roster.names());

        info!(
            absent = outcome.absent,
            permitted = outcome.permitted,
            "Attendance submitted"
        );

        let mut events = vec![CoreEvent::AttendanceRecorded {
            absent: outcome.absent,
            permitted: outcome.permitted,
        }];
        if outcome.monitoring_just_started {
            info!("Monitoring started");
            events.push(CoreEvent::MonitoringStarted);
        }
        events
    }

    /// State snapshot for clients.
    pub fn snapshot(&self, now: WallClock) -> StateSnapshot {
        let mut absent: Vec<_> = self.session.absent().iter().cloned().collect();
        absent.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let mut permitted: Vec<_> = self.session.permitted_outside().iter().cloned().collect();
        permitted.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        StateSnapshot {
            api_version: API_VERSION,
            monitoring_enabled: self.session.monitoring_enabled(),
            current_period: self.schedule.active_period(now),
            on_break: self.schedule.is_break(now),
            absent,
            permitted_outside: permitted,
            roster_size: self.roster.len(),
        }
    }

    /// Roster and schedule contents for clients.
    pub fn roster_info(&self) -> RosterInfo {
        RosterInfo {
            students: self.roster.names().to_vec(),
            periods: self.schedule.periods().to_vec(),
            breaks: self.schedule.breaks().to_vec(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Whether the most recent grab attempt succeeded. True until the
    /// first failure; a later successful grab clears it again.
    pub fn frame_source_ok(&self) -> bool {
        self.frame_source_ok
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }
}
