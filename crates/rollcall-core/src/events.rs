//! Core events emitted by the monitoring engine

use rollcall_util::{PeriodId, StudentId, TimeInterval};
use rollcall_vision::Frame;

/// Events emitted by the engine, consumed by the daemon loop which turns
/// them into logs, IPC events, and frame-sink writes.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// A class period just became active; remind the operator to take
    /// attendance. At most once per period.
    ClassReminderDue { period: PeriodId },

    /// A student marked absent, without outside-permission, was seen on
    /// camera. At most once per student per period value.
    AbsenceAlert {
        student: StudentId,
        period: Option<PeriodId>,
    },

    /// A scheduled break began; camera polling pauses until it ends.
    /// Emitted once per break entry.
    BreakStarted { interval: TimeInterval },

    /// The first attendance sheet arrived; monitoring is now running.
    MonitoringStarted,

    /// An attendance sheet was accepted (every submission).
    AttendanceRecorded { absent: usize, permitted: usize },

    /// A frame was grabbed and scanned. Emitted for every acquired frame,
    /// whether or not anything was detected in it.
    FrameCaptured {
        frame: Frame,
        detections: usize,
    },
}
