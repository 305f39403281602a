//! Event types for rollcalld -> client streaming

use chrono::{DateTime, Local};
use rollcall_util::{PeriodId, StudentId, TimeInterval};
use serde::{Deserialize, Serialize};

use crate::{FrameInfo, StateSnapshot, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: rollcall_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Full state snapshot (sent on subscribe and after submissions)
    StateChanged(StateSnapshot),

    /// A class period just became active: time to take attendance
    ClassReminder {
        period: PeriodId,
    },

    /// A student marked absent (without outside-permission) was seen on camera.
    ///
    /// `period` is None when the sighting happened between class periods.
    /// At most one alert per student is emitted while the period value
    /// stays the same.
    AbsenceAlert {
        student: StudentId,
        period: Option<PeriodId>,
    },

    /// A scheduled break began; camera polling pauses until it ends
    BreakStarted {
        interval: TimeInterval,
    },

    /// First attendance sheet arrived; camera monitoring is now running
    MonitoringStarted,

    /// An attendance sheet was accepted (every submission, including repeats)
    AttendanceRecorded {
        absent: usize,
        permitted: usize,
    },

    /// A frame was captured and scanned (metadata only)
    FrameCaptured(FrameInfo),

    /// Service is shutting down
    Shutdown,
}
