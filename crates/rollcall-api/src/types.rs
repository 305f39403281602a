//! Shared types for the rollcalld API

use rollcall_util::{PeriodId, StudentId, TimeInterval};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A completed attendance sheet, submitted by the operator UI.
///
/// Both maps are keyed by roster name. A checked box maps to `true`; a name
/// missing from a map counts the same as unchecked. Names that are not in
/// the roster are ignored by the daemon (logged, not an error).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceSheet {
    /// Checked = the student is present in the room.
    #[serde(default)]
    pub present: HashMap<StudentId, bool>,
    /// Checked = the student has permission to be outside.
    #[serde(default)]
    pub permitted: HashMap<StudentId, bool>,
}

impl AttendanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_present(&mut self, student: impl Into<StudentId>, present: bool) {
        self.present.insert(student.into(), present);
    }

    pub fn set_permitted(&mut self, student: impl Into<StudentId>, permitted: bool) {
        self.permitted.insert(student.into(), permitted);
    }

    pub fn is_present(&self, student: &StudentId) -> bool {
        self.present.get(student).copied().unwrap_or(false)
    }

    pub fn is_permitted(&self, student: &StudentId) -> bool {
        self.permitted.get(student).copied().unwrap_or(false)
    }
}

/// Full daemon state snapshot for UI display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub api_version: u32,
    /// False until the first attendance submission, then latched true.
    pub monitoring_enabled: bool,
    /// The class period containing the current wall-clock time, if any.
    pub current_period: Option<PeriodId>,
    /// Whether the current wall-clock time falls in a scheduled break.
    pub on_break: bool,
    /// Students marked absent by the latest submission (sorted by name).
    pub absent: Vec<StudentId>,
    /// Students with outside-permission from the latest submission (sorted).
    pub permitted_outside: Vec<StudentId>,
    /// Number of recognizable students in the roster.
    pub roster_size: usize,
}

/// Roster contents for UI display.
///
/// Only recognizable students appear: anyone whose photo produced no face
/// descriptor was excluded at startup and cannot be matched or marked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterInfo {
    pub students: Vec<StudentId>,
    /// Class periods in schedule order.
    pub periods: Vec<TimeInterval>,
    /// Breaks in schedule order.
    pub breaks: Vec<TimeInterval>,
}

/// Metadata about a captured frame (the pixels stay on the daemon side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    /// Face descriptors found in the frame.
    pub detections: usize,
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub live: bool,
    pub ready: bool,
    pub roster_loaded: bool,
    pub frame_source_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_sheet_defaults_to_unchecked() {
        let mut sheet = AttendanceSheet::new();
        sheet.set_present("Alice", true);

        assert!(sheet.is_present(&StudentId::new("Alice")));
        // Missing entries read as unchecked.
        assert!(!sheet.is_present(&StudentId::new("Bob")));
        assert!(!sheet.is_permitted(&StudentId::new("Alice")));
    }

    #[test]
    fn attendance_sheet_serialization() {
        let mut sheet = AttendanceSheet::new();
        sheet.set_present("Alice", true);
        sheet.set_permitted("Bob", true);

        let json = serde_json::to_string(&sheet).unwrap();
        let parsed: AttendanceSheet = serde_json::from_str(&json).unwrap();

        assert!(parsed.is_present(&StudentId::new("Alice")));
        assert!(parsed.is_permitted(&StudentId::new("Bob")));
    }

    #[test]
    fn attendance_sheet_tolerates_missing_maps() {
        // An older client may omit one of the maps entirely.
        let parsed: AttendanceSheet = serde_json::from_str(r#"{"present":{"Alice":true}}"#).unwrap();
        assert!(parsed.is_present(&StudentId::new("Alice")));
        assert!(parsed.permitted.is_empty());
    }
}
