//! Validated configuration structures

use crate::schema::{RawCameraKind, RawConfig, RawEmbedderKind, RawInterval, RawStudent};
use crate::validation::{parse_time, ValidationError};
use rollcall_util::{StudentId, TimeInterval, WallClock};
use std::path::PathBuf;
use std::time::Duration;

/// Default tick cadence for the reminder and camera timers.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Validated configuration ready for use by the daemon
#[derive(Debug, Clone)]
pub struct ClassConfig {
    /// Daemon configuration
    pub daemon: DaemonConfig,

    /// Frame source to monitor
    pub camera: CameraKind,

    /// Face embedding capability
    pub embedder: EmbedderKind,

    /// Enrolled students, in configuration order
    pub students: Vec<StudentSource>,

    /// Class periods, in configuration order (first match wins on overlap)
    pub periods: Vec<TimeInterval>,

    /// Breaks, in configuration order
    pub breaks: Vec<TimeInterval>,
}

impl ClassConfig {
    /// Convert from raw config.
    ///
    /// Malformed HH:MM strings fail the conversion even when
    /// `validate_config` was skipped, so a raw config can never smuggle a
    /// rewritten interval past the validated form.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ValidationError> {
        let students = raw.students.into_iter().map(StudentSource::from_raw).collect();
        let periods: Vec<TimeInterval> = raw
            .schedule
            .periods
            .iter()
            .map(convert_interval)
            .collect::<Result<_, _>>()?;
        let breaks: Vec<TimeInterval> = raw
            .schedule
            .breaks
            .iter()
            .map(convert_interval)
            .collect::<Result<_, _>>()?;

        for interval in periods.iter().chain(breaks.iter()) {
            if interval.is_empty() {
                tracing::warn!(interval = %interval, "Schedule interval can never match (start is not before end)");
            }
        }

        Ok(Self {
            daemon: DaemonConfig::from_raw(raw.daemon),
            camera: CameraKind::from_raw(raw.camera),
            embedder: EmbedderKind::from_raw(raw.embedder),
            students,
            periods,
            breaks,
        })
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub socket_path: PathBuf,
    pub tick_interval: Duration,
    pub tolerance: f32,
    pub frame_snapshot_path: Option<PathBuf>,
}

impl DaemonConfig {
    fn from_raw(raw: crate::schema::RawDaemonConfig) -> Self {
        Self {
            socket_path: raw
                .socket_path
                .unwrap_or_else(rollcall_util::socket_path_without_env),
            tick_interval: raw
                .tick_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
            tolerance: raw.tolerance.unwrap_or(rollcall_vision::DEFAULT_TOLERANCE),
            frame_snapshot_path: raw.frame_snapshot_path,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket_path: rollcall_util::socket_path_without_env(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            tolerance: rollcall_vision::DEFAULT_TOLERANCE,
            frame_snapshot_path: None,
        }
    }
}

/// Validated camera definition
#[derive(Debug, Clone)]
pub enum CameraKind {
    ImageDir { dir: PathBuf },
}

impl CameraKind {
    fn from_raw(raw: RawCameraKind) -> Self {
        match raw {
            RawCameraKind::ImageDir { dir } => Self::ImageDir { dir },
        }
    }
}

/// Validated embedder definition
#[derive(Debug, Clone)]
pub enum EmbedderKind {
    Command { program: PathBuf, args: Vec<String> },
}

impl EmbedderKind {
    fn from_raw(raw: RawEmbedderKind) -> Self {
        match raw {
            RawEmbedderKind::Command { program, args } => Self::Command { program, args },
        }
    }
}

/// A student's enrollment record: name plus reference photo
#[derive(Debug, Clone)]
pub struct StudentSource {
    pub name: StudentId,
    pub image: PathBuf,
}

impl StudentSource {
    fn from_raw(raw: RawStudent) -> Self {
        Self {
            name: StudentId::new(raw.name),
            image: raw.image,
        }
    }
}

fn convert_interval(raw: &RawInterval) -> Result<TimeInterval, ValidationError> {
    let (start_h, start_m) =
        parse_time(&raw.start).map_err(|message| ValidationError::InvalidTimeFormat {
            value: raw.start.clone(),
            message,
        })?;
    let (end_h, end_m) =
        parse_time(&raw.end).map_err(|message| ValidationError::InvalidTimeFormat {
            value: raw.end.clone(),
            message,
        })?;

    // parse_time bounds-checks hour and minute, so these are in range.
    Ok(TimeInterval::new(
        WallClock {
            hour: start_h,
            minute: start_m,
        },
        WallClock {
            hour: end_h,
            minute: end_m,
        },
    ))
}
