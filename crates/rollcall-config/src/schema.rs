//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Global daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// Frame source to monitor
    pub camera: RawCameraKind,

    /// Face embedding capability
    pub embedder: RawEmbedderKind,

    /// Enrolled students
    #[serde(default)]
    pub students: Vec<RawStudent>,

    /// Class periods and breaks
    #[serde(default)]
    pub schedule: RawSchedule,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// IPC socket path (default: $XDG_RUNTIME_DIR/rollcalld/rollcalld.sock)
    pub socket_path: Option<PathBuf>,

    /// Cadence of the reminder and camera ticks, in seconds (default: 1)
    pub tick_interval_secs: Option<u64>,

    /// Face match tolerance; smaller is stricter (default: 0.5)
    pub tolerance: Option<f32>,

    /// Where to write the latest captured frame as PNG (default: disabled)
    pub frame_snapshot_path: Option<PathBuf>,
}

/// Raw camera definition
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawCameraKind {
    /// Cycles image files from a directory a capture job writes into
    ImageDir { dir: PathBuf },
}

/// Raw embedder definition
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEmbedderKind {
    /// External program: PNG on stdin, JSON descriptor arrays on stdout
    Command {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Raw student definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStudent {
    /// Display name; doubles as the student's identity
    pub name: String,

    /// Path to a reference photo containing the student's face
    pub image: PathBuf,
}

/// Raw schedule definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSchedule {
    /// Class periods, scanned in order (first match wins on overlap)
    #[serde(default)]
    pub periods: Vec<RawInterval>,

    /// Breaks during which camera polling pauses
    #[serde(default)]
    pub breaks: Vec<RawInterval>,
}

/// Raw half-open time interval
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawInterval {
    /// Start time (HH:MM format, inclusive)
    pub start: String,

    /// End time (HH:MM format, exclusive)
    pub end: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            config_version = 1

            [daemon]
            tick_interval_secs = 2
            tolerance = 0.45

            [camera]
            type = "image_dir"
            dir = "/var/lib/rollcall/camera"

            [embedder]
            type = "command"
            program = "/usr/local/bin/face-embed"
            args = ["--model", "small"]

            [[students]]
            name = "Alice"
            image = "photos/alice.png"

            [[schedule.periods]]
            start = "08:00"
            end = "08:38"

            [[schedule.breaks]]
            start = "09:30"
            end = "09:45"
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.students.len(), 1);
        assert_eq!(config.students[0].name, "Alice");
        assert_eq!(config.schedule.periods.len(), 1);
        assert_eq!(config.schedule.breaks.len(), 1);
        assert!(matches!(config.camera, RawCameraKind::ImageDir { .. }));
    }

    #[test]
    fn missing_camera_fails_to_parse() {
        let toml_str = r#"
            config_version = 1

            [embedder]
            type = "command"
            program = "/usr/local/bin/face-embed"
        "#;

        assert!(toml::from_str::<RawConfig>(toml_str).is_err());
    }

    #[test]
    fn schedule_and_students_default_to_empty() {
        let toml_str = r#"
            config_version = 1

            [camera]
            type = "image_dir"
            dir = "/frames"

            [embedder]
            type = "command"
            program = "/bin/embed"
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert!(config.students.is_empty());
        assert!(config.schedule.periods.is_empty());
        assert!(config.schedule.breaks.is_empty());
    }
}
