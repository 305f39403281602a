//! Configuration validation

use crate::schema::{RawConfig, RawEmbedderKind, RawInterval, RawStudent};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Student '{name}': {message}")]
    StudentError { name: String, message: String },

    #[error("Duplicate student name: {0}")]
    DuplicateStudentName(String),

    #[error("Invalid time format '{value}': {message}")]
    InvalidTimeFormat { value: String, message: String },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Daemon settings
    if let Some(secs) = config.daemon.tick_interval_secs
        && secs == 0
    {
        errors.push(ValidationError::GlobalError(
            "tick_interval_secs must be at least 1".into(),
        ));
    }

    if let Some(tolerance) = config.daemon.tolerance
        && !(tolerance.is_finite() && tolerance > 0.0)
    {
        errors.push(ValidationError::GlobalError(
            "tolerance must be a positive number".into(),
        ));
    }

    match &config.embedder {
        RawEmbedderKind::Command { program, .. } => {
            if program.as_os_str().is_empty() {
                errors.push(ValidationError::GlobalError(
                    "embedder program cannot be empty".into(),
                ));
            }
        }
    }

    // Check for duplicate student names
    let mut seen_names = HashSet::new();
    for student in &config.students {
        if !seen_names.insert(&student.name) {
            errors.push(ValidationError::DuplicateStudentName(student.name.clone()));
        }
    }

    // Validate each student
    for student in &config.students {
        errors.extend(validate_student(student));
    }

    // Validate schedule times
    for interval in config
        .schedule
        .periods
        .iter()
        .chain(config.schedule.breaks.iter())
    {
        errors.extend(validate_interval(interval));
    }

    errors
}

fn validate_student(student: &RawStudent) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if student.name.trim().is_empty() {
        errors.push(ValidationError::StudentError {
            name: student.name.clone(),
            message: "name cannot be empty".into(),
        });
    }

    if student.image.as_os_str().is_empty() {
        errors.push(ValidationError::StudentError {
            name: student.name.clone(),
            message: "image path cannot be empty".into(),
        });
    }

    errors
}

fn validate_interval(interval: &RawInterval) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Start or end that does not parse is a dead schedule entry waiting to
    // happen; reject it outright rather than shipping an interval that can
    // never match.
    if let Err(e) = parse_time(&interval.start) {
        errors.push(ValidationError::InvalidTimeFormat {
            value: interval.start.clone(),
            message: e,
        });
    }

    if let Err(e) = parse_time(&interval.end) {
        errors.push(ValidationError::InvalidTimeFormat {
            value: interval.end.clone(),
            message: e,
        });
    }

    errors
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<(u8, u8), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected HH:MM format".into());
    }

    let hour: u8 = parts[0].parse().map_err(|_| "Invalid hour".to_string())?;
    let minute: u8 = parts[1].parse().map_err(|_| "Invalid minute".to_string())?;

    if hour >= 24 {
        return Err("Hour must be 0-23".into());
    }
    if minute >= 60 {
        return Err("Minute must be 0-59".into());
    }

    Ok((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawCameraKind, RawDaemonConfig, RawSchedule};

    fn base_config() -> RawConfig {
        RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig::default(),
            camera: RawCameraKind::ImageDir {
                dir: "/frames".into(),
            },
            embedder: RawEmbedderKind::Command {
                program: "/bin/embed".into(),
                args: vec![],
            },
            students: vec![],
            schedule: RawSchedule::default(),
        }
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("14:30").unwrap(), (14, 30));
        assert_eq!(parse_time("00:00").unwrap(), (0, 0));
        assert_eq!(parse_time("23:59").unwrap(), (23, 59));

        assert!(parse_time("24:00").is_err());
        assert!(parse_time("80:38").is_err());
        assert!(parse_time("12:60").is_err());
        assert!(parse_time("12").is_err());
        assert!(parse_time("invalid").is_err());
    }

    #[test]
    fn test_duplicate_name_detection() {
        let mut config = base_config();
        config.students = vec![
            RawStudent {
                name: "Alice".into(),
                image: "a.png".into(),
            },
            RawStudent {
                name: "Alice".into(),
                image: "a2.png".into(),
            },
        ];

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateStudentName(_))));
    }

    #[test]
    fn test_malformed_period_start_rejected() {
        let mut config = base_config();
        config.schedule.periods = vec![RawInterval {
            start: "80:38".into(),
            end: "08:39".into(),
        }];

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidTimeFormat { value, .. } if value == "80:38")));
    }

    #[test]
    fn test_inverted_interval_is_not_a_validation_error() {
        // Parseable but never-true intervals load as written.
        let mut config = base_config();
        config.schedule.breaks = vec![RawInterval {
            start: "17:20".into(),
            end: "17:00".into(),
        }];

        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let mut config = base_config();
        config.daemon.tick_interval_secs = Some(0);

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::GlobalError(_))));
    }

    #[test]
    fn test_nonpositive_tolerance_rejected() {
        let mut config = base_config();
        config.daemon.tolerance = Some(0.0);
        assert!(!validate_config(&config).is_empty());

        config.daemon.tolerance = Some(-0.5);
        assert!(!validate_config(&config).is_empty());

        config.daemon.tolerance = Some(0.5);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_empty_student_name_rejected() {
        let mut config = base_config();
        config.students = vec![RawStudent {
            name: "  ".into(),
            image: "a.png".into(),
        }];

        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::StudentError { .. })));
    }
}
