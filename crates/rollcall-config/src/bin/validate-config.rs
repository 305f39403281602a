//! Config validation CLI tool
//!
//! Validates a rollcalld configuration file and reports any errors.

use rollcall_config::CameraKind;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-config <config-file>");
            eprintln!();
            eprintln!("Validates a rollcalld configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config class.toml");
            return ExitCode::from(2);
        }
    };

    // Check file exists
    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    // Try to load and validate
    match rollcall_config::load_config(&config_path) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", rollcall_config::CURRENT_CONFIG_VERSION);
            println!("  Students: {}", config.students.len());
            println!("  Class periods: {}", config.periods.len());
            println!("  Breaks: {}", config.breaks.len());
            println!("  Tick interval: {:?}", config.daemon.tick_interval);
            println!("  Match tolerance: {}", config.daemon.tolerance);
            match &config.camera {
                CameraKind::ImageDir { dir } => {
                    println!("  Camera: image directory {}", dir.display());
                }
            }

            if !config.students.is_empty() {
                println!();
                println!("Students:");
                for student in &config.students {
                    println!("  - {} ({})", student.name, student.image.display());
                }
            }

            let dead: Vec<String> = config
                .periods
                .iter()
                .chain(config.breaks.iter())
                .filter(|i| i.is_empty())
                .map(|i| i.to_string())
                .collect();
            if !dead.is_empty() {
                println!();
                println!("Warnings:");
                for interval in dead {
                    println!("  - interval {} can never match (start is not before end)", interval);
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                rollcall_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                rollcall_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                rollcall_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                rollcall_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        rollcall_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
