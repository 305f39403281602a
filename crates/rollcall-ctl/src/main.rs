//! rollcall-ctl - Command-line control client for rollcalld
//!
//! Talks to a running rollcalld over its Unix socket: submit attendance
//! sheets, inspect state, and stream events.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rollcall_api::{
    AttendanceSheet, Command, EventPayload, Response, ResponsePayload, ResponseResult,
};
use rollcall_ipc::IpcClient;
use rollcall_util::default_socket_path;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// rollcall-ctl - Control client for rollcalld
#[derive(Parser, Debug)]
#[command(name = "rollcall-ctl")]
#[command(about = "Command-line control client for rollcalld", long_about = None)]
struct Args {
    /// Socket path for rollcalld connection (or set ROLLCALL_SOCKET env var)
    #[arg(short, long, env = "ROLLCALL_SOCKET")]
    socket: Option<PathBuf>,

    /// Print raw JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: CtlCommand,
}

#[derive(Subcommand, Debug)]
enum CtlCommand {
    /// Show the current daemon state
    State,

    /// List the roster and class schedule
    Roster,

    /// Submit an attendance sheet.
    ///
    /// Roster names not passed with either flag are recorded as absent
    /// without permission.
    Submit {
        /// Mark a student as present in the room (repeatable)
        #[arg(long = "present", value_name = "NAME")]
        present: Vec<String>,

        /// Mark a student as permitted to be outside (repeatable)
        #[arg(long = "permitted", value_name = "NAME")]
        permitted: Vec<String>,
    },

    /// Subscribe to events and print them as they arrive
    Watch,

    /// Check that the daemon answers
    Ping,

    /// Show daemon health
    Health,
}

fn unwrap_response(response: Response) -> Result<ResponsePayload> {
    match response.result {
        ResponseResult::Ok(payload) => Ok(payload),
        ResponseResult::Err(e) => bail!("daemon error: {}", e.message),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_names(names: &[rollcall_util::StudentId]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

async fn run_command(client: &mut IpcClient, args: &Args) -> Result<()> {
    match &args.command {
        CtlCommand::State => {
            let payload = unwrap_response(client.send(Command::GetState).await?)?;
            let ResponsePayload::State(state) = payload else {
                bail!("unexpected response to GetState");
            };

            if args.json {
                return print_json(&state);
            }

            println!(
                "Monitoring:        {}",
                if state.monitoring_enabled {
                    "active"
                } else {
                    "waiting for first attendance submission"
                }
            );
            match state.current_period {
                Some(period) => println!("Current period:    {}", period),
                None => println!("Current period:    (between periods)"),
            }
            println!("On break:          {}", if state.on_break { "yes" } else { "no" });
            println!("Absent:            {}", format_names(&state.absent));
            println!("Permitted outside: {}", format_names(&state.permitted_outside));
            println!("Roster size:       {}", state.roster_size);
        }

        CtlCommand::Roster => {
            let payload = unwrap_response(client.send(Command::GetRoster).await?)?;
            let ResponsePayload::Roster(roster) = payload else {
                bail!("unexpected response to GetRoster");
            };

            if args.json {
                return print_json(&roster);
            }

            println!("Students ({}):", roster.students.len());
            for student in &roster.students {
                println!("  {}", student);
            }
            println!("Periods:");
            for period in &roster.periods {
                println!("  {}", period);
            }
            println!("Breaks:");
            for break_interval in &roster.breaks {
                println!("  {}", break_interval);
            }
        }

        CtlCommand::Submit { present, permitted } => {
            let mut sheet = AttendanceSheet::new();
            for name in present {
                sheet.set_present(name.as_str(), true);
            }
            for name in permitted {
                sheet.set_permitted(name.as_str(), true);
            }

            let payload =
                unwrap_response(client.send(Command::SubmitAttendance { sheet }).await?)?;
            let ResponsePayload::AttendanceAccepted {
                absent,
                permitted,
                monitoring_enabled,
            } = payload
            else {
                bail!("unexpected response to SubmitAttendance");
            };

            if args.json {
                return print_json(&serde_json::json!({
                    "absent": absent,
                    "permitted": permitted,
                    "monitoring_enabled": monitoring_enabled,
                }));
            }

            println!(
                "Attendance recorded: {} absent, {} permitted outside (monitoring {})",
                absent,
                permitted,
                if monitoring_enabled { "on" } else { "off" }
            );
        }

        CtlCommand::Watch => {
            // Handled in main, before this point.
            unreachable!("watch does not use the request/response path");
        }

        CtlCommand::Ping => {
            let payload = unwrap_response(client.send(Command::Ping).await?)?;
            if !matches!(payload, ResponsePayload::Pong) {
                bail!("unexpected response to Ping");
            }
            if args.json {
                return print_json(&serde_json::json!({ "pong": true }));
            }
            println!("pong");
        }

        CtlCommand::Health => {
            let payload = unwrap_response(client.send(Command::GetHealth).await?)?;
            let ResponsePayload::Health(health) = payload else {
                bail!("unexpected response to GetHealth");
            };

            if args.json {
                return print_json(&health);
            }

            println!("Live:          {}", health.live);
            println!("Ready:         {}", health.ready);
            println!("Roster loaded: {}", health.roster_loaded);
            println!("Frame source:  {}", if health.frame_source_ok { "ok" } else { "failing" });
        }
    }

    Ok(())
}

async fn run_watch(client: IpcClient, json: bool) -> Result<()> {
    let mut events = client
        .subscribe()
        .await
        .context("Failed to subscribe to events")?;

    loop {
        let event = events.next().await.context("Event stream closed")?;

        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }

        let stamp = rollcall_util::format_datetime_full(&event.timestamp);
        match event.payload {
            EventPayload::StateChanged(state) => {
                println!(
                    "[{}] state: monitoring={} absent={} permitted={}",
                    stamp,
                    state.monitoring_enabled,
                    state.absent.len(),
                    state.permitted_outside.len()
                );
            }
            EventPayload::ClassReminder { period } => {
                println!("[{}] class started at {}: attendance due", stamp, period);
            }
            EventPayload::AbsenceAlert { student, period } => match period {
                Some(period) => println!(
                    "[{}] ALERT: {} seen outside during period {}",
                    stamp, student, period
                ),
                None => println!(
                    "[{}] ALERT: {} seen outside between periods",
                    stamp, student
                ),
            },
            EventPayload::BreakStarted { interval } => {
                println!("[{}] break {}: camera polling paused", stamp, interval);
            }
            EventPayload::MonitoringStarted => {
                println!("[{}] monitoring started", stamp);
            }
            EventPayload::AttendanceRecorded { absent, permitted } => {
                println!(
                    "[{}] attendance recorded: {} absent, {} permitted outside",
                    stamp, absent, permitted
                );
            }
            EventPayload::FrameCaptured(info) => {
                println!(
                    "[{}] frame {}x{}, {} face(s)",
                    stamp, info.width, info.height, info.detections
                );
            }
            EventPayload::Shutdown => {
                println!("[{}] daemon shutting down", stamp);
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let socket_path = args.socket.clone().unwrap_or_else(default_socket_path);
    let mut client = IpcClient::connect(&socket_path)
        .await
        .with_context(|| format!("Failed to connect to rollcalld at {:?}", socket_path))?;

    if matches!(args.command, CtlCommand::Watch) {
        return run_watch(client, args.json).await;
    }

    run_command(&mut client, &args).await
}
