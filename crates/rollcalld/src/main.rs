//! rollcalld - The rollcall background service
//!
//! This is the main entry point for the rollcalld service.
//! It wires together all the components:
//! - Configuration loading
//! - Roster build (fail-fast on unreadable reference photos)
//! - Frame source and embedder (fail-fast on camera init)
//! - The monitoring engine, driven by two periodic tickers
//! - IPC server

use anyhow::{Context, Result};
use clap::Parser;
use rollcall_api::{
    Command, ErrorCode, ErrorInfo, Event, EventPayload, FrameInfo, HealthStatus, Response,
    ResponsePayload,
};
use rollcall_config::{load_config, CameraKind, ClassConfig, EmbedderKind};
use rollcall_core::{CoreEvent, MonitorEngine, Roster, Schedule};
use rollcall_ipc::{IpcServer, ServerMessage};
use rollcall_util::WallClock;
use rollcall_vision::{
    CommandEmbedder, FaceEmbedder, FrameSink, FrameSource, ImageDirSource, NullFrameSink,
    PngFrameSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// rollcalld - Classroom presence monitoring service
#[derive(Parser, Debug)]
#[command(name = "rollcalld")]
#[command(about = "Classroom presence monitoring service", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ROLLCALL_CONFIG")]
    config: PathBuf,

    /// Socket path override (or set ROLLCALL_SOCKET env var)
    #[arg(short, long, env = "ROLLCALL_SOCKET")]
    socket: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Main service state
struct Service {
    config: ClassConfig,
    engine: MonitorEngine,
    sink: Box<dyn FrameSink>,
    ipc: IpcServer,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        // Load configuration
        let config = load_config(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            students = config.students.len(),
            periods = config.periods.len(),
            "Configuration loaded"
        );

        // Build the embedder
        let mut embedder: Box<dyn FaceEmbedder> = match &config.embedder {
            EmbedderKind::Command { program, args } => {
                Box::new(CommandEmbedder::new(program.clone(), args.clone()))
            }
        };

        // Build the roster. An unreadable reference photo aborts startup;
        // a photo with no detectable face only excludes that student.
        let roster = Roster::build(&config.students, embedder.as_mut())
            .context("Failed to build roster")?;
        if roster.is_empty() {
            warn!("Roster has no recognizable students; nothing can ever be matched");
        }

        // Open the frame source; a dead camera at startup is fatal.
        let source: Box<dyn FrameSource> = match &config.camera {
            CameraKind::ImageDir { dir } => Box::new(
                ImageDirSource::open(dir)
                    .with_context(|| format!("Failed to open camera source {:?}", dir))?,
            ),
        };
        info!(source = %source.describe(), "Frame source opened");

        let sink: Box<dyn FrameSink> = match &config.daemon.frame_snapshot_path {
            Some(path) => {
                info!(path = %path.display(), "Writing frame snapshots");
                Box::new(PngFrameSink::new(path))
            }
            None => Box::new(NullFrameSink::new()),
        };

        let schedule = Schedule::new(config.periods.clone(), config.breaks.clone());
        let engine = MonitorEngine::new(
            roster,
            schedule,
            source,
            embedder,
            config.daemon.tolerance,
        );

        // Initialize IPC server
        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| config.daemon.socket_path.clone());
        let mut ipc = IpcServer::new(&socket_path);
        ipc.start().await?;

        info!(socket_path = %socket_path.display(), "IPC server started");

        Ok(Self {
            config,
            engine,
            sink,
            ipc,
        })
    }

    async fn run(self) -> Result<()> {
        let ipc = Arc::new(self.ipc);
        let mut ipc_messages = ipc
            .take_message_receiver()
            .await
            .expect("Message receiver should be available");

        let engine = Arc::new(Mutex::new(self.engine));
        let sink = Arc::new(Mutex::new(self.sink));

        // Spawn IPC accept task
        let ipc_accept = ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        // Set up signal handlers
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        // Two periodic tasks on one loop: the class-period reminder tick
        // and the camera monitoring tick, at the same configured cadence.
        // Skip semantics: a tick that overruns drops the missed firings
        // instead of queueing them.
        let mut reminder_timer = tokio::time::interval(self.config.daemon.tick_interval);
        reminder_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut camera_timer = tokio::time::interval(self.config.daemon.tick_interval);
        camera_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                // Reminder tick - period transitions and class reminders
                _ = reminder_timer.tick() => {
                    let now = WallClock::from_datetime(&rollcall_util::now());
                    let event = {
                        let mut engine = engine.lock().await;
                        engine.tick_reminder(now)
                    };
                    if let Some(event) = event {
                        Self::handle_core_event(&ipc, &sink, event).await;
                    }
                }

                // Camera tick - frame scan and alert policy
                _ = camera_timer.tick() => {
                    let now = WallClock::from_datetime(&rollcall_util::now());
                    let events = {
                        let mut engine = engine.lock().await;
                        engine.poll_camera(now)
                    };
                    for event in events {
                        Self::handle_core_event(&ipc, &sink, event).await;
                    }
                }

                // IPC messages
                Some(msg) = ipc_messages.recv() => {
                    Self::handle_ipc_message(&engine, &ipc, &sink, msg).await;
                }
            }
        }

        // Graceful shutdown: tell subscribers, remove the socket. The
        // frame source is released when the engine drops.
        info!("Shutting down rollcalld");
        ipc.broadcast_event(Event::new(EventPayload::Shutdown));
        ipc.shutdown();

        info!("Shutdown complete");
        Ok(())
    }

    async fn handle_core_event(
        ipc: &Arc<IpcServer>,
        sink: &Arc<Mutex<Box<dyn FrameSink>>>,
        event: CoreEvent,
    ) {
        match event {
            CoreEvent::ClassReminderDue { period } => {
                ipc.broadcast_event(Event::new(EventPayload::ClassReminder { period }));
            }

            CoreEvent::AbsenceAlert { student, period } => {
                ipc.broadcast_event(Event::new(EventPayload::AbsenceAlert { student, period }));
            }

            CoreEvent::BreakStarted { interval } => {
                ipc.broadcast_event(Event::new(EventPayload::BreakStarted { interval }));
            }

            CoreEvent::MonitoringStarted => {
                ipc.broadcast_event(Event::new(EventPayload::MonitoringStarted));
            }

            CoreEvent::AttendanceRecorded { absent, permitted } => {
                ipc.broadcast_event(Event::new(EventPayload::AttendanceRecorded {
                    absent,
                    permitted,
                }));
            }

            CoreEvent::FrameCaptured { frame, detections } => {
                // Presentation happens for every captured frame; a sink
                // failure is logged but never stops monitoring.
                if let Err(e) = sink.lock().await.present(&frame) {
                    warn!(error = %e, "Frame sink failed");
                }
                ipc.broadcast_event(Event::new(EventPayload::FrameCaptured(FrameInfo {
                    width: frame.width(),
                    height: frame.height(),
                    detections,
                })));
            }
        }
    }

    async fn handle_ipc_message(
        engine: &Arc<Mutex<MonitorEngine>>,
        ipc: &Arc<IpcServer>,
        sink: &Arc<Mutex<Box<dyn FrameSink>>>,
        msg: ServerMessage,
    ) {
        match msg {
            ServerMessage::Request { client_id, request } => {
                let response = if request.api_version != rollcall_api::API_VERSION {
                    Response::error(
                        request.request_id,
                        ErrorInfo::new(
                            ErrorCode::InvalidRequest,
                            format!(
                                "Unsupported API version {} (daemon speaks {})",
                                request.api_version,
                                rollcall_api::API_VERSION
                            ),
                        ),
                    )
                } else {
                    Self::handle_command(
                        engine,
                        ipc,
                        sink,
                        client_id,
                        request.request_id,
                        request.command,
                    )
                    .await
                };
                let _ = ipc.send_response(&client_id, response).await;
            }

            ServerMessage::ClientConnected { client_id } => {
                debug!(client_id = %client_id, "Client connected");
            }

            ServerMessage::ClientDisconnected { client_id } => {
                debug!(client_id = %client_id, "Client disconnected");
            }
        }
    }

    async fn handle_command(
        engine: &Arc<Mutex<MonitorEngine>>,
        ipc: &Arc<IpcServer>,
        sink: &Arc<Mutex<Box<dyn FrameSink>>>,
        client_id: rollcall_util::ClientId,
        request_id: u64,
        command: Command,
    ) -> Response {
        let now = WallClock::from_datetime(&rollcall_util::now());

        match command {
            Command::GetState => {
                let state = engine.lock().await.snapshot(now);
                Response::success(request_id, ResponsePayload::State(state))
            }

            Command::GetRoster => {
                let roster = engine.lock().await.roster_info();
                Response::success(request_id, ResponsePayload::Roster(roster))
            }

            Command::SubmitAttendance { sheet } => {
                let (events, state) = {
                    let mut eng = engine.lock().await;
                    let events = eng.submit_attendance(&sheet);
                    (events, eng.snapshot(now))
                };

                let mut absent = 0;
                let mut permitted = 0;
                for event in events {
                    if let CoreEvent::AttendanceRecorded {
                        absent: a,
                        permitted: p,
                    } = &event
                    {
                        absent = *a;
                        permitted = *p;
                    }
                    Self::handle_core_event(ipc, sink, event).await;
                }

                let monitoring_enabled = state.monitoring_enabled;
                ipc.broadcast_event(Event::new(EventPayload::StateChanged(state)));

                Response::success(
                    request_id,
                    ResponsePayload::AttendanceAccepted {
                        absent,
                        permitted,
                        monitoring_enabled,
                    },
                )
            }

            Command::SubscribeEvents => {
                // New subscribers get a snapshot so they can render
                // immediately instead of waiting for the next change.
                let state = engine.lock().await.snapshot(now);
                ipc.broadcast_event(Event::new(EventPayload::StateChanged(state)));

                Response::success(request_id, ResponsePayload::Subscribed { client_id })
            }

            Command::UnsubscribeEvents => {
                Response::success(request_id, ResponsePayload::Unsubscribed)
            }

            Command::GetHealth => {
                let eng = engine.lock().await;
                let roster_loaded = !eng.roster().is_empty();
                let frame_source_ok = eng.frame_source_ok();
                let health = HealthStatus {
                    live: true,
                    ready: roster_loaded && frame_source_ok,
                    roster_loaded,
                    frame_source_ok,
                };
                debug!(source = %eng.source_description(), frame_source_ok, "Health check");
                Response::success(request_id, ResponsePayload::Health(health))
            }

            Command::Ping => Response::success(request_id, ResponsePayload::Pong),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "rollcalld starting");

    if rollcall_util::is_mock_time_active() {
        warn!("Mock time is active; schedule follows ROLLCALL_MOCK_TIME");
    }

    // Create and run the service
    let service = Service::new(&args).await?;
    service.run().await
}
