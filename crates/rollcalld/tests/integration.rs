//! Integration tests for rollcalld
//!
//! These tests verify the end-to-end behavior of the service: the full
//! attendance-to-alert pipeline against the engine, and the IPC protocol
//! over a real Unix socket.

use rollcall_api::{AttendanceSheet, Command, Event, EventPayload, Response, ResponsePayload, ResponseResult};
use rollcall_config::parse_config;
use rollcall_core::{CoreEvent, MonitorEngine, Roster, Schedule};
use rollcall_ipc::{IpcClient, IpcServer, ServerMessage};
use rollcall_util::{PeriodId, StudentId, TimeInterval, WallClock};
use rollcall_vision::{Descriptor, Frame, MockEmbedder, MockFrameSource};
use std::sync::Arc;

fn clock(h: u8, m: u8) -> WallClock {
    WallClock::new(h, m).unwrap()
}

fn interval(start: WallClock, end: WallClock) -> TimeInterval {
    TimeInterval::new(start, end)
}

fn alice_descriptor() -> Descriptor {
    Descriptor::new(vec![1.0, 0.0])
}

fn bob_descriptor() -> Descriptor {
    Descriptor::new(vec![0.0, 1.0])
}

fn make_test_roster() -> Roster {
    Roster::from_parts(
        vec![StudentId::new("Alice"), StudentId::new("Bob")],
        vec![alice_descriptor(), bob_descriptor()],
    )
}

fn make_test_engine(schedule: Schedule, embedder: MockEmbedder) -> MonitorEngine {
    let source = MockFrameSource::with_default_frame(Frame::solid(4, 4, [0, 0, 0]));
    MonitorEngine::new(
        make_test_roster(),
        schedule,
        Box::new(source),
        Box::new(embedder),
        0.5,
    )
}

fn alerts(events: &[CoreEvent]) -> Vec<(StudentId, Option<PeriodId>)> {
    events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::AbsenceAlert { student, period } => Some((student.clone(), *period)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_absent_student_alerted_once_per_period() {
    let schedule = Schedule::new(
        vec![
            interval(clock(8, 0), clock(8, 45)),
            interval(clock(9, 0), clock(9, 45)),
        ],
        vec![],
    );
    // Alice is on camera every tick.
    let embedder = MockEmbedder::always(vec![alice_descriptor()]);
    let mut engine = make_test_engine(schedule, embedder);

    // Nobody checked present: everyone is absent, nobody is permitted.
    engine.submit_attendance(&AttendanceSheet::new());

    // First period becomes active.
    assert!(engine.tick_reminder(clock(8, 5)).is_some());

    let events = engine.poll_camera(clock(8, 5));
    assert_eq!(
        alerts(&events),
        vec![(
            StudentId::new("Alice"),
            Some(PeriodId::new(clock(8, 0)))
        )]
    );

    // Same period: deduplicated, even across many ticks.
    for minute in 6..10 {
        assert!(alerts(&engine.poll_camera(clock(8, minute))).is_empty());
    }

    // Next period re-arms the alert.
    assert!(engine.tick_reminder(clock(9, 5)).is_some());
    let events = engine.poll_camera(clock(9, 5));
    assert_eq!(
        alerts(&events),
        vec![(
            StudentId::new("Alice"),
            Some(PeriodId::new(clock(9, 0)))
        )]
    );
}

#[test]
fn test_permitted_student_never_alerts() {
    let schedule = Schedule::new(vec![interval(clock(8, 0), clock(8, 45))], vec![]);
    let embedder = MockEmbedder::always(vec![alice_descriptor()]);
    let mut engine = make_test_engine(schedule, embedder);

    let mut sheet = AttendanceSheet::new();
    sheet.set_permitted("Alice", true);
    engine.submit_attendance(&sheet);

    engine.tick_reminder(clock(8, 5));
    let events = engine.poll_camera(clock(8, 5));
    assert!(alerts(&events).is_empty());
    // The frame is still scanned and presented.
    assert!(events
        .iter()
        .any(|e| matches!(e, CoreEvent::FrameCaptured { detections: 1, .. })));
}

#[test]
fn test_present_student_never_alerts() {
    let schedule = Schedule::new(vec![interval(clock(8, 0), clock(8, 45))], vec![]);
    let embedder = MockEmbedder::always(vec![alice_descriptor(), bob_descriptor()]);
    let mut engine = make_test_engine(schedule, embedder);

    // Alice is present in the room; only Bob is absent.
    let mut sheet = AttendanceSheet::new();
    sheet.set_present("Alice", true);
    engine.submit_attendance(&sheet);

    engine.tick_reminder(clock(8, 5));
    let events = engine.poll_camera(clock(8, 5));
    assert_eq!(alerts(&events), vec![(
        StudentId::new("Bob"),
        Some(PeriodId::new(clock(8, 0)))
    )]);
}

#[test]
fn test_alert_between_periods_carries_no_period() {
    let schedule = Schedule::new(vec![interval(clock(8, 0), clock(8, 45))], vec![]);
    let embedder = MockEmbedder::always(vec![alice_descriptor()]);
    let mut engine = make_test_engine(schedule, embedder);

    engine.submit_attendance(&AttendanceSheet::new());

    // Alert during the period first.
    engine.tick_reminder(clock(8, 5));
    assert_eq!(alerts(&engine.poll_camera(clock(8, 5))).len(), 1);

    // Period ends; the between-periods sighting alerts once with no period.
    engine.tick_reminder(clock(8, 50));
    let events = engine.poll_camera(clock(8, 50));
    assert_eq!(alerts(&events), vec![(StudentId::new("Alice"), None)]);

    // And stays quiet while between periods.
    assert!(alerts(&engine.poll_camera(clock(8, 51))).is_empty());
}

#[test]
fn test_break_pauses_camera_polling() {
    let schedule = Schedule::new(vec![], vec![interval(clock(2, 45), clock(2, 50))]);
    let source = MockFrameSource::with_default_frame(Frame::solid(4, 4, [0, 0, 0]));
    let embedder = MockEmbedder::always(vec![alice_descriptor()]);
    let mut engine = MonitorEngine::new(
        make_test_roster(),
        schedule,
        Box::new(source.clone()),
        Box::new(embedder),
        0.5,
    );
    engine.submit_attendance(&AttendanceSheet::new());

    // Inside the break: one notice, no frame grabs at all.
    let events = engine.poll_camera(clock(2, 46));
    assert!(matches!(events[0], CoreEvent::BreakStarted { .. }));
    assert!(engine.poll_camera(clock(2, 47)).is_empty());
    assert_eq!(source.grab_count(), 0);

    // The break end is excluded, so polling resumes exactly at 02:50.
    let events = engine.poll_camera(clock(2, 50));
    assert!(events
        .iter()
        .any(|e| matches!(e, CoreEvent::FrameCaptured { .. })));
    assert_eq!(source.grab_count(), 1);
}

#[test]
fn test_overlapping_periods_first_listed_wins() {
    let schedule = Schedule::new(
        vec![
            interval(clock(8, 0), clock(9, 0)),
            interval(clock(8, 30), clock(9, 30)),
        ],
        vec![],
    );
    let embedder = MockEmbedder::always(vec![alice_descriptor()]);
    let mut engine = make_test_engine(schedule, embedder);
    engine.submit_attendance(&AttendanceSheet::new());

    // 08:35 falls in both periods; the first listed one identifies it.
    engine.tick_reminder(clock(8, 35));
    let snapshot = engine.snapshot(clock(8, 35));
    assert_eq!(snapshot.current_period, Some(PeriodId::new(clock(8, 0))));

    let events = engine.poll_camera(clock(8, 35));
    assert_eq!(
        alerts(&events),
        vec![(
            StudentId::new("Alice"),
            Some(PeriodId::new(clock(8, 0)))
        )]
    );
}

#[test]
fn test_resubmission_does_not_rearm_alerts() {
    let schedule = Schedule::new(vec![interval(clock(8, 0), clock(8, 45))], vec![]);
    let embedder = MockEmbedder::always(vec![alice_descriptor()]);
    let mut engine = make_test_engine(schedule, embedder);

    engine.submit_attendance(&AttendanceSheet::new());
    engine.tick_reminder(clock(8, 5));
    assert_eq!(alerts(&engine.poll_camera(clock(8, 5))).len(), 1);

    // Re-submitting the sheet mid-period leaves alert markers untouched.
    engine.submit_attendance(&AttendanceSheet::new());
    assert!(alerts(&engine.poll_camera(clock(8, 6))).is_empty());
}

#[test]
fn test_config_parsing() {
    let config = r#"
        config_version = 1

        [daemon]
        tick_interval_secs = 2
        tolerance = 0.6

        [camera]
        type = "image_dir"
        dir = "/var/lib/rollcall/frames"

        [embedder]
        type = "command"
        program = "/usr/libexec/rollcall-embed"
        args = ["--model", "hog"]

        [[students]]
        name = "Alice"
        image = "/etc/rollcall/photos/alice.png"

        [[students]]
        name = "Bob"
        image = "/etc/rollcall/photos/bob.png"

        [[schedule.periods]]
        start = "08:00"
        end = "08:38"

        [[schedule.periods]]
        start = "08:57"
        end = "09:35"

        [[schedule.breaks]]
        start = "02:45"
        end = "02:50"
    "#;

    let config = parse_config(config).unwrap();
    assert_eq!(config.students.len(), 2);
    assert_eq!(config.students[0].name, StudentId::new("Alice"));
    assert_eq!(config.periods.len(), 2);
    assert_eq!(config.periods[0].start, clock(8, 0));
    assert_eq!(config.breaks.len(), 1);
    assert_eq!(config.daemon.tick_interval.as_secs(), 2);
    assert!((config.daemon.tolerance - 0.6).abs() < f32::EPSILON);
}

/// Spawns a server with a minimal command handler, mirroring the daemon's
/// request loop, and returns the socket path to connect to.
async fn spawn_test_server(socket_path: &std::path::Path) -> Arc<IpcServer> {
    let mut server = IpcServer::new(socket_path);
    server.start().await.unwrap();
    let server = Arc::new(server);

    let mut messages = server.take_message_receiver().await.unwrap();

    let accept = server.clone();
    tokio::spawn(async move {
        let _ = accept.run().await;
    });

    let handler = server.clone();
    tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            if let ServerMessage::Request { client_id, request } = msg {
                let response = match request.command {
                    Command::Ping => Response::success(request.request_id, ResponsePayload::Pong),
                    Command::SubmitAttendance { sheet } => {
                        let absent = sheet.present.values().filter(|p| !**p).count();
                        handler.broadcast_event(Event::new(EventPayload::AttendanceRecorded {
                            absent,
                            permitted: 0,
                        }));
                        Response::success(
                            request.request_id,
                            ResponsePayload::AttendanceAccepted {
                                absent,
                                permitted: 0,
                                monitoring_enabled: true,
                            },
                        )
                    }
                    Command::SubscribeEvents => Response::success(
                        request.request_id,
                        ResponsePayload::Subscribed { client_id },
                    ),
                    _ => Response::success(request.request_id, ResponsePayload::Pong),
                };
                let _ = handler.send_response(&client_id, response).await;
            }
        }
    });

    server
}

#[tokio::test]
async fn test_ipc_ping_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("rollcalld.sock");
    let _server = spawn_test_server(&socket_path).await;

    let mut client = IpcClient::connect(&socket_path).await.unwrap();
    let response = client.send(Command::Ping).await.unwrap();

    assert!(matches!(
        response.result,
        ResponseResult::Ok(ResponsePayload::Pong)
    ));
}

#[tokio::test]
async fn test_ipc_submission_reaches_subscribers() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("rollcalld.sock");
    let server = spawn_test_server(&socket_path).await;

    // One subscriber, one submitter.
    let subscriber = IpcClient::connect(&socket_path).await.unwrap();
    let mut events = subscriber.subscribe().await.unwrap();

    let mut submitter = IpcClient::connect(&socket_path).await.unwrap();
    let mut sheet = AttendanceSheet::new();
    sheet.set_present("Alice", false);
    let response = submitter
        .send(Command::SubmitAttendance { sheet })
        .await
        .unwrap();

    match response.result {
        ResponseResult::Ok(ResponsePayload::AttendanceAccepted { absent, .. }) => {
            assert_eq!(absent, 1)
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.next())
        .await
        .expect("timed out waiting for event")
        .unwrap();
    assert!(matches!(
        event.payload,
        EventPayload::AttendanceRecorded { absent: 1, .. }
    ));

    assert_eq!(server.client_count().await, 2);
}

#[tokio::test]
async fn test_ipc_unsubscribed_client_gets_no_events() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("rollcalld.sock");
    let server = spawn_test_server(&socket_path).await;

    let mut client = IpcClient::connect(&socket_path).await.unwrap();
    // Never subscribes; a broadcast must not land on its response stream.
    server.broadcast_event(Event::new(EventPayload::MonitoringStarted));

    let response = client.send(Command::Ping).await.unwrap();
    assert!(matches!(
        response.result,
        ResponseResult::Ok(ResponsePayload::Pong)
    ));
}
