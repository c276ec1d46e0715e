use logging_service::{registry, CaptureBuffer, LogLevel, Logger, LoggerConfig, SharedLoggerLayer};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;
use tracing_subscriber::prelude::*;

fn capture_console(log: &Logger) -> CaptureBuffer {
    let capture = CaptureBuffer::new();
    log.console()
        .expect("console sink should be active")
        .set_stream(Box::new(capture.clone()));
    capture
}

/// Two "modules" acquiring the logger independently end up writing through
/// one configuration
#[test]
#[serial]
fn test_modules_share_one_logger() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.log");

    let audio = registry::acquire(
        LoggerConfig::default()
            .with_destination(&path)
            .with_also_console(false)
            .with_message_prefix("app"),
        true,
    )
    .unwrap();
    let network = registry::acquire(
        LoggerConfig::default().with_level(LogLevel::Critical),
        false,
    )
    .unwrap();

    audio.info("audio started");
    network.info("socket open");
    network.set_level(LogLevel::Warn);
    audio.info("hidden everywhere");
    audio.warn("buffer underrun");

    let lines: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(";INFO: audio started"));
    assert!(lines[1].ends_with(";INFO: socket open"));
    assert!(lines[2].ends_with(";WARNING: buffer underrun"));
}

#[test]
#[serial]
fn test_forced_replacement_orphans_old_handles() {
    let old = registry::acquire(LoggerConfig::default().with_name("old"), true).unwrap();
    let old_capture = capture_console(&old);

    let new = registry::acquire(
        LoggerConfig::default()
            .with_name("new")
            .with_level(LogLevel::Error),
        true,
    )
    .unwrap();
    let new_capture = capture_console(&new);

    // The old handle keeps its own state and sinks
    assert_eq!(old.name(), "old");
    assert_eq!(old.level().name, Some("INFO"));
    old.info("old still works");
    assert!(old_capture.contents().ends_with("old still works\n"));
    assert!(new_capture.is_empty());

    // Later acquirers get the replacement
    let later = registry::logger().unwrap();
    assert!(later.ptr_eq(&new));
    later.err("new instance");
    assert!(new_capture.contents().ends_with("new instance\n"));
}

#[test]
#[serial]
fn test_tracing_events_follow_registry() {
    let first = registry::acquire(LoggerConfig::default(), true).unwrap();
    let first_capture = capture_console(&first);

    let subscriber = tracing_subscriber::registry().with(SharedLoggerLayer::global());
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(user = 42, "login");
        tracing::debug!("below the floor");

        let second = registry::acquire(LoggerConfig::default(), true).unwrap();
        let second_capture = capture_console(&second);
        tracing::error!("after replacement");

        assert!(second_capture.contents().ends_with(";ERROR: after replacement\n"));
    });

    let out = first_capture.contents();
    assert!(out.ends_with(";INFO: login user=42\n"));
    assert!(!out.contains("below the floor"));
    assert!(!out.contains("after replacement"));
}

#[test]
#[serial]
fn test_pinned_layer_ignores_replacement() {
    let pinned = registry::acquire(LoggerConfig::default(), true).unwrap();
    let capture = capture_console(&pinned);
    let subscriber = tracing_subscriber::registry().with(SharedLoggerLayer::new(pinned.clone()));

    let _replacement = registry::acquire(LoggerConfig::default(), true).unwrap();
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!("still pinned");
    });

    assert!(capture.contents().ends_with(";WARNING: still pinned\n"));
}
