//! Integration tests for cluster_logging
//!
//! These tests verify:
//! - Per-subsystem gating through the public entry points
//! - Throttle behavior end to end over in-memory and pipe channels
//! - Saved-record replay after backpressure
//! - Configuration loading
//! - Independence of handles

use cluster_logging::channels::{LogReader, MemoryChannel};
use cluster_logging::core::{
    Delivery, LogHandle, LogLevel, LoggerError, LoggingConfig, Subsystem, UNTHROTTLE_AFTER,
};
use cluster_logging::{log_err, log_info};
use std::time::Duration;

#[test]
fn test_end_to_end_gating_and_delivery() {
    let (channel, reader) = MemoryChannel::bounded(64 * 1024);
    let handle = LogHandle::builder().channel(channel).build().unwrap();
    handle.set_level(Subsystem::TRANSPORT, LogLevel::Info).unwrap();

    handle.log(Subsystem::TRANSPORT, LogLevel::Debug, "frame dump");
    assert!(reader.take_records().is_empty());
    assert_eq!(handle.metrics().throttled(), 0, "gated before the engine");

    handle.log(Subsystem::TRANSPORT, LogLevel::Info, "link up");
    let records = reader.take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message(), "link up");
    assert_eq!(records[0].level, LogLevel::Info);
    assert_eq!(handle.metrics().delivered(), 1);
}

#[test]
fn test_backpressure_tightens_and_recovery_relaxes() {
    let (channel, reader) = MemoryChannel::with_record_capacity(1);
    let handle = LogHandle::builder()
        .default_level(LogLevel::Debug)
        .channel(channel)
        .build()
        .unwrap();

    handle.log(Subsystem::LINK, LogLevel::Error, "fills the channel");
    for i in 0..10 {
        handle.log(Subsystem::LINK, LogLevel::Error, format!("blocked {}", i));
    }
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Warning);

    // consumer catches up; "blocked 9" is still saved and goes out with the next record
    let first = reader.take_records();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].message(), "fills the channel");

    handle.log(Subsystem::LINK, LogLevel::Warning, "recovered");
    let messages: Vec<String> = reader
        .take_records()
        .iter()
        .map(|r| r.message().into_owned())
        .collect();
    assert_eq!(messages, vec!["blocked 9"]);
    // the channel only holds one record, so "recovered" hit backpressure and,
    // being at the threshold, was not retained
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Warning);
    assert!(!handle.throttle_snapshot().has_saved_record);

    handle.log(Subsystem::LINK, LogLevel::Warning, "drained");
    assert_eq!(reader.take_records()[0].message(), "drained");
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Info);
}

#[test]
fn test_low_priority_flood_unlocks_verbosity() {
    let (channel, reader) = MemoryChannel::with_record_capacity(1);
    let handle = LogHandle::builder()
        .default_level(LogLevel::Debug)
        .channel(channel)
        .build()
        .unwrap();

    // "x" fills the channel, then two retry-later outcomes: Debug -> Info -> Warning.
    // "z" sits at the threshold when it blocks, so nothing is left saved.
    handle.log(Subsystem::RX, LogLevel::Info, "x");
    handle.log(Subsystem::RX, LogLevel::Info, "y");
    handle.log(Subsystem::RX, LogLevel::Info, "z");
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Warning);
    reader.take_records();

    let mut outcomes = Vec::new();
    for i in 0..UNTHROTTLE_AFTER {
        outcomes.push(
            handle
                .submit(Subsystem::RX, LogLevel::Info, format_args!("info {}", i))
                .unwrap(),
        );
    }
    assert!(outcomes[..39].iter().all(|o| *o == Delivery::Throttled));
    assert_eq!(outcomes[39], Delivery::Delivered);
    assert_eq!(reader.take_records()[0].message(), "info 39");
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Debug);
}

#[test]
fn test_config_driven_handle() {
    let config = LoggingConfig::from_json(
        r#"{ "default_level": "error", "subsystems": { "heartbeat": "debug" } }"#,
    )
    .unwrap();
    let (channel, reader) = MemoryChannel::bounded(64 * 1024);
    let handle = config.to_builder().unwrap().channel(channel).build().unwrap();

    log_info!(handle, Subsystem::HEARTBEAT, "beat {}", 1);
    log_info!(handle, Subsystem::HOST, "suppressed");
    log_err!(handle, Subsystem::HOST, "host {} unreachable", 3);

    let messages: Vec<String> = reader
        .take_records()
        .iter()
        .map(|r| r.message().into_owned())
        .collect();
    assert_eq!(messages, vec!["beat 1", "host 3 unreachable"]);
}

#[test]
fn test_administrative_errors() {
    let handle = LogHandle::new();

    let err = handle.set_level(Subsystem(9), LogLevel::Debug).unwrap_err();
    assert!(matches!(err, LoggerError::InvalidSubsystem { id: 9 }));

    let err = handle.set_level(Subsystem::LINK, 4u8).unwrap_err();
    assert!(matches!(err, LoggerError::InvalidLevel { level: 4 }));
    assert_eq!(handle.get_level(Subsystem::LINK).unwrap(), LogLevel::Info);

    assert!(handle.get_level(Subsystem(100)).is_err());
    handle.set_level(Subsystem::UNKNOWN, LogLevel::Debug).unwrap();
}

#[test]
fn test_handles_have_independent_throttles() {
    let (blocked, _blocked_reader) = MemoryChannel::bounded(1);
    let (healthy, healthy_reader) = MemoryChannel::bounded(64 * 1024);
    let a = LogHandle::builder().channel(blocked).build().unwrap();
    let b = LogHandle::builder().channel(healthy).build().unwrap();

    for _ in 0..5 {
        a.log(Subsystem::TX, LogLevel::Error, "stuck");
    }
    b.log(Subsystem::TX, LogLevel::Info, "fine");

    assert_eq!(a.throttle_snapshot().threshold, LogLevel::Warning);
    assert_eq!(b.throttle_snapshot().threshold, LogLevel::Debug);
    let records = healthy_reader.take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].handle, b.id());
}

#[test]
fn test_broken_channel_is_invisible_to_caller() {
    let (channel, reader) = MemoryChannel::bounded(64 * 1024);
    let handle = LogHandle::builder().channel(channel).build().unwrap();
    reader.close();

    let outcome = handle.submit(Subsystem::COMMON, LogLevel::Error, format_args!("lost"));
    assert_eq!(outcome, Some(Delivery::Failed));
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Debug);
    assert_eq!(handle.metrics().failed(), 1);
}

#[test]
fn test_channel_attached_later() {
    let handle = LogHandle::new();
    handle.log(Subsystem::HOST, LogLevel::Error, "before");
    assert_eq!(handle.metrics().unrouted(), 1);

    let (channel, reader) = MemoryChannel::bounded(64 * 1024);
    assert!(handle.set_channel(channel).is_none());
    handle.log(Subsystem::HOST, LogLevel::Error, "after");
    let records = reader.take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message(), "after");
}

#[cfg(unix)]
#[test]
fn test_pipe_with_reader_thread() {
    use cluster_logging::channels::pipe;

    let (channel, read_end) = pipe::channel().unwrap();
    let reader = LogReader::spawn(read_end).unwrap();
    let handle = LogHandle::builder()
        .default_level(LogLevel::Debug)
        .channel(channel)
        .build()
        .unwrap();

    handle.log(Subsystem::CRYPTO, LogLevel::Warning, "cipher downgraded");
    handle.log(Subsystem::CRYPTO, LogLevel::Debug, "key id 17");

    let first = reader.records().recv_timeout(Duration::from_secs(5)).unwrap();
    let second = reader.records().recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first.record.message(), "cipher downgraded");
    assert_eq!(second.record.level, LogLevel::Debug);
    assert!(second.render().contains("[crypto] key id 17"));

    // closing the write end ends the reader
    drop(handle);
    assert_eq!(reader.join().unwrap(), 2);
}

#[cfg(unix)]
#[test]
fn test_full_pipe_never_blocks_and_holds_floor() {
    use cluster_logging::channels::pipe;

    let (channel, _read_end) = pipe::channel().unwrap();
    let handle = LogHandle::builder()
        .default_level(LogLevel::Debug)
        .channel(channel)
        .build()
        .unwrap();

    // nobody reads: the pipe fills, then every write is a retry-later outcome
    for i in 0..5_000 {
        handle.log(Subsystem::TRANSP_UDP, LogLevel::Error, format!("flood {}", i));
        assert!(handle.throttle_snapshot().threshold >= LogLevel::Warning);
    }
    assert!(handle.metrics().deferred() > 0);
    assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Warning);
}
