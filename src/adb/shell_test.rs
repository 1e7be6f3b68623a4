use crate::adb::async_socket::AsyncAdbSocket;
use crate::adb::receiver::CollectingReceiver;
use crate::adb::shell::ShellCommand;
use crate::core::DeviceSerial;
use crate::error::AdbError;
use crate::testing::fixtures::host_requests;
use crate::testing::{EndOfInput, MockTransport, Wire};
use std::io;
use std::time::Duration;

#[tokio::test]
async fn test_run_streams_lines() {
    let transport = MockTransport::new(
        Wire::new()
            .okay()
            .okay()
            .raw(b"total 2\r\ndrwxrwx--x 2 root sdcard_rw Android\nno newline")
            .build(),
    )
    .with_max_read(7);
    let log = transport.writes();

    let mut receiver = CollectingReceiver::new();
    ShellCommand::new("ls -l /sdcard")
        .with_device(DeviceSerial::new("emulator-5554"))
        .run(AsyncAdbSocket::new(transport), &mut receiver)
        .await
        .unwrap();

    assert_eq!(
        receiver.lines(),
        ["total 2", "drwxrwx--x 2 root sdcard_rw Android", "no newline"]
    );
    assert!(receiver.is_flushed());
    assert_eq!(
        host_requests(&log.all()),
        vec!["host:transport:emulator-5554", "shell:ls -l /sdcard"]
    );
}

#[tokio::test]
async fn test_run_without_device_uses_default() {
    let transport = MockTransport::new(Wire::new().okay().raw(b"1\n").build());
    let log = transport.writes();

    let mut receiver = CollectingReceiver::new();
    ShellCommand::new("echo 1")
        .run(AsyncAdbSocket::new(transport), &mut receiver)
        .await
        .unwrap();

    assert_eq!(receiver.output(), "1");
    assert_eq!(host_requests(&log.all()), vec!["shell:echo 1"]);
}

#[tokio::test]
async fn test_run_stops_when_receiver_declines() {
    let transport = MockTransport::new(Wire::new().okay().raw(b"a\nb\nc\n").build());
    let mut seen = Vec::new();
    let mut receiver = |line: &str| {
        seen.push(line.to_string());
        false
    };

    ShellCommand::new("logcat")
        .run(AsyncAdbSocket::new(transport), &mut receiver)
        .await
        .unwrap();
    assert_eq!(seen, vec!["a"]);
}

#[tokio::test]
async fn test_read_failure_is_unresponsive() {
    let transport = MockTransport::new(Wire::new().okay().raw(b"partial\n").build())
        .at_end(EndOfInput::Fail(io::ErrorKind::ConnectionReset));

    let mut receiver = CollectingReceiver::new();
    let result = ShellCommand::new("top")
        .run(AsyncAdbSocket::new(transport), &mut receiver)
        .await;

    assert!(matches!(result, Err(AdbError::Unresponsive(_))));
    assert_eq!(receiver.lines(), ["partial"]);
}

#[tokio::test]
async fn test_cancel_stops_blocked_command() {
    let transport = MockTransport::new(Wire::new().okay().raw(b"waiting\n").build())
        .at_end(EndOfInput::Hang);
    let command = ShellCommand::new("logcat");
    let token = command.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let mut receiver = CollectingReceiver::new();
    let result = command.run(AsyncAdbSocket::new(transport), &mut receiver).await;

    assert!(matches!(result, Err(AdbError::Cancelled)));
    assert_eq!(receiver.lines(), ["waiting"]);
}

#[tokio::test]
async fn test_device_not_found() {
    let transport = MockTransport::new(Wire::new().fail("device not found").build());
    let mut receiver = CollectingReceiver::new();
    let result = ShellCommand::new("ls")
        .with_device(DeviceSerial::new("missing"))
        .run(AsyncAdbSocket::new(transport), &mut receiver)
        .await;
    assert!(matches!(result, Err(AdbError::DeviceNotFound(_))));
}
