use crate::adb::async_socket::AsyncAdbSocket;
use crate::adb::protocol::{AdbResponse, SyncCommand};
use crate::error::AdbError;
use crate::testing::{EndOfInput, MockTransport, Wire};
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn socket(response: impl Into<Vec<u8>>) -> AsyncAdbSocket<MockTransport> {
    AsyncAdbSocket::new(MockTransport::new(response))
}

#[tokio::test]
async fn test_send_adb_request() {
    let mut socket = socket(Vec::new());
    socket.send_adb_request("host:version").await.unwrap();
    assert_eq!(socket.transport().written(), b"000Chost:version");
}

#[tokio::test]
async fn test_receive_over_partial_reads() {
    let mut socket = AsyncAdbSocket::new(MockTransport::new(b"abcdef".to_vec()).with_max_read(2));
    let mut buf = [0u8; 6];
    socket.receive_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"abcdef");
}

#[tokio::test]
async fn test_receive_short_on_eof() {
    let mut socket = socket(b"ab".to_vec());
    let mut buf = [0u8; 4];
    assert_eq!(socket.receive(&mut buf).await.unwrap(), 2);
    assert!(matches!(
        socket.receive_exact(&mut buf).await,
        Err(AdbError::ChannelEof { expected: 4, received: 0 })
    ));
}

#[tokio::test]
async fn test_read_response_status_matches_blocking_framing() {
    let mut socket = socket(Wire::new().okay().fail("no devices/emulators found").build());
    assert_eq!(socket.read_response_status().await.unwrap(), AdbResponse::Okay);
    assert_eq!(
        socket.read_response_status().await.unwrap(),
        AdbResponse::Fail("no devices/emulators found".to_string())
    );
}

#[tokio::test]
async fn test_set_device_not_found_closes_socket() {
    let mut socket = socket(Wire::new().fail("device not found").build());
    assert!(matches!(
        socket.set_device("emulator-5556").await,
        Err(AdbError::DeviceNotFound(_))
    ));
    assert!(!socket.is_connected());
}

#[tokio::test]
async fn test_read_string() {
    let mut socket = socket(Wire::new().hex_string("0029").build());
    assert_eq!(socket.read_string().await.unwrap(), "0029");
}

#[tokio::test]
async fn test_sync_primitives() {
    let mut socket = socket(Wire::new().raw(b"DONE").empty_tag().u32_le(3).raw(b"abc").build());
    assert_eq!(socket.read_sync_response().await.unwrap(), Some(SyncCommand::Done));
    assert_eq!(socket.read_sync_response().await.unwrap(), None);
    assert_eq!(socket.read_sync_string().await.unwrap(), "abc");
    assert_eq!(socket.read_sync_response().await.unwrap(), None);
}

#[tokio::test]
async fn test_cancel_aborts_blocked_read() {
    let token = CancellationToken::new();
    let transport = MockTransport::new(Vec::new()).at_end(EndOfInput::Hang);
    let mut socket = AsyncAdbSocket::new(transport).with_cancellation(token.clone());

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let mut buf = [0u8; 4];
    assert!(matches!(socket.receive(&mut buf).await, Err(AdbError::Cancelled)));
    assert!(socket.is_cancelled());
    assert!(!socket.is_connected());
}

#[tokio::test]
async fn test_cancelled_token_stops_writes() {
    let token = CancellationToken::new();
    token.cancel();
    let mut socket = socket(Vec::new()).with_cancellation(token);

    assert!(matches!(socket.send(b"0000").await, Err(AdbError::Cancelled)));
    assert!(socket.transport().written().is_empty());
}

#[tokio::test]
async fn test_io_error_without_cancellation_is_transport() {
    let transport = MockTransport::new(Vec::new()).at_end(EndOfInput::Fail(io::ErrorKind::ConnectionReset));
    let mut socket = AsyncAdbSocket::new(transport);
    let mut buf = [0u8; 1];
    match socket.read_chunk(&mut buf).await {
        Err(AdbError::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reconnect_moves_to_next_session() {
    let transport = MockTransport::with_sessions(vec![b"1".to_vec(), b"2".to_vec()]);
    let mut socket = AsyncAdbSocket::new(transport);
    socket.reconnect(true).await.unwrap();

    let mut buf = [0u8; 1];
    socket.receive_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"2");
}

#[tokio::test]
async fn test_read_sync_string_uses_configured_limit() {
    let mut socket = socket(Wire::new().u32_le(5).raw(b"hello").build());
    socket.set_max_string_size(4);
    assert!(matches!(
        socket.read_sync_string().await,
        Err(AdbError::Protocol(_))
    ));
}

#[tokio::test]
async fn test_receive_in_configured_chunks() {
    let mut socket = socket(b"abcdefg".to_vec()).with_receive_buffer_size(3);
    let mut buf = [0u8; 7];
    assert_eq!(socket.receive(&mut buf).await.unwrap(), 7);
    assert_eq!(&buf, b"abcdefg");
}
