use super::connection::AdbConnection;
use super::shell::{CollectingReceiver, FnReceiver, ShellStream};
use crate::core::types::{DeviceId, TextEncoding};
use crate::error::AdbError;
use crate::testing::fixtures::{fail, okay};
use crate::testing::{MockHandle, MockTransport};

fn shell_connection(output: &[u8]) -> (AdbConnection, MockHandle) {
    let mut input = okay(); // host:transport
    input.extend(okay()); // shell:
    input.extend_from_slice(output);
    let transport = MockTransport::new().with_input(input).with_max_read(7);
    let handle = transport.handle();
    (
        AdbConnection::new(transport.boxed(), TextEncoding::Utf8),
        handle,
    )
}

#[tokio::test]
async fn test_shell_sends_handshake_then_command() {
    let (conn, handle) = shell_connection(b"");
    let device = DeviceId::new("emulator-5554");

    let mut stream = ShellStream::open(conn, &device, "getprop ro.product.model")
        .await
        .unwrap();
    assert!(stream.read_to_end().await.unwrap().is_empty());

    let mut expected = b"001Chost:transport:emulator-5554".to_vec();
    expected.extend_from_slice(b"001Eshell:getprop ro.product.model");
    assert_eq!(handle.written(), expected);
}

#[tokio::test]
async fn test_shell_streams_until_eof() {
    let (conn, _) = shell_connection(b"line one\r\nline two\nno newline");
    let mut stream = ShellStream::open(conn, &DeviceId::new("abc"), "cat f")
        .await
        .unwrap();

    let mut receiver = CollectingReceiver::new();
    stream.pump(&mut receiver).await.unwrap();

    assert_eq!(receiver.lines(), ["line one", "line two", "no newline"]);
    assert!(stream.is_finished());
}

#[tokio::test]
async fn test_shell_raw_chunks() {
    let (conn, _) = shell_connection(b"0123456789");
    let mut stream = ShellStream::open(conn, &DeviceId::new("abc"), "seq")
        .await
        .unwrap();

    let mut collected = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let n = stream.read_chunk(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n]);
    }
    assert_eq!(collected, b"0123456789");
    assert_eq!(stream.read_chunk(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn test_shell_fn_receiver() {
    let (conn, _) = shell_connection(b"a\nb\n");
    let mut stream = ShellStream::open(conn, &DeviceId::new("abc"), "ls")
        .await
        .unwrap();

    let mut count = 0;
    stream
        .pump(&mut FnReceiver(|_: &str| count += 1))
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_shell_rejected_by_server() {
    let mut input = okay();
    input.extend(fail("closed"));
    let transport = MockTransport::new().with_input(input);
    let conn = AdbConnection::new(transport.boxed(), TextEncoding::Utf8);

    let err = ShellStream::open(conn, &DeviceId::new("abc"), "ls")
        .await
        .err()
        .unwrap();
    assert!(matches!(&err, AdbError::Server(m) if m == "closed"));
}

#[tokio::test]
async fn test_shell_cancel_surfaces_cancelled() {
    let (conn, _) = shell_connection(b"partial output");
    let mut stream = ShellStream::open(conn, &DeviceId::new("abc"), "logcat")
        .await
        .unwrap();

    stream.cancellation_token().cancel();
    let mut receiver = CollectingReceiver::new();
    let err = stream.pump(&mut receiver).await.unwrap_err();
    assert!(matches!(err, AdbError::Cancelled));
}

#[tokio::test]
async fn test_shell_empty_command_rejected() {
    let (conn, handle) = shell_connection(b"");
    let err = ShellStream::open(conn, &DeviceId::new("abc"), "")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AdbError::InvalidArgument(_)));
    assert!(handle.written().is_empty());
}
