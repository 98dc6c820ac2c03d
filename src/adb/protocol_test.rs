use super::protocol::{
    decode_length, encode_request, encode_sync_header, encode_sync_request, AdbCommand,
    SyncCommand, MAX_PAYLOAD_LENGTH,
};
use crate::error::AdbError;

#[test]
fn test_encode_request_known_frames() {
    assert_eq!(&encode_request("host:kill").unwrap()[..], b"0009host:kill");
    assert_eq!(
        &encode_request("host:transport:emulator-5554").unwrap()[..],
        b"001Chost:transport:emulator-5554"
    );
    assert_eq!(&encode_request("").unwrap()[..], b"0000");
}

#[test]
fn test_encode_request_uses_byte_length() {
    // "é" is two bytes in UTF-8
    let frame = encode_request("é").unwrap();
    assert_eq!(&frame[..4], b"0002");
}

#[test]
fn test_framing_round_trip() {
    for len in [0usize, 1, 15, 16, 255, 256, 4095, 4096, 65534, MAX_PAYLOAD_LENGTH] {
        let payload = "a".repeat(len);
        let frame = encode_request(&payload).unwrap();
        assert_eq!(decode_length(&frame[..4]).unwrap(), len);
        assert_eq!(&frame[4..], payload.as_bytes());
    }
}

#[test]
fn test_oversized_payload_rejected() {
    let payload = "a".repeat(MAX_PAYLOAD_LENGTH + 1);
    let err = encode_request(&payload).unwrap_err();
    assert!(matches!(err, AdbError::InvalidArgument(_)));

    assert!(encode_request(&"a".repeat(65535)).is_ok());
}

#[test]
fn test_decode_length() {
    assert_eq!(decode_length(b"001C").unwrap(), 28);
    assert_eq!(decode_length(b"001c").unwrap(), 28);
    assert_eq!(decode_length(b"FFFF").unwrap(), 65535);
}

#[test]
fn test_decode_length_rejects_non_hex() {
    for bad in [&b"00G1"[..], b"+0FF", b" 001", b"001", b"00001"] {
        let err = decode_length(bad).unwrap_err();
        assert!(matches!(err, AdbError::Format(_)), "accepted {:?}", bad);
    }
}

#[test]
fn test_sync_command_round_trip() {
    for command in SyncCommand::ALL {
        let bytes = command.to_bytes();
        assert_eq!(bytes.len(), 4);
        assert_eq!(&bytes, command.as_str().as_bytes());
        assert_eq!(SyncCommand::from_bytes(&bytes).unwrap(), command);
        assert_eq!(SyncCommand::from_u32(command as u32), Some(command));
    }
}

#[test]
fn test_unknown_sync_command() {
    let err = SyncCommand::from_bytes(b"NOPE").unwrap_err();
    assert!(matches!(err, AdbError::InvalidSyncCommand(raw) if &raw == b"NOPE"));

    let err = SyncCommand::from_bytes(b"DAT").unwrap_err();
    assert!(matches!(err, AdbError::InvalidArgument(_)));
}

#[test]
fn test_sync_header_layout() {
    let header = encode_sync_header(SyncCommand::Data, 0x0001_0000);
    assert_eq!(&header, b"DATA\x00\x00\x01\x00");

    let request = encode_sync_request(SyncCommand::Stat, "/sdcard");
    assert_eq!(&request[..], b"STAT\x07\x00\x00\x00/sdcard");
}

#[test]
fn test_forward_commands() {
    assert_eq!(
        AdbCommand::ForwardNoRebind.format(&["emulator-5554", "tcp:6100", "tcp:7100"]),
        "host-serial:emulator-5554:forward:norebind:tcp:6100;tcp:7100"
    );
    assert_eq!(
        AdbCommand::KillForward.format(&["abc", "tcp:6100"]),
        "host-serial:abc:killforward:tcp:6100"
    );
    assert_eq!(
        AdbCommand::ReverseForward.format(&["tcp:8080", "localabstract:chrome"]),
        "reverse:forward:tcp:8080;localabstract:chrome"
    );
    assert_eq!(
        AdbCommand::ReverseListForward.format(&[]),
        "reverse:list-forward"
    );
}

#[test]
fn test_commands_with_special_chars() {
    assert_eq!(
        AdbCommand::Shell.format(&["echo 'hello world'"]),
        "shell:echo 'hello world'"
    );
    assert_eq!(
        AdbCommand::Transport.format(&["192.168.1.100:5555"]),
        "host:transport:192.168.1.100:5555"
    );
    assert_eq!(
        AdbCommand::Shell.format(&["dumpsys battery | grep level"]),
        "shell:dumpsys battery | grep level"
    );
}
