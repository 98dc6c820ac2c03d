use crate::adb::protocol::{encode_sync_header, SyncCommand};
use crate::core::types::{DeviceData, DeviceState};

/// `OKAY` status
pub fn okay() -> Vec<u8> {
    b"OKAY".to_vec()
}

/// `FAIL` status followed by a length-prefixed message
pub fn fail(message: &str) -> Vec<u8> {
    let mut out = b"FAIL".to_vec();
    out.extend(hex_string(message));
    out
}

/// Length-prefixed string as the server sends it
pub fn hex_string(s: &str) -> Vec<u8> {
    let mut out = format!("{:04X}", s.len()).into_bytes();
    out.extend_from_slice(s.as_bytes());
    out
}

/// `OKAY` followed by a length-prefixed reply
pub fn okay_with(s: &str) -> Vec<u8> {
    let mut out = okay();
    out.extend(hex_string(s));
    out
}

/// Sync frame: header with the payload length, then the payload
pub fn sync_frame(command: SyncCommand, payload: &[u8]) -> Vec<u8> {
    let mut out = encode_sync_header(command, payload.len() as u32).to_vec();
    out.extend_from_slice(payload);
    out
}

/// Bare sync header carrying a metadata word
pub fn sync_header(command: SyncCommand, value: u32) -> Vec<u8> {
    encode_sync_header(command, value).to_vec()
}

/// v1 `STAT` reply
pub fn stat_v1(mode: u32, size: u32, mtime: u32) -> Vec<u8> {
    let mut out = SyncCommand::Stat.to_bytes().to_vec();
    out.extend_from_slice(&mode.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&mtime.to_le_bytes());
    out
}

/// v2 stat body (68 bytes, without the command id)
pub fn stat_v2_body(error: u32, mode: u32, size: u64, mtime: i64) -> Vec<u8> {
    let mut out = Vec::with_capacity(68);
    out.extend_from_slice(&error.to_le_bytes());
    out.extend_from_slice(&0x1234u64.to_le_bytes()); // dev
    out.extend_from_slice(&42u64.to_le_bytes()); // ino
    out.extend_from_slice(&mode.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // nlink
    out.extend_from_slice(&2000u32.to_le_bytes()); // uid
    out.extend_from_slice(&1000u32.to_le_bytes()); // gid
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&(mtime - 10).to_le_bytes()); // atime
    out.extend_from_slice(&mtime.to_le_bytes());
    out.extend_from_slice(&(mtime + 10).to_le_bytes()); // ctime
    out
}

/// v1 listing entry
pub fn dent(mode: u32, size: u32, mtime: u32, name: &str) -> Vec<u8> {
    let mut out = SyncCommand::Dent.to_bytes().to_vec();
    out.extend_from_slice(&mode.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&mtime.to_le_bytes());
    out.extend_from_slice(&(name.len() as u32).to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out
}

/// v2 listing entry
pub fn dnt2(mode: u32, size: u64, mtime: i64, name: &str) -> Vec<u8> {
    let mut out = SyncCommand::Dnt2.to_bytes().to_vec();
    out.extend(stat_v2_body(0, mode, size, mtime));
    out.extend_from_slice(&(name.len() as u32).to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out
}

/// `DONE` terminating a v1 listing
pub fn list_done_v1() -> Vec<u8> {
    let mut out = SyncCommand::Done.to_bytes().to_vec();
    out.extend_from_slice(&[0u8; 16]);
    out
}

/// `DONE` terminating a v2 listing
pub fn list_done_v2() -> Vec<u8> {
    let mut out = SyncCommand::Done.to_bytes().to_vec();
    out.extend_from_slice(&[0u8; 72]);
    out
}

/// Bytes a server sends after accepting `host:transport:` and `sync:`
pub fn sync_session_open() -> Vec<u8> {
    let mut out = okay();
    out.extend(okay());
    out
}

pub fn test_device(serial: &str) -> DeviceData {
    DeviceData::new(serial)
        .with_state(DeviceState::Online)
        .with_model("TestModel")
        .with_product("test_product")
}

pub fn test_devices() -> Vec<DeviceData> {
    vec![
        test_device("emulator-5554").with_transport_id(1),
        test_device("abc123def456").with_model("Pixel_6").with_transport_id(2),
        test_device("192.168.1.100:5555").with_model("SM_G991B").with_transport_id(3),
    ]
}

/// `host:devices-l` body matching [`test_devices`]
pub const DEVICES_L_OUTPUT: &str = "emulator-5554          device product:test_product model:TestModel transport_id:1\n\
abc123def456           device product:test_product model:Pixel_6 transport_id:2\n\
192.168.1.100:5555     device product:test_product model:SM_G991B transport_id:3\n";
