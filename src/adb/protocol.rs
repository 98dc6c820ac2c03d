use crate::error::{AdbError, Result};
use bytes::{BufMut, BytesMut};
use std::fmt;

/// Status marker for a successful request
pub const OKAY: &[u8; 4] = b"OKAY";
/// Status marker for a rejected request
pub const FAIL: &[u8; 4] = b"FAIL";

/// Largest payload the 4-hex-digit length prefix can describe
pub const MAX_PAYLOAD_LENGTH: usize = 0xFFFF;

/// Frame a host request: 4 uppercase hex digits of the byte length, then the payload
pub fn encode_request(payload: &str) -> Result<BytesMut> {
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_PAYLOAD_LENGTH {
        return Err(AdbError::InvalidArgument(format!(
            "request payload is {} bytes, the maximum is {}",
            bytes.len(),
            MAX_PAYLOAD_LENGTH
        )));
    }

    let mut buf = BytesMut::with_capacity(4 + bytes.len());
    buf.put_slice(format!("{:04X}", bytes.len()).as_bytes());
    buf.put_slice(bytes);
    Ok(buf)
}

/// Parse a 4-hex-digit length prefix
pub fn decode_length(prefix: &[u8]) -> Result<usize> {
    if prefix.len() != 4 || !prefix.iter().all(u8::is_ascii_hexdigit) {
        return Err(AdbError::Format(format!(
            "invalid length prefix {:?}",
            String::from_utf8_lossy(prefix)
        )));
    }

    // All four bytes are ASCII hex digits, so both conversions hold.
    let text = std::str::from_utf8(prefix).map_err(|e| AdbError::Format(e.to_string()))?;
    usize::from_str_radix(text, 16).map_err(|e| AdbError::Format(e.to_string()))
}

/// Sync sub-protocol command codes: four ASCII bytes read as a little-endian u32
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SyncCommand {
    Stat = 0x5441_5453, // "STAT"
    Sta2 = 0x3241_5453, // "STA2"
    Lst2 = 0x3254_534c, // "LST2"
    List = 0x5453_494c, // "LIST"
    Lis2 = 0x3253_494c, // "LIS2"
    Dent = 0x544e_4544, // "DENT"
    Dnt2 = 0x3254_4e44, // "DNT2"
    Send = 0x444e_4553, // "SEND"
    Snd2 = 0x3244_4e53, // "SND2"
    Recv = 0x5643_4552, // "RECV"
    Rcv2 = 0x3256_4352, // "RCV2"
    Done = 0x454e_4f44, // "DONE"
    Data = 0x4154_4144, // "DATA"
    Okay = 0x5941_4b4f, // "OKAY"
    Fail = 0x4c49_4146, // "FAIL"
    Quit = 0x5449_5551, // "QUIT"
}

impl SyncCommand {
    pub const ALL: [SyncCommand; 16] = [
        SyncCommand::Stat,
        SyncCommand::Sta2,
        SyncCommand::Lst2,
        SyncCommand::List,
        SyncCommand::Lis2,
        SyncCommand::Dent,
        SyncCommand::Dnt2,
        SyncCommand::Send,
        SyncCommand::Snd2,
        SyncCommand::Recv,
        SyncCommand::Rcv2,
        SyncCommand::Done,
        SyncCommand::Data,
        SyncCommand::Okay,
        SyncCommand::Fail,
        SyncCommand::Quit,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| *c as u32 == value)
    }

    pub fn to_bytes(self) -> [u8; 4] {
        (self as u32).to_le_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; 4] = bytes.try_into().map_err(|_| {
            AdbError::InvalidArgument(format!(
                "a sync command is 4 bytes, got {}",
                bytes.len()
            ))
        })?;
        Self::from_u32(u32::from_le_bytes(raw)).ok_or(AdbError::InvalidSyncCommand(raw))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncCommand::Stat => "STAT",
            SyncCommand::Sta2 => "STA2",
            SyncCommand::Lst2 => "LST2",
            SyncCommand::List => "LIST",
            SyncCommand::Lis2 => "LIS2",
            SyncCommand::Dent => "DENT",
            SyncCommand::Dnt2 => "DNT2",
            SyncCommand::Send => "SEND",
            SyncCommand::Snd2 => "SND2",
            SyncCommand::Recv => "RECV",
            SyncCommand::Rcv2 => "RCV2",
            SyncCommand::Done => "DONE",
            SyncCommand::Data => "DATA",
            SyncCommand::Okay => "OKAY",
            SyncCommand::Fail => "FAIL",
            SyncCommand::Quit => "QUIT",
        }
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 8-byte sync header: command code + little-endian length (or metadata word)
pub fn encode_sync_header(command: SyncCommand, value: u32) -> [u8; 8] {
    let mut header = [0u8; 8];
    header[..4].copy_from_slice(&command.to_bytes());
    header[4..].copy_from_slice(&value.to_le_bytes());
    header
}

/// Sync request carrying a path-like string payload
pub fn encode_sync_request(command: SyncCommand, payload: &str) -> BytesMut {
    let bytes = payload.as_bytes();
    let mut buf = BytesMut::with_capacity(8 + bytes.len());
    buf.put_slice(&encode_sync_header(command, bytes.len() as u32));
    buf.put_slice(bytes);
    buf
}

/// Host and device service requests understood by the ADB server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdbCommand {
    // Server operations
    Version,
    Kill,
    Devices,
    TrackDevices,
    Connect,
    Disconnect,
    Features,

    // Device selection
    Transport,

    // Device services
    Shell,
    Sync,
    Reboot,
    Root,
    Unroot,

    // Forwarding
    Forward,
    ForwardNoRebind,
    KillForward,
    KillForwardAll,
    ListForward,
    ReverseForward,
    ReverseForwardNoRebind,
    ReverseKillForward,
    ReverseKillForwardAll,
    ReverseListForward,
}

impl AdbCommand {
    fn template(&self) -> &'static str {
        match self {
            Self::Version => "host:version",
            Self::Kill => "host:kill",
            Self::Devices => "host:devices-l",
            Self::TrackDevices => "host:track-devices",
            Self::Connect => "host:connect:{}",
            Self::Disconnect => "host:disconnect:{}",
            Self::Features => "host-serial:{}:features",

            Self::Transport => "host:transport:{}",

            Self::Shell => "shell:{}",
            Self::Sync => "sync:",
            Self::Reboot => "reboot:{}",
            Self::Root => "root:",
            Self::Unroot => "unroot:",

            Self::Forward => "host-serial:{}:forward:{};{}",
            Self::ForwardNoRebind => "host-serial:{}:forward:norebind:{};{}",
            Self::KillForward => "host-serial:{}:killforward:{}",
            Self::KillForwardAll => "host-serial:{}:killforward-all",
            Self::ListForward => "host-serial:{}:list-forward",
            Self::ReverseForward => "reverse:forward:{};{}",
            Self::ReverseForwardNoRebind => "reverse:forward:norebind:{};{}",
            Self::ReverseKillForward => "reverse:killforward:{}",
            Self::ReverseKillForwardAll => "reverse:killforward-all",
            Self::ReverseListForward => "reverse:list-forward",
        }
    }

    /// Fill the template's placeholders in order; missing arguments become empty
    pub fn format(&self, args: &[&str]) -> String {
        let mut pieces = self.template().split("{}");
        let mut out = pieces.next().unwrap_or_default().to_string();
        let mut args = args.iter();
        for piece in pieces {
            out.push_str(args.next().copied().unwrap_or_default());
            out.push_str(piece);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command_no_args() {
        assert_eq!(AdbCommand::Version.format(&[]), "host:version");
        assert_eq!(AdbCommand::Kill.format(&[]), "host:kill");
        assert_eq!(AdbCommand::Sync.format(&[]), "sync:");
    }

    #[test]
    fn test_format_command_with_args() {
        assert_eq!(AdbCommand::Shell.format(&["ls"]), "shell:ls");
        assert_eq!(
            AdbCommand::Transport.format(&["device1"]),
            "host:transport:device1"
        );
        assert_eq!(
            AdbCommand::Forward.format(&["abc", "tcp:1", "tcp:2"]),
            "host-serial:abc:forward:tcp:1;tcp:2"
        );
    }
}
