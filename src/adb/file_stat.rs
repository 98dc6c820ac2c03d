use crate::error::{AdbError, Result};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

const S_IFMT: u32 = 0o170000; // bit mask for the file type bit field
const S_IFSOCK: u32 = 0o140000; // socket
const S_IFLNK: u32 = 0o120000; // symbolic link
const S_IFREG: u32 = 0o100000; // regular file
const S_IFBLK: u32 = 0o060000; // block device
const S_IFDIR: u32 = 0o040000; // directory
const S_IFCHR: u32 = 0o020000; // character device
const S_IFIFO: u32 = 0o010000; // FIFO

const S_ISUID: u32 = 0o4000;
const S_ISGID: u32 = 0o2000;
const S_ISVTX: u32 = 0o1000;

/// Size of a v1 stat body: mode, size, mtime
pub const STAT_V1_SIZE: usize = 12;
/// Size of a v2 stat body, without the command id
pub const STAT_V2_SIZE: usize = 68;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Fifo,
    CharDevice,
    Directory,
    BlockDevice,
    Regular,
    Symlink,
    Socket,
    Unknown,
}

impl FileType {
    pub fn description(&self) -> &'static str {
        match self {
            FileType::Fifo => "Named pipe (fifo)",
            FileType::CharDevice => "Character device",
            FileType::Directory => "Directory",
            FileType::BlockDevice => "Block device",
            FileType::Regular => "Regular file",
            FileType::Symlink => "Symbolic link",
            FileType::Socket => "Socket",
            FileType::Unknown => "Unknown",
        }
    }
}

/// Unix `st_mode`: type bits plus permission bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnixFileMode(pub u32);

impl UnixFileMode {
    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn file_type(&self) -> FileType {
        match self.0 & S_IFMT {
            S_IFIFO => FileType::Fifo,
            S_IFCHR => FileType::CharDevice,
            S_IFDIR => FileType::Directory,
            S_IFBLK => FileType::BlockDevice,
            S_IFREG => FileType::Regular,
            S_IFLNK => FileType::Symlink,
            S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    pub fn is_regular(&self) -> bool {
        self.file_type() == FileType::Regular
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type() == FileType::Symlink
    }

    /// Permission and special bits (`0o7777`)
    pub fn permissions(&self) -> u32 {
        self.0 & 0o7777
    }

    /// `ls -l` style rendering, e.g. `drwxr-x--x`
    pub fn permissions_string(&self) -> String {
        let mode = self.0;
        let file_type = match self.file_type() {
            FileType::Fifo => 'p',
            FileType::CharDevice => 'c',
            FileType::Directory => 'd',
            FileType::BlockDevice => 'b',
            FileType::Regular => '-',
            FileType::Symlink => 'l',
            FileType::Socket => 's',
            FileType::Unknown => '?',
        };

        let mut out = String::with_capacity(10);
        out.push(file_type);
        out.push_str(&Self::permission_triplet(mode >> 6, mode & S_ISUID != 0, 's'));
        out.push_str(&Self::permission_triplet(mode >> 3, mode & S_ISGID != 0, 's'));
        out.push_str(&Self::permission_triplet(mode, mode & S_ISVTX != 0, 't'));
        out
    }

    fn permission_triplet(mode: u32, special: bool, marker: char) -> String {
        let mut triplet = String::with_capacity(3);
        triplet.push(if (mode & 4) != 0 { 'r' } else { '-' });
        triplet.push(if (mode & 2) != 0 { 'w' } else { '-' });
        triplet.push(match (mode & 1 != 0, special) {
            (false, false) => '-',
            (true, false) => 'x',
            (false, true) => marker.to_ascii_uppercase(),
            (true, true) => marker,
        });
        triplet
    }
}

impl fmt::Display for UnixFileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.permissions_string())
    }
}

impl Serialize for UnixFileMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:o}", self.0))
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}

fn le_i64(bytes: &[u8], at: usize) -> i64 {
    le_u64(bytes, at) as i64
}

/// v1 stat or listing entry.
///
/// A v1 stat of a path that does not exist comes back as an all-zero record,
/// which cannot be told apart from a real file with mode 0. See
/// [`is_missing`](Self::is_missing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatistics {
    pub path: String,
    pub mode: UnixFileMode,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl FileStatistics {
    /// Decode the 12-byte v1 body: mode, size, mtime
    pub fn from_v1_bytes(path: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != STAT_V1_SIZE {
            return Err(AdbError::Protocol(format!(
                "stat entry is {} bytes, expected {}",
                bytes.len(),
                STAT_V1_SIZE
            )));
        }
        Ok(Self {
            path: path.into(),
            mode: UnixFileMode(le_u32(bytes, 0)),
            size: le_u32(bytes, 4) as u64,
            modified: timestamp(le_u32(bytes, 8) as i64),
        })
    }

    /// True for the zeroed record a v1 stat returns for a missing path
    pub fn is_missing(&self) -> bool {
        self.mode.bits() == 0
    }
}

impl fmt::Display for FileStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>10} {} {}",
            self.mode,
            self.size,
            self.modified.format("%Y-%m-%d %H:%M"),
            self.path
        )
    }
}

/// v2 stat or listing entry with the full `struct stat` set of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatisticsEx {
    pub path: String,
    /// errno reported by the device; 0 on success
    pub error: u32,
    pub device: u64,
    pub inode: u64,
    pub mode: UnixFileMode,
    pub link_count: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub accessed: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

impl FileStatisticsEx {
    /// Decode the 68-byte v2 body that follows `STA2`, `LST2` or `DNT2`
    pub fn from_v2_bytes(path: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != STAT_V2_SIZE {
            return Err(AdbError::Protocol(format!(
                "extended stat entry is {} bytes, expected {}",
                bytes.len(),
                STAT_V2_SIZE
            )));
        }
        Ok(Self {
            path: path.into(),
            error: le_u32(bytes, 0),
            device: le_u64(bytes, 4),
            inode: le_u64(bytes, 12),
            mode: UnixFileMode(le_u32(bytes, 20)),
            link_count: le_u32(bytes, 24),
            uid: le_u32(bytes, 28),
            gid: le_u32(bytes, 32),
            size: le_u64(bytes, 36),
            accessed: timestamp(le_i64(bytes, 44)),
            modified: timestamp(le_i64(bytes, 52)),
            changed: timestamp(le_i64(bytes, 60)),
        })
    }

    pub fn is_error(&self) -> bool {
        self.error != 0
    }

    /// Drop the extended fields
    pub fn to_basic(&self) -> FileStatistics {
        FileStatistics {
            path: self.path.clone(),
            mode: self.mode,
            size: self.size,
            modified: self.modified,
        }
    }
}

impl fmt::Display for FileStatisticsEx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  File: {}", self.path)?;
        writeln!(f, "  Type: {}", self.mode.file_type().description())?;
        writeln!(
            f,
            "  Size: {:<12} Links: {:<6} Inode: {}",
            self.size, self.link_count, self.inode
        )?;
        writeln!(
            f,
            "Access: ({:04o}/{})  Uid: {}  Gid: {}",
            self.mode.permissions(),
            self.mode,
            self.uid,
            self.gid
        )?;
        writeln!(f, "Access: {}", self.accessed)?;
        writeln!(f, "Modify: {}", self.modified)?;
        write!(f, "Change: {}", self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::stat_v2_body;

    #[test]
    fn test_permissions_string() {
        assert_eq!(UnixFileMode(0o040751).permissions_string(), "drwxr-x--x");
        assert_eq!(UnixFileMode(0o100644).permissions_string(), "-rw-r--r--");
        assert_eq!(UnixFileMode(0o120777).permissions_string(), "lrwxrwxrwx");
        assert_eq!(UnixFileMode(0o104755).permissions_string(), "-rwsr-xr-x");
        assert_eq!(UnixFileMode(0o041777).permissions_string(), "drwxrwxrwt");
        assert_eq!(UnixFileMode(0o102644).permissions_string(), "-rw-r-Sr--");
    }

    #[test]
    fn test_file_type() {
        assert!(UnixFileMode(0o040000).is_directory());
        assert!(UnixFileMode(0o100000).is_regular());
        assert!(UnixFileMode(0o120000).is_symlink());
        assert_eq!(UnixFileMode(0o020620).file_type(), FileType::CharDevice);
        assert_eq!(UnixFileMode(0).file_type(), FileType::Unknown);
    }

    #[test]
    fn test_v1_record() {
        let mut body = Vec::new();
        body.extend_from_slice(&0o100644u32.to_le_bytes());
        body.extend_from_slice(&1234u32.to_le_bytes());
        body.extend_from_slice(&1_700_000_000u32.to_le_bytes());

        let stat = FileStatistics::from_v1_bytes("/sdcard/a.txt", &body).unwrap();
        assert_eq!(stat.size, 1234);
        assert_eq!(stat.modified.timestamp(), 1_700_000_000);
        assert!(stat.mode.is_regular());
        assert!(!stat.is_missing());
    }

    #[test]
    fn test_v1_zero_record_is_missing() {
        let stat = FileStatistics::from_v1_bytes("/nope", &[0u8; 12]).unwrap();
        assert!(stat.is_missing());
        assert_eq!(stat.modified.timestamp(), 0);
    }

    #[test]
    fn test_v1_wrong_size() {
        assert!(matches!(
            FileStatistics::from_v1_bytes("/x", &[0u8; 8]),
            Err(AdbError::Protocol(_))
        ));
    }

    #[test]
    fn test_v2_record() {
        let body = stat_v2_body(0, 0o040755, 4096, 1_700_000_000);
        let stat = FileStatisticsEx::from_v2_bytes("/data", &body).unwrap();

        assert_eq!(stat.device, 0x1234);
        assert_eq!(stat.inode, 42);
        assert!(stat.mode.is_directory());
        assert_eq!(stat.link_count, 1);
        assert_eq!(stat.uid, 2000);
        assert_eq!(stat.gid, 1000);
        assert_eq!(stat.size, 4096);
        assert_eq!(stat.accessed.timestamp(), 1_699_999_990);
        assert_eq!(stat.modified.timestamp(), 1_700_000_000);
        assert_eq!(stat.changed.timestamp(), 1_700_000_010);
        assert!(!stat.is_error());
        assert_eq!(stat.to_basic().size, 4096);
    }

    #[test]
    fn test_v2_error_field() {
        let body = stat_v2_body(2, 0, 0, 0);
        let stat = FileStatisticsEx::from_v2_bytes("/missing", &body).unwrap();
        assert!(stat.is_error());
        assert_eq!(stat.error, 2);
    }
}
