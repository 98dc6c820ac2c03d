use crate::core::types::DeviceId;
use crate::error::{AdbError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One end of a port or socket forward, written `kind:value` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForwardSpec {
    /// `tcp:<port>`; port 0 asks the server to pick one
    Tcp(u16),
    /// `local:<path>`, a Unix domain socket path
    LocalPath(String),
    LocalAbstract(String),
    LocalReserved(String),
    LocalFilesystem(String),
    /// `dev:<name>`, a character device on the target
    Device(String),
    /// `jdwp:<pid>`
    Jdwp(u32),
}

impl ForwardSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardSpec::Tcp(_) => "tcp",
            ForwardSpec::LocalPath(_) => "local",
            ForwardSpec::LocalAbstract(_) => "localabstract",
            ForwardSpec::LocalReserved(_) => "localreserved",
            ForwardSpec::LocalFilesystem(_) => "localfilesystem",
            ForwardSpec::Device(_) => "dev",
            ForwardSpec::Jdwp(_) => "jdwp",
        }
    }
}

impl fmt::Display for ForwardSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardSpec::Tcp(port) => write!(f, "{}:{}", self.kind(), port),
            ForwardSpec::Jdwp(pid) => write!(f, "{}:{}", self.kind(), pid),
            ForwardSpec::LocalPath(name)
            | ForwardSpec::LocalAbstract(name)
            | ForwardSpec::LocalReserved(name)
            | ForwardSpec::LocalFilesystem(name)
            | ForwardSpec::Device(name) => write!(f, "{}:{}", self.kind(), name),
        }
    }
}

impl FromStr for ForwardSpec {
    type Err = AdbError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AdbError::Format(format!("invalid forward spec {:?}", s));

        let (kind, value) = s.split_once(':').ok_or_else(invalid)?;
        if kind.is_empty() || value.is_empty() {
            return Err(invalid());
        }

        match kind.to_ascii_lowercase().as_str() {
            "tcp" => value.parse().map(ForwardSpec::Tcp).map_err(|_| invalid()),
            "jdwp" => value.parse().map(ForwardSpec::Jdwp).map_err(|_| invalid()),
            "local" => Ok(ForwardSpec::LocalPath(value.to_string())),
            "localabstract" => Ok(ForwardSpec::LocalAbstract(value.to_string())),
            "localreserved" => Ok(ForwardSpec::LocalReserved(value.to_string())),
            "localfilesystem" => Ok(ForwardSpec::LocalFilesystem(value.to_string())),
            "dev" => Ok(ForwardSpec::Device(value.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for ForwardSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One line of a forward listing: `<serial> <local> <remote>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardData {
    pub serial: DeviceId,
    pub local: String,
    pub remote: String,
}

impl ForwardData {
    pub fn new(
        serial: impl Into<DeviceId>,
        local: impl Into<String>,
        remote: impl Into<String>,
    ) -> Self {
        Self {
            serial: serial.into(),
            local: local.into(),
            remote: remote.into(),
        }
    }

    pub fn local_spec(&self) -> Result<ForwardSpec> {
        self.local.parse()
    }

    pub fn remote_spec(&self) -> Result<ForwardSpec> {
        self.remote.parse()
    }

    /// Parse a full listing, skipping blank lines
    pub fn parse_list(text: &str) -> Result<Vec<Self>> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for ForwardData {
    type Err = AdbError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(serial), Some(local), Some(remote), None) => {
                Ok(Self::new(serial, local, remote))
            }
            _ => Err(AdbError::Format(format!(
                "invalid forward listing line {:?}",
                line
            ))),
        }
    }
}

impl fmt::Display for ForwardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.serial, self.local, self.remote)
    }
}
