use crate::core::types::TextEncoding;
use crate::error::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const ADB_SERVER_PORT: u16 = 5037;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Connection settings for talking to an ADB server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Zero disables the read timeout
    pub read_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub encoding: TextEncoding,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: ADB_SERVER_PORT,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            encoding: TextEncoding::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_address(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        debug!("Parsed config: {:?}", config);
        Ok(config)
    }

    /// `host:port`, with `localhost` pinned to the IPv4 loopback
    pub fn endpoint(&self) -> String {
        let host = if self.host == "localhost" {
            DEFAULT_HOST
        } else {
            self.host.as_str()
        };
        format!("{}:{}", host, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        match self.read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
