use super::device_data::parse_device_list;
use crate::adb::connection::AdbConnection;
use crate::core::types::DeviceData;
use crate::error::Result;
use log::debug;
use tokio_util::sync::CancellationToken;

/// Stream of device list snapshots from `host:track-devices`.
///
/// The server pushes a full length-prefixed list whenever any device
/// changes state, and keeps the connection open until the client leaves.
pub struct DeviceTracker {
    connection: AdbConnection,
}

impl DeviceTracker {
    /// Wrap a connection whose `host:track-devices` request was accepted
    pub fn new(connection: AdbConnection) -> Self {
        Self { connection }
    }

    /// Next full snapshot, or `None` once the server closes the connection
    pub async fn next_update(&mut self) -> Result<Option<Vec<DeviceData>>> {
        match self.connection.read_optional_string().await? {
            Some(text) => {
                let devices = parse_device_list(&text)?;
                debug!("Device tracker update: {} device(s)", devices.len());
                Ok(Some(devices))
            }
            None => Ok(None),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.connection.cancellation_token()
    }

    pub async fn close(mut self) {
        self.connection.close().await;
    }
}
