use crate::adb::protocol::{
    decode_length, encode_request, encode_sync_request, AdbCommand, SyncCommand, FAIL, OKAY,
};
use crate::adb::transport::{Connector, Transport};
use crate::core::types::{DeviceId, TextEncoding};
use crate::error::{AdbError, Result};
use log::*;
use tokio_util::sync::CancellationToken;

const READ_CHUNK_SIZE: usize = 4096;

/// Status the server answered a request with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbResponse {
    Okay,
    Fail(String),
}

impl AdbResponse {
    pub fn is_okay(&self) -> bool {
        matches!(self, AdbResponse::Okay)
    }

    /// `FAIL` becomes [`AdbError::Server`] with the message untouched
    pub fn into_result(self) -> Result<()> {
        match self {
            AdbResponse::Okay => Ok(()),
            AdbResponse::Fail(message) => Err(AdbError::Server(message)),
        }
    }
}

/// A transport plus the device it has been switched to, if any.
///
/// After a successful [`select_device`](Self::select_device) every further
/// request on this connection goes to that device. Reconnecting drops the
/// selection.
pub struct AdbConnection {
    transport: Box<dyn Transport>,
    selected_device: Option<DeviceId>,
    encoding: TextEncoding,
}

impl AdbConnection {
    pub fn new(transport: Box<dyn Transport>, encoding: TextEncoding) -> Self {
        Self {
            transport,
            selected_device: None,
            encoding,
        }
    }

    /// Open a fresh connection through `connector`
    pub async fn open(connector: &dyn Connector, encoding: TextEncoding) -> Result<Self> {
        Ok(Self::new(connector.connect().await?, encoding))
    }

    pub fn selected_device(&self) -> Option<&DeviceId> {
        self.selected_device.as_ref()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Token that tears this connection down when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.transport.cancellation_token()
    }

    /// Send a framed request
    pub async fn send_request(&mut self, payload: &str) -> Result<()> {
        debug!("Sending request: {}", payload);
        let frame = encode_request(payload)?;
        self.transport.send(&frame).await
    }

    /// Read the 4-byte status, and the failure message that follows a `FAIL`
    pub async fn read_status(&mut self) -> Result<AdbResponse> {
        let mut marker = [0u8; 4];
        self.read_exact(&mut marker).await?;

        if &marker == OKAY {
            return Ok(AdbResponse::Okay);
        }
        if &marker == FAIL {
            let message = self.read_string().await?;
            debug!("Server replied FAIL: {}", message);
            return Ok(AdbResponse::Fail(message));
        }

        Err(AdbError::Protocol(format!(
            "unexpected response marker {:?}",
            String::from_utf8_lossy(&marker)
        )))
    }

    /// Read the status; `FAIL` is returned as [`AdbError::Server`]
    pub async fn read_response(&mut self) -> Result<()> {
        self.read_status().await?.into_result()
    }

    /// Send a request and check its status
    pub async fn execute_host_command(&mut self, payload: &str) -> Result<()> {
        self.send_request(payload).await?;
        self.read_response().await
    }

    /// Execute a request whose `OKAY` is followed by a length-prefixed reply
    pub async fn query_string(&mut self, payload: &str) -> Result<String> {
        self.execute_host_command(payload).await?;
        self.read_string().await
    }

    /// Switch this connection to `device`
    pub async fn select_device(&mut self, device: &DeviceId) -> Result<()> {
        if device.is_empty() {
            return Err(AdbError::InvalidArgument("device serial is empty".into()));
        }
        if let Some(current) = &self.selected_device {
            warn!(
                "Connection already switched to {}; selecting {} again",
                current, device
            );
        }

        self.send_request(&AdbCommand::Transport.format(&[device.as_str()]))
            .await?;

        match self.read_status().await? {
            AdbResponse::Okay => {
                info!("Switched connection to device {}", device);
                self.selected_device = Some(device.clone());
                Ok(())
            }
            AdbResponse::Fail(message) => {
                if message.to_lowercase().contains("more than one") {
                    Err(AdbError::AmbiguousDevice(message))
                } else {
                    Err(AdbError::DeviceNotFound {
                        serial: device.to_string(),
                        message,
                    })
                }
            }
        }
    }

    /// Read a 4-hex-digit length, then that many bytes decoded as text
    pub async fn read_string(&mut self) -> Result<String> {
        let mut prefix = [0u8; 4];
        self.read_exact(&mut prefix).await?;
        self.read_string_body(&prefix).await
    }

    /// Like [`read_string`](Self::read_string), but `None` when the server
    /// closes the connection instead of sending one
    pub async fn read_optional_string(&mut self) -> Result<Option<String>> {
        let mut prefix = [0u8; 4];
        if !self.read_exact_or_eof(&mut prefix).await? {
            return Ok(None);
        }
        self.read_string_body(&prefix).await.map(Some)
    }

    async fn read_string_body(&mut self, prefix: &[u8]) -> Result<String> {
        let len = decode_length(prefix)?;
        let mut body = vec![0u8; len];
        self.read_exact(&mut body).await?;
        Ok(self.encoding.decode(&body))
    }

    /// Fill `buf` completely; a close before that is a protocol error
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.read_exact_or_eof(buf).await? {
            Ok(())
        } else {
            Err(AdbError::Protocol("connection closed prematurely".into()))
        }
    }

    /// `Ok(false)` when the peer closed before sending a single byte
    async fn read_exact_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.transport.receive(&mut buf[filled..]).await?;
            if n == 0 {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(AdbError::Protocol(format!(
                    "connection closed prematurely after {} of {} bytes",
                    filled,
                    buf.len()
                )));
            }
            filled += n;
        }
        Ok(true)
    }

    /// Read whatever the server sends until it closes the connection
    pub async fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buf = [0u8; READ_CHUNK_SIZE];
        loop {
            let n = self.transport.receive(&mut buf).await?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    /// Raw read; 0 means the server closed the connection
    pub async fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.transport.receive(buf).await
    }

    /// Raw write
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.transport.send(data).await
    }

    pub async fn send_sync_request(&mut self, command: SyncCommand, path: &str) -> Result<()> {
        debug!("Sync request: {} {}", command, path);
        self.transport
            .send(&encode_sync_request(command, path))
            .await
    }

    /// Read an 8-byte sync header: command id and little-endian length word
    pub async fn read_sync_header(&mut self) -> Result<(SyncCommand, u32)> {
        let mut header = [0u8; 8];
        self.read_exact(&mut header).await?;
        let command = SyncCommand::from_bytes(&header[..4])?;
        let value = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        Ok((command, value))
    }

    pub async fn read_sync_id(&mut self) -> Result<SyncCommand> {
        let mut id = [0u8; 4];
        self.read_exact(&mut id).await?;
        SyncCommand::from_bytes(&id)
    }

    /// Re-establish the transport; the device selection does not survive it
    pub async fn reconnect(&mut self, force: bool) -> Result<()> {
        let was_connected = self.transport.is_connected();
        self.transport.reconnect(force).await?;
        if force || !was_connected {
            self.selected_device = None;
        }
        Ok(())
    }

    pub async fn close(&mut self) {
        self.selected_device = None;
        self.transport.close().await;
    }
}
