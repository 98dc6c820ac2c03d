use crate::config::ClientConfig;
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use log::*;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Byte pipe to the ADB server.
///
/// `receive` returns 0 once the peer has closed the connection. Triggering
/// the [`CancellationToken`] tears the pipe down out-of-band and makes any
/// pending or later `receive`/`send` fail with [`AdbError::Cancelled`].
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// `force == false` is a no-op while connected
    async fn reconnect(&mut self, force: bool) -> Result<()>;

    async fn close(&mut self);

    fn is_connected(&self) -> bool;

    fn cancellation_token(&self) -> CancellationToken;
}

/// Creates fresh transports; injected into the client instead of a global factory
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Transport>>;
}

/// TCP connection to an ADB server
pub struct TcpTransport {
    endpoint: String,
    stream: Option<TcpStream>,
    read_timeout: Option<Duration>,
    connect_timeout: Duration,
    cancel: CancellationToken,
}

impl TcpTransport {
    /// Connect to the server described by `config`
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        debug!("=== Creating new ADB connection ===");

        let endpoint = config.endpoint();
        let stream = Self::establish_connection(&endpoint, config.connect_timeout()).await?;

        Ok(Self {
            endpoint,
            stream: Some(stream),
            read_timeout: config.read_timeout(),
            connect_timeout: config.connect_timeout(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn establish_connection(endpoint: &str, limit: Duration) -> Result<TcpStream> {
        debug!("Connecting to address: {}", endpoint);

        let stream = tokio::time::timeout(limit, TcpStream::connect(endpoint))
            .await
            .map_err(|_| AdbError::Timeout(limit))??;
        stream.set_nodelay(true)?;
        debug!("Connection established");

        Ok(stream)
    }

    fn map_io_error(&self, err: std::io::Error) -> AdbError {
        if self.cancel.is_cancelled() {
            return AdbError::Cancelled;
        }
        match err.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof => AdbError::Disconnected(err.to_string()),
            _ => AdbError::Io(err),
        }
    }
}

async fn read_with_timeout(
    stream: &mut TcpStream,
    buf: &mut [u8],
    limit: Option<Duration>,
) -> std::result::Result<std::io::Result<usize>, Duration> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, stream.read(buf))
            .await
            .map_err(|_| limit),
        None => Ok(stream.read(buf).await),
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.cancel.is_cancelled() {
            self.stream = None;
            return Err(AdbError::Cancelled);
        }
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| AdbError::Disconnected("socket is closed".into()))?;

        match stream.write_all(data).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("Error writing to socket: {}", e);
                self.stream = None;
                Err(self.map_io_error(e))
            }
        }
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let cancel = self.cancel.clone();
        if cancel.is_cancelled() {
            self.stream = None;
            return Err(AdbError::Cancelled);
        }
        let limit = self.read_timeout;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| AdbError::Disconnected("socket is closed".into()))?;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = read_with_timeout(stream, buf, limit) => Some(result),
        };

        match outcome {
            None => {
                debug!("Receive cancelled, dropping connection to {}", self.endpoint);
                self.stream = None;
                Err(AdbError::Cancelled)
            }
            Some(Err(limit)) => Err(AdbError::Timeout(limit)),
            Some(Ok(Ok(n))) => Ok(n),
            Some(Ok(Err(e))) => {
                debug!("Error reading from socket: {}", e);
                self.stream = None;
                Err(self.map_io_error(e))
            }
        }
    }

    async fn reconnect(&mut self, force: bool) -> Result<()> {
        if !force && self.is_connected() {
            return Ok(());
        }
        debug!("Reconnecting to {}", self.endpoint);
        self.close().await;
        self.cancel = CancellationToken::new();
        self.stream = Some(Self::establish_connection(&self.endpoint, self.connect_timeout).await?);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Ignoring shutdown error: {}", e);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some() && !self.cancel.is_cancelled()
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Opens a new [`TcpTransport`] per call
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    config: ClientConfig,
}

impl TcpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>> {
        Ok(Box::new(TcpTransport::connect(&self.config).await?))
    }
}
