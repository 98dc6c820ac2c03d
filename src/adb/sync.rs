use crate::adb::connection::AdbConnection;
use crate::adb::file_stat::{FileStatistics, FileStatisticsEx, STAT_V1_SIZE, STAT_V2_SIZE};
use crate::adb::protocol::{encode_sync_header, AdbCommand, SyncCommand};
use crate::core::types::{DeviceId, TransferDirection, TransferProgress};
use crate::error::{AdbError, Result};
use crate::progress::ProgressReporter;
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use log::*;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Largest payload of a single `DATA` frame
pub const MAX_CHUNK_SIZE: usize = 64 * 1024;
/// Longest remote path the sync service accepts
pub const MAX_PATH_LENGTH: usize = 1024;
/// Mode used for pushed files when the local one is unknown
pub const DEFAULT_FILE_MODE: u32 = 0o644;

const MAX_NAME_LENGTH: usize = 4096;

/// Sync wire format. V2 carries 64-bit sizes and times plus the full stat
/// record, and needs a device that advertises the `stat_v2`/`sendrecv_v2`
/// features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncVersion {
    #[default]
    V1,
    V2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Closed,
    Opened,
}

/// File transfer session on one connection.
///
/// Any transport, framing, server or cancellation failure closes the
/// session; call [`reopen`](Self::reopen) to continue on a fresh connection.
pub struct SyncService {
    connection: AdbConnection,
    device: DeviceId,
    state: SyncState,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl SyncService {
    /// Wrap a connection without opening the session yet
    pub fn new(connection: AdbConnection, device: DeviceId) -> Self {
        Self {
            connection,
            device,
            state: SyncState::Closed,
            progress: None,
        }
    }

    /// Switch `connection` to `device` and enter sync mode
    pub async fn connect(connection: AdbConnection, device: DeviceId) -> Result<Self> {
        let mut service = Self::new(connection, device);
        service.open().await?;
        Ok(service)
    }

    pub fn with_progress(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(reporter);
        self
    }

    pub fn set_progress(&mut self, reporter: Option<Arc<dyn ProgressReporter>>) {
        self.progress = reporter;
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SyncState::Opened
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    /// Cancelling stops a transfer between chunks and closes the session
    pub fn cancellation_token(&self) -> CancellationToken {
        self.connection.cancellation_token()
    }

    /// Device handshake followed by `sync:`
    pub async fn open(&mut self) -> Result<()> {
        if self.state == SyncState::Opened {
            return Err(AdbError::InvalidOperation(
                "sync session is already open".into(),
            ));
        }
        if self.connection.selected_device().is_none() {
            self.connection.select_device(&self.device).await?;
        }
        self.connection
            .execute_host_command(&AdbCommand::Sync.format(&[]))
            .await?;

        debug!("Sync session opened on {}", self.device);
        self.state = SyncState::Opened;
        Ok(())
    }

    /// Drop the current connection and open a new session on a fresh one
    pub async fn reopen(&mut self) -> Result<()> {
        self.state = SyncState::Closed;
        self.connection.reconnect(true).await?;
        self.open().await
    }

    /// End the session; there is no sync-level close frame
    pub async fn close(&mut self) {
        self.state = SyncState::Closed;
        self.connection.close().await;
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            SyncState::Opened => Ok(()),
            SyncState::Closed => Err(AdbError::InvalidOperation(
                "sync session is not open".into(),
            )),
        }
    }

    fn validate_path(path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(AdbError::InvalidArgument("remote path is empty".into()));
        }
        if path.len() > MAX_PATH_LENGTH {
            return Err(AdbError::InvalidArgument(format!(
                "remote path is {} bytes, the maximum is {}",
                path.len(),
                MAX_PATH_LENGTH
            )));
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.connection.cancellation_token().is_cancelled() {
            return Err(AdbError::Cancelled);
        }
        Ok(())
    }

    /// Close the session if the operation failed after touching the wire
    async fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !matches!(e, AdbError::InvalidArgument(_) | AdbError::InvalidOperation(_)) {
                debug!("Sync session on {} closed after error: {}", self.device, e);
                self.close().await;
            }
        }
        result
    }

    /// v1 stat. A missing path yields a zeroed record, see
    /// [`FileStatistics::is_missing`].
    pub async fn stat(&mut self, path: &str) -> Result<FileStatistics> {
        self.ensure_open()?;
        Self::validate_path(path)?;
        let result = self.stat_v1(path).await;
        self.settle(result).await
    }

    async fn stat_v1(&mut self, path: &str) -> Result<FileStatistics> {
        self.connection
            .send_sync_request(SyncCommand::Stat, path)
            .await?;

        self.expect_id(SyncCommand::Stat).await?;
        let mut body = [0u8; STAT_V1_SIZE];
        self.connection.read_exact(&mut body).await?;
        FileStatistics::from_v1_bytes(path, &body)
    }

    /// v2 stat, following symlinks
    pub async fn stat_ex(&mut self, path: &str) -> Result<FileStatisticsEx> {
        self.ensure_open()?;
        Self::validate_path(path)?;
        let result = self.stat_v2(SyncCommand::Sta2, path).await;
        self.settle(result).await
    }

    /// v2 stat of the link itself
    pub async fn lstat_ex(&mut self, path: &str) -> Result<FileStatisticsEx> {
        self.ensure_open()?;
        Self::validate_path(path)?;
        let result = self.stat_v2(SyncCommand::Lst2, path).await;
        self.settle(result).await
    }

    async fn stat_v2(&mut self, command: SyncCommand, path: &str) -> Result<FileStatisticsEx> {
        self.connection.send_sync_request(command, path).await?;

        self.expect_id(command).await?;
        let mut body = [0u8; STAT_V2_SIZE];
        self.connection.read_exact(&mut body).await?;
        FileStatisticsEx::from_v2_bytes(path, &body)
    }

    async fn expect_id(&mut self, expected: SyncCommand) -> Result<()> {
        let id = self.connection.read_sync_id().await?;
        if id != expected {
            return Err(AdbError::Protocol(format!(
                "expected {} reply, got {}",
                expected, id
            )));
        }
        Ok(())
    }

    /// v1 directory listing, in the order the device sends it
    pub async fn list(&mut self, path: &str) -> Result<Vec<FileStatistics>> {
        self.ensure_open()?;
        Self::validate_path(path)?;
        let result = self.list_v1(path).await;
        self.settle(result).await
    }

    async fn list_v1(&mut self, path: &str) -> Result<Vec<FileStatistics>> {
        self.connection
            .send_sync_request(SyncCommand::List, path)
            .await?;

        let mut entries = Vec::new();
        loop {
            match self.connection.read_sync_id().await? {
                SyncCommand::Dent => {
                    let mut body = [0u8; STAT_V1_SIZE + 4];
                    self.connection.read_exact(&mut body).await?;
                    let name_len = u32::from_le_bytes([body[12], body[13], body[14], body[15]]);
                    let name = self.read_name(name_len).await?;
                    entries.push(FileStatistics::from_v1_bytes(name, &body[..STAT_V1_SIZE])?);
                }
                SyncCommand::Done => {
                    let mut trailer = [0u8; STAT_V1_SIZE + 4];
                    self.connection.read_exact(&mut trailer).await?;
                    break;
                }
                SyncCommand::Fail => return Err(self.read_fail_message().await?),
                other => {
                    return Err(AdbError::Protocol(format!(
                        "unexpected {} in directory listing",
                        other
                    )))
                }
            }
        }

        debug!("Listed {} entries in {}", entries.len(), path);
        Ok(entries)
    }

    /// v2 directory listing
    pub async fn list_ex(&mut self, path: &str) -> Result<Vec<FileStatisticsEx>> {
        self.ensure_open()?;
        Self::validate_path(path)?;
        let result = self.list_v2(path).await;
        self.settle(result).await
    }

    async fn list_v2(&mut self, path: &str) -> Result<Vec<FileStatisticsEx>> {
        self.connection
            .send_sync_request(SyncCommand::Lis2, path)
            .await?;

        let mut entries = Vec::new();
        loop {
            match self.connection.read_sync_id().await? {
                SyncCommand::Dnt2 => {
                    let mut body = [0u8; STAT_V2_SIZE + 4];
                    self.connection.read_exact(&mut body).await?;
                    let name_len = u32::from_le_bytes([
                        body[STAT_V2_SIZE],
                        body[STAT_V2_SIZE + 1],
                        body[STAT_V2_SIZE + 2],
                        body[STAT_V2_SIZE + 3],
                    ]);
                    let name = self.read_name(name_len).await?;
                    entries.push(FileStatisticsEx::from_v2_bytes(name, &body[..STAT_V2_SIZE])?);
                }
                SyncCommand::Done => {
                    let mut trailer = [0u8; STAT_V2_SIZE + 4];
                    self.connection.read_exact(&mut trailer).await?;
                    break;
                }
                SyncCommand::Fail => return Err(self.read_fail_message().await?),
                other => {
                    return Err(AdbError::Protocol(format!(
                        "unexpected {} in directory listing",
                        other
                    )))
                }
            }
        }

        debug!("Listed {} entries in {}", entries.len(), path);
        Ok(entries)
    }

    async fn read_name(&mut self, len: u32) -> Result<String> {
        let len = len as usize;
        if len > MAX_NAME_LENGTH {
            return Err(AdbError::Protocol(format!(
                "directory entry name of {} bytes",
                len
            )));
        }
        let mut name = vec![0u8; len];
        self.connection.read_exact(&mut name).await?;
        Ok(self.connection.encoding().decode(&name))
    }

    /// Length word plus message after a `FAIL` id
    async fn read_fail_message(&mut self) -> Result<AdbError> {
        let mut len = [0u8; 4];
        self.connection.read_exact(&mut len).await?;
        let len = u32::from_le_bytes(len) as usize;
        if len > MAX_CHUNK_SIZE {
            return Err(AdbError::Protocol(format!(
                "failure message of {} bytes",
                len
            )));
        }
        let mut message = vec![0u8; len];
        self.connection.read_exact(&mut message).await?;
        Ok(AdbError::Server(String::from_utf8_lossy(&message).into_owned()))
    }

    /// Upload `source` to `remote_path`; returns the number of bytes sent.
    ///
    /// If the device rejects the transfer the remote file is left in an
    /// undefined state.
    pub async fn push<R>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        mode: u32,
        modified: DateTime<Utc>,
        version: SyncVersion,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        self.push_sized(source, remote_path, mode, modified, version, 0)
            .await
    }

    async fn push_sized<R>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        mode: u32,
        modified: DateTime<Utc>,
        version: SyncVersion,
        total_bytes: u64,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        self.ensure_open()?;
        Self::validate_path(remote_path)?;
        let result = self
            .send_file(source, remote_path, mode, modified, version, total_bytes)
            .await;
        self.settle(result).await
    }

    async fn send_file<R>(
        &mut self,
        source: &mut R,
        remote_path: &str,
        mode: u32,
        modified: DateTime<Utc>,
        version: SyncVersion,
        total_bytes: u64,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        info!("Pushing to {} ({:o})", remote_path, mode);

        match version {
            SyncVersion::V1 => {
                let request = format!("{},{}", remote_path, mode);
                self.connection
                    .send_sync_request(SyncCommand::Send, &request)
                    .await?;
            }
            SyncVersion::V2 => {
                self.connection
                    .send_sync_request(SyncCommand::Snd2, remote_path)
                    .await?;
                let mut flags = BytesMut::with_capacity(12);
                flags.put_slice(&encode_sync_header(SyncCommand::Snd2, mode));
                flags.put_u32_le(0);
                self.connection.send(&flags).await?;
            }
        }

        let mut progress = TransferProgress {
            direction: TransferDirection::Push,
            bytes_transferred: 0,
            total_bytes,
            file_path: remote_path.to_string(),
        };
        self.report_start(&progress);

        let mut buffer = vec![0u8; MAX_CHUNK_SIZE];
        loop {
            self.check_cancelled()?;

            let n = read_chunk(source, &mut buffer).await?;
            if n == 0 {
                break;
            }

            let mut frame = BytesMut::with_capacity(8 + n);
            frame.put_slice(&encode_sync_header(SyncCommand::Data, n as u32));
            frame.put_slice(&buffer[..n]);
            self.connection.send(&frame).await?;

            progress.bytes_transferred += n as u64;
            self.report_update(&progress);
        }

        let mtime = modified.timestamp().clamp(0, u32::MAX as i64) as u32;
        self.connection
            .send(&encode_sync_header(SyncCommand::Done, mtime))
            .await?;

        match self.connection.read_sync_id().await? {
            SyncCommand::Okay => {
                let mut ignored = [0u8; 4];
                self.connection.read_exact(&mut ignored).await?;
            }
            SyncCommand::Fail => return Err(self.read_fail_message().await?),
            other => {
                return Err(AdbError::Protocol(format!(
                    "unexpected {} after push",
                    other
                )))
            }
        }

        self.report_finish(&progress);
        info!(
            "Pushed {} bytes to {}",
            progress.bytes_transferred, remote_path
        );
        Ok(progress.bytes_transferred)
    }

    /// Download `remote_path` into `sink`; returns the number of bytes
    /// written.
    ///
    /// On failure or cancellation the bytes already written stay in `sink`.
    pub async fn pull<W>(
        &mut self,
        remote_path: &str,
        sink: &mut W,
        version: SyncVersion,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        self.pull_sized(remote_path, sink, version, 0).await
    }

    async fn pull_sized<W>(
        &mut self,
        remote_path: &str,
        sink: &mut W,
        version: SyncVersion,
        total_bytes: u64,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        self.ensure_open()?;
        Self::validate_path(remote_path)?;
        let result = self
            .receive_file(remote_path, sink, version, total_bytes)
            .await;
        let flushed = sink.flush().await;
        let result = match (result, flushed) {
            (Ok(_), Err(e)) => Err(AdbError::Io(e)),
            (result, _) => result,
        };
        self.settle(result).await
    }

    async fn receive_file<W>(
        &mut self,
        remote_path: &str,
        sink: &mut W,
        version: SyncVersion,
        total_bytes: u64,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        info!("Pulling {}", remote_path);

        match version {
            SyncVersion::V1 => {
                self.connection
                    .send_sync_request(SyncCommand::Recv, remote_path)
                    .await?;
            }
            SyncVersion::V2 => {
                self.connection
                    .send_sync_request(SyncCommand::Rcv2, remote_path)
                    .await?;
                self.connection
                    .send(&encode_sync_header(SyncCommand::Rcv2, 0))
                    .await?;
            }
        }

        let mut progress = TransferProgress {
            direction: TransferDirection::Pull,
            bytes_transferred: 0,
            total_bytes,
            file_path: remote_path.to_string(),
        };
        self.report_start(&progress);

        let mut buffer = vec![0u8; MAX_CHUNK_SIZE];
        loop {
            self.check_cancelled()?;

            let (command, len) = self.connection.read_sync_header().await?;
            match command {
                SyncCommand::Data => {
                    let len = len as usize;
                    if len > MAX_CHUNK_SIZE {
                        return Err(AdbError::Protocol(format!(
                            "DATA chunk of {} bytes exceeds {}",
                            len, MAX_CHUNK_SIZE
                        )));
                    }
                    self.connection.read_exact(&mut buffer[..len]).await?;
                    sink.write_all(&buffer[..len]).await?;

                    progress.bytes_transferred += len as u64;
                    self.report_update(&progress);
                }
                SyncCommand::Done => break,
                SyncCommand::Fail => {
                    let len = len as usize;
                    if len > MAX_CHUNK_SIZE {
                        return Err(AdbError::Protocol(format!(
                            "failure message of {} bytes",
                            len
                        )));
                    }
                    let mut message = vec![0u8; len];
                    self.connection.read_exact(&mut message).await?;
                    return Err(AdbError::Server(
                        String::from_utf8_lossy(&message).into_owned(),
                    ));
                }
                other => {
                    return Err(AdbError::Protocol(format!(
                        "unexpected {} during pull",
                        other
                    )))
                }
            }
        }

        self.report_finish(&progress);
        info!(
            "Pulled {} bytes from {}",
            progress.bytes_transferred, remote_path
        );
        Ok(progress.bytes_transferred)
    }

    /// Push a local file, keeping its permission bits and modification time
    pub async fn push_file(
        &mut self,
        local_path: &Path,
        remote_path: &str,
        version: SyncVersion,
    ) -> Result<u64> {
        let metadata = tokio::fs::metadata(local_path).await?;
        if !metadata.is_file() {
            return Err(AdbError::InvalidArgument(format!(
                "{} is not a regular file",
                local_path.display()
            )));
        }

        let mode = local_mode(&metadata);
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let mut file = File::open(local_path).await?;
        self.push_sized(
            &mut file,
            remote_path,
            mode,
            modified,
            version,
            metadata.len(),
        )
        .await
    }

    /// Pull into a local file; a partial file is left behind on failure
    pub async fn pull_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
        version: SyncVersion,
    ) -> Result<u64> {
        let total = match version {
            SyncVersion::V1 => self.stat(remote_path).await?.size,
            SyncVersion::V2 => self.stat_ex(remote_path).await?.size,
        };

        let mut file = File::create(local_path).await?;
        self.pull_sized(remote_path, &mut file, version, total)
            .await
    }

    fn report_start(&self, progress: &TransferProgress) {
        if let Some(reporter) = &self.progress {
            reporter.start(progress);
        }
    }

    fn report_update(&self, progress: &TransferProgress) {
        if let Some(reporter) = &self.progress {
            reporter.update(progress);
        }
    }

    fn report_finish(&self, progress: &TransferProgress) {
        if let Some(reporter) = &self.progress {
            reporter.finish(progress);
        }
    }
}

/// Fill `buf` from `source`, stopping early only at end of input
async fn read_chunk<R>(source: &mut R, buf: &mut [u8]) -> Result<usize>
where
    R: AsyncRead + Unpin + Send + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(unix)]
fn local_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn local_mode(_metadata: &std::fs::Metadata) -> u32 {
    DEFAULT_FILE_MODE
}
