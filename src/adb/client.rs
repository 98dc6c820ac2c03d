use super::connection::AdbConnection;
use super::forward::{ForwardData, ForwardSpec};
use super::protocol::AdbCommand;
use super::shell::{OutputReceiver, ShellStream};
use super::sync::SyncService;
use super::transport::{Connector, TcpConnector};
use crate::config::ClientConfig;
use crate::core::types::{DeviceData, DeviceId};
use crate::device::device_data::parse_device_list;
use crate::device::tracker::DeviceTracker;
use crate::error::{AdbError, Result};
use log::*;
use std::sync::Arc;

/// Entry point for talking to an ADB server.
///
/// Every operation opens its own connection through the connector, so a
/// client can be shared freely; the connections it returns (shell streams,
/// sync sessions, trackers) must not be.
#[derive(Clone)]
pub struct AdbClient {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
}

impl AdbClient {
    /// Client connecting over TCP to the server named in `config`
    pub fn new(config: ClientConfig) -> Self {
        let connector = Arc::new(TcpConnector::new(config.clone()));
        Self { config, connector }
    }

    pub fn with_connector(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A fresh connection, not yet switched to any device
    pub async fn open_connection(&self) -> Result<AdbConnection> {
        AdbConnection::open(self.connector.as_ref(), self.config.encoding).await
    }

    /// A fresh connection switched to `device`
    pub async fn device_connection(&self, device: &DeviceId) -> Result<AdbConnection> {
        let mut connection = self.open_connection().await?;
        connection.select_device(device).await?;
        Ok(connection)
    }

    // Host services

    /// Internal version number of the server
    pub async fn get_adb_version(&self) -> Result<u32> {
        let mut connection = self.open_connection().await?;
        let reply = connection
            .query_string(&AdbCommand::Version.format(&[]))
            .await?;
        u32::from_str_radix(reply.trim(), 16)
            .map_err(|_| AdbError::Format(format!("invalid server version {:?}", reply)))
    }

    /// Ask the server to exit. It closes the connection without replying.
    pub async fn kill_adb(&self) -> Result<()> {
        let mut connection = self.open_connection().await?;
        connection
            .send_request(&AdbCommand::Kill.format(&[]))
            .await?;
        info!("Sent kill request to ADB server");
        Ok(())
    }

    pub async fn get_devices(&self) -> Result<Vec<DeviceData>> {
        let mut connection = self.open_connection().await?;
        let text = connection
            .query_string(&AdbCommand::Devices.format(&[]))
            .await?;
        parse_device_list(&text)
    }

    /// Subscribe to device list changes
    pub async fn track_devices(&self) -> Result<DeviceTracker> {
        let mut connection = self.open_connection().await?;
        connection
            .execute_host_command(&AdbCommand::TrackDevices.format(&[]))
            .await?;
        Ok(DeviceTracker::new(connection))
    }

    /// Connect the server to a device over TCP/IP; returns the server's reply
    pub async fn connect(&self, host: &str, port: u16) -> Result<String> {
        self.host_endpoint_request(AdbCommand::Connect, host, port)
            .await
    }

    pub async fn disconnect(&self, host: &str, port: u16) -> Result<String> {
        self.host_endpoint_request(AdbCommand::Disconnect, host, port)
            .await
    }

    async fn host_endpoint_request(
        &self,
        command: AdbCommand,
        host: &str,
        port: u16,
    ) -> Result<String> {
        if host.is_empty() {
            return Err(AdbError::InvalidArgument("host is empty".into()));
        }
        let endpoint = format!("{}:{}", host, port);
        let mut connection = self.open_connection().await?;
        let reply = connection
            .query_string(&command.format(&[endpoint.as_str()]))
            .await?;
        info!("{}", reply.trim());
        Ok(reply)
    }

    /// Features supported by both the device and the server
    pub async fn get_feature_set(&self, device: &DeviceId) -> Result<Vec<String>> {
        let mut connection = self.open_connection().await?;
        let reply = connection
            .query_string(&AdbCommand::Features.format(&[device.as_str()]))
            .await?;
        Ok(reply
            .split(|c: char| c == ',' || c == '\n')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect())
    }

    // Device services

    /// Reboot into `into` (`bootloader`, `recovery`, ...); empty for a
    /// normal reboot
    pub async fn reboot(&self, device: &DeviceId, into: &str) -> Result<()> {
        let mut connection = self.device_connection(device).await?;
        connection
            .execute_host_command(&AdbCommand::Reboot.format(&[into]))
            .await?;
        info!("Rebooting {}", device);
        Ok(())
    }

    /// Restart adbd with root permissions
    pub async fn root(&self, device: &DeviceId) -> Result<()> {
        self.restart_adbd(device, AdbCommand::Root).await
    }

    /// Restart adbd without root permissions
    pub async fn unroot(&self, device: &DeviceId) -> Result<()> {
        self.restart_adbd(device, AdbCommand::Unroot).await
    }

    async fn restart_adbd(&self, device: &DeviceId, command: AdbCommand) -> Result<()> {
        let mut connection = self.device_connection(device).await?;
        connection.execute_host_command(&command.format(&[])).await?;

        let reply = connection.encoding().decode(&connection.read_to_end().await?);
        let reply = reply.trim();
        if !reply.to_lowercase().contains("restarting") {
            return Err(AdbError::Server(reply.to_string()));
        }
        info!("{}", reply);
        Ok(())
    }

    pub async fn run_shell(&self, device: &DeviceId, command: &str) -> Result<ShellStream> {
        let connection = self.open_connection().await?;
        ShellStream::open(connection, device, command).await
    }

    /// Run `command` and hand its output to `receiver` line by line
    pub async fn execute_shell(
        &self,
        device: &DeviceId,
        command: &str,
        receiver: &mut dyn OutputReceiver,
    ) -> Result<()> {
        let mut stream = self.run_shell(device, command).await?;
        let result = stream.pump(receiver).await;
        stream.close().await;
        result
    }

    /// An opened sync session on `device`
    pub async fn sync_service(&self, device: &DeviceId) -> Result<SyncService> {
        let connection = self.open_connection().await?;
        SyncService::connect(connection, device.clone()).await
    }

    // Forwarding

    /// Forward `local` on the host to `remote` on the device.
    ///
    /// Returns the port the server bound when `local` is `tcp:0`. With
    /// `allow_rebind` false an existing forward on `local` makes the server
    /// refuse; see [`AdbError::is_already_bound`].
    pub async fn create_forward(
        &self,
        device: &DeviceId,
        local: &ForwardSpec,
        remote: &ForwardSpec,
        allow_rebind: bool,
    ) -> Result<Option<u16>> {
        let command = if allow_rebind {
            AdbCommand::Forward
        } else {
            AdbCommand::ForwardNoRebind
        };
        let local = local.to_string();
        let remote = remote.to_string();

        let mut connection = self.open_connection().await?;
        connection
            .send_request(&command.format(&[device.as_str(), local.as_str(), remote.as_str()]))
            .await?;
        let port = read_forward_reply(&mut connection).await?;
        info!("Forwarding {} -> {} on {}", local, remote, device);
        Ok(port)
    }

    pub async fn list_forward(&self, device: &DeviceId) -> Result<Vec<ForwardData>> {
        let mut connection = self.open_connection().await?;
        let text = connection
            .query_string(&AdbCommand::ListForward.format(&[device.as_str()]))
            .await?;
        ForwardData::parse_list(&text)
    }

    pub async fn remove_forward(&self, device: &DeviceId, local: &ForwardSpec) -> Result<()> {
        let mut connection = self.open_connection().await?;
        connection
            .execute_host_command(
                &AdbCommand::KillForward.format(&[device.as_str(), local.to_string().as_str()]),
            )
            .await
    }

    pub async fn remove_all_forwards(&self, device: &DeviceId) -> Result<()> {
        let mut connection = self.open_connection().await?;
        connection
            .execute_host_command(&AdbCommand::KillForwardAll.format(&[device.as_str()]))
            .await
    }

    /// Forward `remote` on the device back to `local` on the host
    pub async fn create_reverse_forward(
        &self,
        device: &DeviceId,
        remote: &ForwardSpec,
        local: &ForwardSpec,
        allow_rebind: bool,
    ) -> Result<Option<u16>> {
        let command = if allow_rebind {
            AdbCommand::ReverseForward
        } else {
            AdbCommand::ReverseForwardNoRebind
        };
        let remote = remote.to_string();
        let local = local.to_string();

        let mut connection = self.device_connection(device).await?;
        connection
            .send_request(&command.format(&[remote.as_str(), local.as_str()]))
            .await?;
        let port = read_forward_reply(&mut connection).await?;
        info!("Reverse forwarding {} -> {} on {}", remote, local, device);
        Ok(port)
    }

    pub async fn list_reverse_forward(&self, device: &DeviceId) -> Result<Vec<ForwardData>> {
        let mut connection = self.device_connection(device).await?;
        let text = connection
            .query_string(&AdbCommand::ReverseListForward.format(&[]))
            .await?;
        ForwardData::parse_list(&text)
    }

    pub async fn remove_reverse_forward(
        &self,
        device: &DeviceId,
        remote: &ForwardSpec,
    ) -> Result<()> {
        let mut connection = self.device_connection(device).await?;
        connection
            .execute_host_command(&AdbCommand::ReverseKillForward.format(&[remote.to_string().as_str()]))
            .await
    }

    pub async fn remove_all_reverse_forwards(&self, device: &DeviceId) -> Result<()> {
        let mut connection = self.device_connection(device).await?;
        connection
            .execute_host_command(&AdbCommand::ReverseKillForwardAll.format(&[]))
            .await
    }
}

/// Two statuses, then the bound port when the server resolved one
async fn read_forward_reply(connection: &mut AdbConnection) -> Result<Option<u16>> {
    connection.read_response().await?;
    connection.read_response().await?;

    match connection.read_optional_string().await? {
        Some(port) if !port.trim().is_empty() => port
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AdbError::Format(format!("invalid forward port {:?}", port))),
        _ => Ok(None),
    }
}
