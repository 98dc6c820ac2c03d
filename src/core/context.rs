use crate::adb::client::AdbClient;
use crate::core::types::DeviceId;
use crate::device::DeviceManager;
use crate::error::Result;
use crate::output::{OutputFormatter, OutputType};
use crate::progress::ProgressFactory;
use log::debug;

/// Shared state handed to every command
pub struct CommandContext {
    pub client: AdbClient,
    pub devices: DeviceManager,
    /// Serial (or part of one) given with `-s`
    pub serial: Option<String>,
    pub output_format: OutputType,
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(client: AdbClient) -> Self {
        Self {
            devices: DeviceManager::with_client(client.clone()),
            client,
            serial: None,
            output_format: OutputType::Table,
            quiet: false,
        }
    }

    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_output_format(mut self, format: OutputType) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Resolve `-s` against the device list, or require a single device
    pub async fn target_device(&self) -> Result<DeviceId> {
        let device = self.devices.get_target_device(self.serial.as_deref()).await?;
        debug!("Target device: {}", device.display_name());
        Ok(device.serial)
    }

    pub fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new().with_quiet(self.quiet)
    }

    /// Progress bars are hidden in quiet mode and for JSON output
    pub fn should_show_progress(&self) -> bool {
        !self.quiet && self.output_format != OutputType::Json
    }

    pub fn progress(&self) -> ProgressFactory {
        ProgressFactory::new(self.should_show_progress())
    }
}
