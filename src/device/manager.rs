use crate::adb::client::AdbClient;
use crate::config::ClientConfig;
use crate::core::types::DeviceData;
use crate::error::{AdbError, Result};
use log::debug;

/// Device discovery and selection on top of [`AdbClient`]
#[derive(Clone)]
pub struct DeviceManager {
    client: AdbClient,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl DeviceManager {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: AdbClient::new(config),
        }
    }

    pub fn with_client(client: AdbClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AdbClient {
        &self.client
    }

    /// All devices the server knows about, in whatever state
    pub async fn list_devices(&self) -> Result<Vec<DeviceData>> {
        let devices = self.client.get_devices().await?;
        debug!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Find a device by case-insensitive partial serial
    pub async fn find_device(&self, partial_serial: &str) -> Result<DeviceData> {
        select_device(self.list_devices().await?, Some(partial_serial))
    }

    /// The only attached device
    pub async fn get_single_device(&self) -> Result<DeviceData> {
        select_device(self.list_devices().await?, None)
    }

    /// `partial_serial` when given, otherwise the single attached device
    pub async fn get_target_device(&self, partial_serial: Option<&str>) -> Result<DeviceData> {
        select_device(self.list_devices().await?, partial_serial)
    }
}

/// Pick one device out of `devices`.
///
/// An exact serial match wins over partial matches, so `emulator-5554`
/// can still be chosen next to `emulator-55540`.
pub fn select_device(devices: Vec<DeviceData>, partial_serial: Option<&str>) -> Result<DeviceData> {
    let Some(partial) = partial_serial else {
        let mut devices = devices.into_iter();
        return match (devices.next(), devices.next()) {
            (None, _) => Err(AdbError::DeviceNotFound {
                serial: String::new(),
                message: "no devices attached".into(),
            }),
            (Some(device), None) => Ok(device),
            (Some(_), Some(_)) => Err(AdbError::AmbiguousDevice(
                "more than one device; specify a serial".into(),
            )),
        };
    };

    if partial.is_empty() {
        return Err(AdbError::InvalidArgument("device serial is empty".into()));
    }

    let needle = partial.to_lowercase();
    let mut matches: Vec<DeviceData> = devices
        .into_iter()
        .filter(|d| d.serial.as_str().to_lowercase().contains(&needle))
        .collect();

    if let Some(pos) = matches
        .iter()
        .position(|d| d.serial.as_str().eq_ignore_ascii_case(partial))
    {
        return Ok(matches.swap_remove(pos));
    }

    match matches.len() {
        0 => Err(AdbError::DeviceNotFound {
            serial: partial.to_string(),
            message: format!("no device matches '{}'", partial),
        }),
        1 => Ok(matches.remove(0)),
        _ => {
            let serials: Vec<&str> = matches.iter().map(|d| d.serial.as_str()).collect();
            Err(AdbError::AmbiguousDevice(format!(
                "'{}' matches more than one device: {}",
                partial,
                serials.join(", ")
            )))
        }
    }
}
