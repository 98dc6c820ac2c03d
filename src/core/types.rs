use serde::{Deserialize, Serialize};
use std::fmt;

/// Strongly typed device serial
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Connection state reported by the ADB server for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    /// Reported as `device` on the wire
    Online,
    Offline,
    BootLoader,
    Recovery,
    Host,
    NoPermissions,
    Unauthorized,
    Authorizing,
    Connecting,
    Sideload,
    Download,
    Unknown,
}

impl DeviceState {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "device" => DeviceState::Online,
            "offline" => DeviceState::Offline,
            "bootloader" => DeviceState::BootLoader,
            "recovery" => DeviceState::Recovery,
            "host" => DeviceState::Host,
            "no permissions" => DeviceState::NoPermissions,
            "unauthorized" => DeviceState::Unauthorized,
            "authorizing" => DeviceState::Authorizing,
            "connecting" => DeviceState::Connecting,
            "sideload" => DeviceState::Sideload,
            "download" => DeviceState::Download,
            _ => DeviceState::Unknown,
        }
    }

    /// Wire spelling of the state
    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Online => "device",
            DeviceState::Offline => "offline",
            DeviceState::BootLoader => "bootloader",
            DeviceState::Recovery => "recovery",
            DeviceState::Host => "host",
            DeviceState::NoPermissions => "no permissions",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Authorizing => "authorizing",
            DeviceState::Connecting => "connecting",
            DeviceState::Sideload => "sideload",
            DeviceState::Download => "download",
            DeviceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the server's device list.
///
/// The serial is fixed once read; `state` is only as fresh as the list it
/// came from. Re-query the server to refresh it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceData {
    pub serial: DeviceId,
    pub state: DeviceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// The `device:` field of `devices -l`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<u32>,
}

impl DeviceData {
    pub fn new(serial: impl Into<DeviceId>) -> Self {
        Self {
            serial: serial.into(),
            state: DeviceState::Unknown,
            message: None,
            usb: None,
            product: None,
            model: None,
            name: None,
            features: Vec::new(),
            transport_id: None,
        }
    }

    pub fn with_state(mut self, state: DeviceState) -> Self {
        self.state = state;
        self
    }

    pub fn with_transport_id(mut self, transport_id: u32) -> Self {
        self.transport_id = Some(transport_id);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check if device is available for commands
    pub fn is_available(&self) -> bool {
        self.state == DeviceState::Online
    }

    /// Get a display name for the device
    pub fn display_name(&self) -> String {
        if let Some(model) = &self.model {
            format!("{} ({})", model, self.serial)
        } else {
            self.serial.to_string()
        }
    }
}

impl fmt::Display for DeviceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.serial, self.state)?;
        if let Some(message) = &self.message {
            write!(f, " {}", message)?;
        }
        if let Some(usb) = &self.usb {
            write!(f, " usb:{}", usb)?;
        }
        if let Some(product) = &self.product {
            write!(f, " product:{}", product)?;
        }
        if let Some(model) = &self.model {
            write!(f, " model:{}", model)?;
        }
        if let Some(name) = &self.name {
            write!(f, " device:{}", name)?;
        }
        if !self.features.is_empty() {
            write!(f, " features:{}", self.features.join(","))?;
        }
        if let Some(transport_id) = self.transport_id {
            write!(f, " transport_id:{}", transport_id)?;
        }
        Ok(())
    }
}

/// Text encoding used to decode shell output and server strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl TextEncoding {
    /// Decode bytes, replacing anything the encoding cannot represent
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            TextEncoding::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
                .collect(),
        }
    }
}

/// File transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Push,
    Pull,
}

/// Progress information for file transfers
#[derive(Debug, Clone)]
pub struct TransferProgress {
    pub direction: TransferDirection,
    pub bytes_transferred: u64,
    /// Zero when the size is not known up front
    pub total_bytes: u64,
    pub file_path: String,
}

impl TransferProgress {
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (self.bytes_transferred as f64 / self.total_bytes as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_state_round_trip() {
        for state in [
            DeviceState::Online,
            DeviceState::Offline,
            DeviceState::BootLoader,
            DeviceState::NoPermissions,
            DeviceState::Unauthorized,
            DeviceState::Sideload,
        ] {
            assert_eq!(DeviceState::from_str(state.as_str()), state);
        }
        assert_eq!(DeviceState::from_str("DEVICE"), DeviceState::Online);
        assert_eq!(DeviceState::from_str("weird"), DeviceState::Unknown);
    }

    #[test]
    fn test_text_encoding_decode() {
        let bytes = [b'a', 0xE9, b'b'];
        assert_eq!(TextEncoding::Latin1.decode(&bytes), "aéb");
        assert_eq!(TextEncoding::Ascii.decode(&bytes), "a\u{FFFD}b");
        assert_eq!(TextEncoding::Utf8.decode("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_device_display_name() {
        let device = DeviceData::new("emulator-5554").with_model("sdk_gphone64");
        assert_eq!(device.display_name(), "sdk_gphone64 (emulator-5554)");
        assert_eq!(DeviceData::new("abc").display_name(), "abc");
    }

    #[test]
    fn test_transfer_percentage() {
        let progress = TransferProgress {
            direction: TransferDirection::Pull,
            bytes_transferred: 50,
            total_bytes: 200,
            file_path: "/sdcard/a".to_string(),
        };
        assert_eq!(progress.percentage(), 25.0);
    }
}
