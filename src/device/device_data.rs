use crate::core::types::{DeviceData, DeviceState};
use crate::error::{AdbError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DEVICE_LINE: Regex = Regex::new(
        r"(?i)^(?P<serial>[a-z0-9_.:-]+(?:\s[a-z0-9_.-]+)?)\s+(?P<state>device|connecting|offline|unknown|bootloader|recovery|sideload|download|authorizing|unauthorized|host|no permissions)\b(?P<message>.*?)(?:\s+usb:(?P<usb>\S+))?(?:\s+product:(?P<product>\S+))?(?:\s+model:(?P<model>\S+))?(?:\s+device:(?P<device>\S+))?(?:\s+features:(?P<features>\S+))?(?:\s+transport_id:(?P<transport_id>\d+))?\s*$"
    )
    .expect("device line pattern is valid");
}

/// Parse one line of `host:devices-l` or `host:track-devices` output
pub fn parse_device_line(line: &str) -> Result<DeviceData> {
    let caps = DEVICE_LINE
        .captures(line.trim_end())
        .ok_or_else(|| AdbError::Format(format!("invalid device line {:?}", line)))?;

    let field = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut device = DeviceData::new(&caps["serial"]);
    device.state = DeviceState::from_str(&caps["state"]);
    device.message = field("message");
    device.usb = field("usb");
    device.product = field("product");
    device.model = field("model");
    device.name = field("device");
    device.features = field("features")
        .map(|f| f.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    device.transport_id = field("transport_id").and_then(|id| id.parse().ok());

    Ok(device)
}

/// Parse a full device list, skipping blank lines
pub fn parse_device_list(text: &str) -> Result<Vec<DeviceData>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_device_line)
        .collect()
}
