use super::TableFormat;
use crate::adb::file_stat::{FileStatistics, FileStatisticsEx};
use crate::adb::forward::ForwardData;
use crate::core::types::DeviceData;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-readable size: `512B`, `1.5K`, `3.0M`
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G", "T"];

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{}", size, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

impl TableFormat for DeviceData {
    fn headers() -> Vec<&'static str> {
        vec!["SERIAL", "STATE", "MODEL", "PRODUCT", "TRANSPORT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.serial.to_string(),
            self.state.to_string(),
            or_dash(&self.model),
            or_dash(&self.product),
            self.transport_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableFormat for FileStatistics {
    fn headers() -> Vec<&'static str> {
        vec!["MODE", "SIZE", "MODIFIED", "NAME"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.mode.to_string(),
            format_size(self.size),
            self.modified.format(TIME_FORMAT).to_string(),
            self.path.clone(),
        ]
    }
}

impl TableFormat for FileStatisticsEx {
    fn headers() -> Vec<&'static str> {
        vec!["MODE", "LINKS", "UID", "GID", "SIZE", "MODIFIED", "NAME"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.mode.to_string(),
            self.link_count.to_string(),
            self.uid.to_string(),
            self.gid.to_string(),
            format_size(self.size),
            self.modified.format(TIME_FORMAT).to_string(),
            self.path.clone(),
        ]
    }
}

impl TableFormat for ForwardData {
    fn headers() -> Vec<&'static str> {
        vec!["SERIAL", "LOCAL", "REMOTE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.serial.to_string(),
            self.local.clone(),
            self.remote.clone(),
        ]
    }
}
