pub mod device_data;
pub mod manager;
pub mod tracker;

pub use device_data::{parse_device_line, parse_device_list};
pub use manager::DeviceManager;
pub use tracker::DeviceTracker;
