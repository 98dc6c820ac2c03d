pub mod context;
pub mod types;

pub use context::CommandContext;
pub use types::{
    DeviceData, DeviceId, DeviceState, TextEncoding, TransferDirection, TransferProgress,
};
