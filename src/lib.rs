//! Client for the Android Debug Bridge socket protocol.
//!
//! [`adb::AdbClient`] is the entry point: host requests, device selection,
//! shell streams, the sync file-transfer protocol and port forwarding, all
//! over connections to a local `adb` server.

pub mod adb;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod output;
pub mod progress;

pub use adb::AdbClient;
pub use config::ClientConfig;
pub use error::{AdbError, Result};

#[cfg(test)]
pub mod testing;
