pub mod client;
pub mod connection;
pub mod file_stat;
pub mod forward;
pub mod protocol;
pub mod shell;
pub mod sync;
pub mod transport;

pub use client::AdbClient;
pub use connection::{AdbConnection, AdbResponse};
pub use file_stat::{FileStatistics, FileStatisticsEx, FileType, UnixFileMode};
pub use forward::{ForwardData, ForwardSpec};
pub use protocol::{AdbCommand, SyncCommand};
pub use shell::{CollectingReceiver, FnReceiver, OutputReceiver, ShellStream};
pub use sync::{SyncService, SyncState, SyncVersion};
pub use transport::{Connector, TcpConnector, TcpTransport, Transport};

pub use crate::error::Result;

#[cfg(test)]
mod forward_test;
#[cfg(test)]
mod protocol_test;
#[cfg(test)]
mod shell_test;
