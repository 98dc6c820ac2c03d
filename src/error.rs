use std::time::Duration;
use thiserror::Error;

/// Errors raised by the ADB protocol layer
#[derive(Error, Debug)]
pub enum AdbError {
    #[error("ADB connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Disconnected from ADB server: {0}")]
    Disconnected(String),

    #[error("Timed out after {0:?} waiting for the ADB server")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("ADB protocol error: {0}")]
    Protocol(String),

    #[error("Invalid sync command: {:?}", String::from_utf8_lossy(.0))]
    InvalidSyncCommand([u8; 4]),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("ADB server error: {0}")]
    Server(String),

    #[error("Device not found: {serial} ({message})")]
    DeviceNotFound { serial: String, message: String },

    #[error("Multiple devices found: {0}")]
    AmbiguousDevice(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdbError {
    /// The text the server sent in its `FAIL` frame, unmodified
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AdbError::Server(message)
            | AdbError::AmbiguousDevice(message)
            | AdbError::DeviceNotFound { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the server rejected a forward because the local end is taken.
    ///
    /// The wire protocol has no error code for this; the server's message
    /// text is the only signal.
    pub fn is_already_bound(&self) -> bool {
        self.server_message()
            .map(|m| m.to_lowercase().contains("cannot rebind"))
            .unwrap_or(false)
    }

    /// The connection that produced this error must be closed or reconnected
    pub fn is_fatal_to_connection(&self) -> bool {
        matches!(
            self,
            AdbError::Io(_)
                | AdbError::Disconnected(_)
                | AdbError::Timeout(_)
                | AdbError::Cancelled
                | AdbError::Protocol(_)
                | AdbError::InvalidSyncCommand(_)
        )
    }
}

impl From<toml::de::Error> for AdbError {
    fn from(err: toml::de::Error) -> Self {
        AdbError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdbError>;
