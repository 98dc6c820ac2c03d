pub mod fixtures;
pub mod mocks;

pub use mocks::{MockConnector, MockHandle, MockTransport};
