use crate::adb::transport::{Connector, Transport};
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct MockState {
    input: Vec<u8>,
    position: usize,
    output: Vec<u8>,
    max_read: Option<usize>,
    closed: bool,
    reconnects: usize,
    fail_send: bool,
}

/// Scripted transport: serves pre-recorded server bytes and captures what the
/// client writes
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    cancel: CancellationToken,
}

/// Shared view of a [`MockTransport`] that stays usable after the transport
/// has been boxed and handed to the code under test
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
    cancel: CancellationToken,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_input(self, bytes: impl AsRef<[u8]>) -> Self {
        self.state
            .lock()
            .unwrap()
            .input
            .extend_from_slice(bytes.as_ref());
        self
    }

    /// Serve at most `n` bytes per `receive` call
    pub fn with_max_read(self, n: usize) -> Self {
        self.state.lock().unwrap().max_read = Some(n);
        self
    }

    pub fn fail_sends(self) -> Self {
        self.state.lock().unwrap().fail_send = true;
        self
    }

    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: self.state.clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn boxed(self) -> Box<dyn Transport> {
        Box::new(self)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHandle {
    /// Everything the client has sent so far
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().output.clone()
    }

    /// Scripted server bytes not yet consumed
    pub fn remaining(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.input.len() - state.position
    }

    pub fn reconnects(&self) -> usize {
        self.state.lock().unwrap().reconnects
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(AdbError::Cancelled);
        }
        let mut state = self.state.lock().unwrap();
        if state.closed || state.fail_send {
            return Err(AdbError::Disconnected("mock socket is closed".into()));
        }
        state.output.extend_from_slice(data);
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(AdbError::Cancelled);
        }
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(AdbError::Disconnected("mock socket is closed".into()));
        }
        let available = state.input.len() - state.position;
        let mut n = available.min(buf.len());
        if let Some(max) = state.max_read {
            n = n.min(max);
        }
        let start = state.position;
        buf[..n].copy_from_slice(&state.input[start..start + n]);
        state.position += n;
        Ok(n)
    }

    async fn reconnect(&mut self, force: bool) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if force || state.closed {
            state.reconnects += 1;
            state.closed = false;
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.state.lock().unwrap().closed = true;
    }

    fn is_connected(&self) -> bool {
        !self.state.lock().unwrap().closed && !self.cancel.is_cancelled()
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Hands out queued transports in order, one per `connect`
#[derive(Default)]
pub struct MockConnector {
    transports: Mutex<VecDeque<MockTransport>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(self, transport: MockTransport) -> Self {
        self.transports.lock().unwrap().push_back(transport);
        self
    }

    pub fn pending(&self) -> usize {
        self.transports.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>> {
        self.transports
            .lock()
            .unwrap()
            .pop_front()
            .map(MockTransport::boxed)
            .ok_or_else(|| AdbError::Disconnected("connection refused".into()))
    }
}
