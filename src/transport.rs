use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("radio link is down")]
    LinkDown,
    #[error("link write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte-oriented radio/serial link.
///
/// Writes are best-effort framed sends with no acknowledgement. The read side
/// is polled: `data_available` is the command-session readiness check and
/// `read_byte` never blocks.
pub trait Transport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    fn data_available(&self) -> bool;
    fn read_byte(&mut self) -> Option<u8>;
}

/// In-memory transport double: scripted input bytes, captured output.
///
/// Used by the test suites and anywhere a node runs without a radio.
#[derive(Debug, Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    link_down: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to appear as operator input.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Everything written to the link so far, in order.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// Force subsequent writes to fail, for error-path tests.
    pub fn set_link_down(&mut self, down: bool) {
        self.link_down = down;
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.link_down {
            return Err(TransportError::LinkDown);
        }
        self.tx.extend_from_slice(bytes);
        Ok(())
    }

    fn data_available(&self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}
