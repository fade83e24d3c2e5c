//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use pcprox_lib::error::{PcProxError, TransportError};
#[allow(unused_imports)]
pub use pcprox_lib::frame::{Frame, decode_response};
#[allow(unused_imports)]
pub use pcprox_lib::{
    CardLayout, CardScan, Configuration, Page, Page0, Page1, Page2, PageNumber, ParityBits, PcProx, PersistMask,
    RawQuery, State,
};

use async_trait::async_trait;
use pcprox_lib::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    written: Vec<Frame>,
    replies: VecDeque<Frame>,
    fail_writes: usize,
}

/// Transport that records writes and plays back queued replies.
///
/// Clones share the same script, so a test can keep one handle while the
/// sequencer owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn with_replies(replies: impl IntoIterator<Item = Frame>) -> Self {
        let mock = Self::default();
        mock.script.lock().unwrap().replies.extend(replies);
        mock
    }

    pub fn push_reply(&self, reply: Frame) {
        self.script.lock().unwrap().replies.push_back(reply);
    }

    /// Make the next `count` writes fail.
    pub fn fail_writes(&self, count: usize) {
        self.script.lock().unwrap().fail_writes = count;
    }

    pub fn written(&self) -> Vec<Frame> {
        self.script.lock().unwrap().written.clone()
    }

    pub fn pending_replies(&self) -> usize {
        self.script.lock().unwrap().replies.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&mut self, frame: Frame) -> Result<(), TransportError> {
        let mut script = self.script.lock().unwrap();
        if script.fail_writes > 0 {
            script.fail_writes -= 1;
            return Err(TransportError::Disconnected);
        }
        script.written.push(frame);
        Ok(())
    }

    async fn read(&mut self) -> Result<Frame, TransportError> {
        self.script
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .ok_or(TransportError::Disconnected)
    }
}

/// Sequencer over a fresh mock, plus a handle to inspect it.
#[allow(dead_code)]
pub fn mock_reader(replies: impl IntoIterator<Item = Frame>) -> (PcProx<MockTransport>, MockTransport) {
    let mock = MockTransport::with_replies(replies);
    (PcProx::new(mock.clone()), mock)
}

/// Decode hex string to a frame for testing
#[allow(dead_code)]
pub fn frame(hex_data: &str) -> Frame {
    hex::decode(hex_data)
        .expect("Failed to decode hex")
        .try_into()
        .expect("Frame must be 8 bytes")
}

/// Page 0 as read from a reader configured for 26-bit H10301 cards
#[allow(dead_code)]
pub const H10301_PAGE0: &str = "000a11181a2d0d89";

#[allow(dead_code)]
pub const NO_REPLIES: [Frame; 0] = [];

/// Route library logs to the test harness. Filter with `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
