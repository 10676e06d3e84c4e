//! Test utilities for network testing

use crate::core::{Block, TXInput, TXOutput, Transaction};
use crate::network::MessageHandler;
use crate::utils::sha256_digest;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Generous upper bound for anything a peer thread should do promptly
pub const WAIT: Duration = Duration::from_secs(2);

/// Window in which nothing is expected to arrive
pub const QUIET: Duration = Duration::from_millis(50);

/// A block whose hash depends on `label`
pub fn create_test_block(label: &str) -> Block {
    let prev = sha256_digest(format!("prev_{label}").as_bytes());
    let mut block = Block::new_block(1, &prev, &[create_test_tx(label)])
        .expect("test block should build");
    block.seal(
        &sha256_digest(format!("proposer_{label}").as_bytes()),
        &sha256_digest(format!("sig_{label}").as_bytes()),
    );
    block
}

pub fn create_test_tx(label: &str) -> Transaction {
    let prev_tx = sha256_digest(format!("txid_{label}").as_bytes());
    let output = TXOutput::new(10, &sha256_digest(label.as_bytes())).expect("valid output");
    Transaction::new_standard(vec![TXInput::new(&prev_tx, 0)], vec![output], 1)
        .expect("test transaction should build")
}

/// One recorded handler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledMessage {
    pub peer_id: String,
    pub message_type: String,
    pub data: Vec<u8>,
}

/// Handler that records every call
pub fn recording_handler() -> (MessageHandler, Arc<Mutex<Vec<HandledMessage>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let handler: MessageHandler = Arc::new(move |peer_id: &str, message_type: &str, data: &[u8]| {
        sink.lock().unwrap().push(HandledMessage {
            peer_id: peer_id.to_string(),
            message_type: message_type.to_string(),
            data: data.to_vec(),
        });
    });
    (handler, calls)
}

/// Handler that blocks the dispatching thread until the gate is released.
///
/// Each call first reports `(peer_id, message_type)` on the returned receiver.
/// Dropping the returned `Sender<()>` opens the gate for good.
pub fn gated_handler() -> (MessageHandler, Receiver<(String, String)>, Sender<()>) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let gate_rx = Mutex::new(gate_rx);
    let handler: MessageHandler = Arc::new(move |peer_id: &str, message_type: &str, _: &[u8]| {
        let _ = entered_tx
            .lock()
            .unwrap()
            .send((peer_id.to_string(), message_type.to_string()));
        let _ = gate_rx.lock().unwrap().recv();
    });
    (handler, entered_rx, gate_tx)
}

/// Poll `condition` until it holds or `WAIT` elapses
pub fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = std::time::Instant::now() + WAIT;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
