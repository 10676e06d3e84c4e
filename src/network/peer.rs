//! One remote counterpart: a bounded mailbox drained by a dedicated thread.
//!
//! The processing thread exists exactly while the peer is `Running`. It
//! blocks on the mailbox and, for each message, applies the owning node's
//! dispatch rule. Stopping raises a flag and drops the only mailbox sender,
//! which wakes the thread; anything still buffered is discarded. The thread
//! itself moves the peer from `Stopping` to `Stopped` on its way out.

use crate::error::{BlockchainError, Result};
use crate::network::dispatch::Dispatcher;
use crate::network::message::NetworkMessage;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::cell::Cell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

thread_local! {
    static ON_PEER_PROCESSOR: Cell<bool> = const { Cell::new(false) };
}

/// True on any peer's processing thread, i.e. inside a message handler
fn on_peer_processor() -> bool {
    ON_PEER_PROCESSOR.with(Cell::get)
}

/// Lifecycle of a peer. Transitions only move forward; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Created,
    Running,
    Stopping,
    Stopped,
}

pub struct Peer {
    id: String,
    node_id: String,
    mailbox_capacity: usize,
    mailbox: Mutex<Option<SyncSender<NetworkMessage>>>,
    inbox: Mutex<Option<Receiver<NetworkMessage>>>,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<PeerState>>,
    processor: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl Peer {
    pub(crate) fn new(id: &str, node_id: &str, mailbox_capacity: usize) -> Peer {
        let (sender, receiver) = mpsc::sync_channel(mailbox_capacity);
        Peer {
            id: id.to_string(),
            node_id: node_id.to_string(),
            mailbox_capacity,
            mailbox: Mutex::new(Some(sender)),
            inbox: Mutex::new(Some(receiver)),
            stop: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(PeerState::Created)),
            processor: Mutex::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> PeerState {
        *lock(&self.state)
    }

    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
    }

    /// Messages refused because the mailbox was full or closed
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Non-blocking enqueue into the mailbox.
    ///
    /// Returns `false` if the message was dropped: mailbox full, or the peer
    /// has been stopped.
    pub fn deliver(&self, message: NetworkMessage) -> bool {
        let mailbox = lock(&self.mailbox);
        let delivered = match mailbox.as_ref() {
            Some(sender) => match sender.try_send(message) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
            },
            None => false,
        };
        if !delivered {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        delivered
    }

    /// Spawn the processing thread, bound to `dispatcher` for its lifetime.
    pub(crate) fn start_processor(&self, dispatcher: Arc<Dispatcher>) -> Result<()> {
        let mut state = lock(&self.state);
        if *state != PeerState::Created {
            return Err(BlockchainError::ConnectionFailed(format!(
                "peer [{}] processor cannot start from state {:?}",
                self.id, *state
            )));
        }
        let inbox = lock(&self.inbox).take().ok_or_else(|| {
            BlockchainError::ConnectionFailed(format!("peer [{}] mailbox already taken", self.id))
        })?;

        let peer_id = self.id.clone();
        let stop = Arc::clone(&self.stop);
        let exit_state = Arc::clone(&self.state);
        let handle = thread::Builder::new()
            .name(format!("simnet-peer-{}", self.id))
            .spawn(move || run_processor(peer_id, inbox, stop, exit_state, dispatcher))
            .map_err(|e| {
                BlockchainError::ConnectionFailed(format!(
                    "failed to spawn processor for peer [{}]: {e}",
                    self.id
                ))
            })?;

        *lock(&self.processor) = Some(handle);
        *state = PeerState::Running;
        Ok(())
    }

    /// Request the processing thread to stop and wait until it has exited.
    ///
    /// Called from a peer processing thread (a message handler), the wait is
    /// skipped: joining there could wait on this thread or on a peer that is
    /// itself waiting to stop ours. The peer then stays `Stopping` until its
    /// thread has returned from the current message.
    pub(crate) fn stop_processor(&self) {
        {
            let mut state = lock(&self.state);
            match *state {
                PeerState::Running => {
                    self.stop.store(true, Ordering::Release);
                    *state = PeerState::Stopping;
                }
                PeerState::Created => {
                    lock(&self.mailbox).take();
                    *state = PeerState::Stopped;
                    return;
                }
                PeerState::Stopping | PeerState::Stopped => return,
            }
        }

        // last sender gone: a blocked recv wakes up
        lock(&self.mailbox).take();

        if on_peer_processor() {
            warn!(
                "SIMNET [{}]: Peer [{}] stopped from a message handler; it exits after the current message",
                self.node_id, self.id
            );
            return;
        }

        let handle = lock(&self.processor).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!(
                    "SIMNET [{}]: Processor for peer [{}] panicked",
                    self.node_id, self.id
                );
            }
        }

        *lock(&self.state) = PeerState::Stopped;
    }
}

/// Marks the peer `Stopped` when its processing thread exits, panics included.
struct ProcessorExit(Arc<Mutex<PeerState>>);

impl Drop for ProcessorExit {
    fn drop(&mut self) {
        *lock(&self.0) = PeerState::Stopped;
    }
}

fn run_processor(
    peer_id: String,
    inbox: Receiver<NetworkMessage>,
    stop: Arc<AtomicBool>,
    state: Arc<Mutex<PeerState>>,
    dispatcher: Arc<Dispatcher>,
) {
    let _exit = ProcessorExit(state);
    ON_PEER_PROCESSOR.with(|flag| flag.set(true));

    let node_id = dispatcher.node_id().to_string();
    info!("SIMNET_PEER_PROCESSOR [{node_id}]: Starting message processor for peer [{peer_id}]");

    while let Ok(message) = inbox.recv() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        let (message_type, data) = message.into_parts();
        dispatcher.dispatch(&peer_id, &message_type, data);
    }

    info!("SIMNET_PEER_PROCESSOR [{node_id}]: Stopping message processor for peer [{peer_id}]");
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
