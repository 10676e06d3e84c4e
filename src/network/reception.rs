use log::warn;
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::{mpsc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Receive side of a node's inbound block or transaction queue.
///
/// The node keeps the sending half; consumers only get the methods below.
pub struct ReceptionChannel {
    name: &'static str,
    capacity: usize,
    receiver: Mutex<Receiver<Vec<u8>>>,
}

impl ReceptionChannel {
    pub(crate) fn bounded(name: &'static str, capacity: usize) -> (SyncSender<Vec<u8>>, Self) {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        (
            sender,
            ReceptionChannel {
                name,
                capacity,
                receiver: Mutex::new(receiver),
            },
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Next payload if one is already queued
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        self.poll().ok()
    }

    /// Wait up to `timeout` for the next payload.
    ///
    /// The receiver lock is only held for each non-blocking poll, so other
    /// consumers calling `try_recv` or `drain` meanwhile are not held up.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.poll() {
                Ok(data) => return Some(data),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) => {}
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Everything queued right now, oldest first
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let receiver = self.lock();
        let mut items = Vec::new();
        while let Ok(data) = receiver.try_recv() {
            items.push(data);
        }
        items
    }

    fn poll(&self) -> Result<Vec<u8>, TryRecvError> {
        self.lock().try_recv()
    }

    fn lock(&self) -> MutexGuard<'_, Receiver<Vec<u8>>> {
        self.receiver.lock().unwrap_or_else(|poisoned| {
            warn!("{} reception channel lock was poisoned, recovering", self.name);
            PoisonError::into_inner(poisoned)
        })
    }
}

/// Non-blocking send into a reception queue; `false` when the payload was dropped
pub(crate) fn offer(sender: &SyncSender<Vec<u8>>, data: Vec<u8>) -> bool {
    match sender.try_send(data) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
    }
}
