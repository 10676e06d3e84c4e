//! Type-tag routing shared by peer processing tasks and direct injection.

use crate::core::{Block, Transaction};
use crate::network::message::MessageKind;
use crate::network::reception::{offer, ReceptionChannel};
use data_encoding::HEXLOWER;
use log::{debug, warn};
use std::sync::mpsc::SyncSender;
use std::sync::{Arc, PoisonError, RwLock};

/// Generic message callback: `(peer_id, message_type, data)`.
///
/// Runs synchronously on whichever task performs the dispatch. A handler
/// running on a peer thread may disconnect peers, including its own, but such
/// a disconnect does not wait for the stopped thread to exit.
pub type MessageHandler = Arc<dyn Fn(&str, &str, &[u8]) + Send + Sync>;

/// What happened to one dispatched message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Queued on the block or transaction reception channel
    Queued,
    /// Reception channel was full
    Dropped,
    /// Passed to the registered handler
    Handled,
    /// Unknown type and no handler registered
    Discarded,
}

/// The node state a dispatch needs: its reception queues and handler slot.
///
/// Shared between the node and every peer task it starts.
pub(crate) struct Dispatcher {
    node_id: String,
    blocks: SyncSender<Vec<u8>>,
    transactions: SyncSender<Vec<u8>>,
    handler: RwLock<Option<MessageHandler>>,
}

impl Dispatcher {
    pub(crate) fn new(
        node_id: &str,
        reception_capacity: usize,
    ) -> (Arc<Dispatcher>, ReceptionChannel, ReceptionChannel) {
        let (blocks, block_channel) = ReceptionChannel::bounded("block", reception_capacity);
        let (transactions, tx_channel) =
            ReceptionChannel::bounded("transaction", reception_capacity);
        let dispatcher = Dispatcher {
            node_id: node_id.to_string(),
            blocks,
            transactions,
            handler: RwLock::new(None),
        };
        (Arc::new(dispatcher), block_channel, tx_channel)
    }

    pub(crate) fn node_id(&self) -> &str {
        &self.node_id
    }

    pub(crate) fn set_handler(&self, handler: Option<MessageHandler>) {
        let mut slot = self.handler.write().unwrap_or_else(PoisonError::into_inner);
        *slot = handler;
    }

    pub(crate) fn has_handler(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_handler(&self) -> Option<MessageHandler> {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Route one message by its type tag. Never blocks except inside a handler.
    pub(crate) fn dispatch(&self, peer_id: &str, message_type: &str, data: Vec<u8>) -> DispatchOutcome {
        match MessageKind::from_tag(message_type) {
            MessageKind::NewBlock => {
                if log::log_enabled!(log::Level::Debug) {
                    match Block::deserialize(&data) {
                        Ok(block) => debug!(
                            "SIMNET [{}]: Peer [{peer_id}] routing block {}",
                            self.node_id,
                            HEXLOWER.encode(block.get_hash())
                        ),
                        Err(e) => debug!(
                            "SIMNET [{}]: Peer [{peer_id}] routing undecodable block payload: {e}",
                            self.node_id
                        ),
                    }
                }
                self.enqueue(&self.blocks, "block", peer_id, data)
            }
            MessageKind::NewTransaction => {
                if log::log_enabled!(log::Level::Debug) {
                    match Transaction::deserialize(&data) {
                        Ok(tx) => debug!(
                            "SIMNET [{}]: Peer [{peer_id}] routing transaction {}",
                            self.node_id,
                            HEXLOWER.encode(tx.get_id())
                        ),
                        Err(e) => debug!(
                            "SIMNET [{}]: Peer [{peer_id}] routing undecodable transaction payload: {e}",
                            self.node_id
                        ),
                    }
                }
                self.enqueue(&self.transactions, "transaction", peer_id, data)
            }
            MessageKind::Other(tag) => match self.current_handler() {
                // the lock is released before the call so a handler may replace itself
                Some(handler) => {
                    debug!(
                        "SIMNET [{}]: Routing message type '{tag}' from [{peer_id}] to generic handler",
                        self.node_id
                    );
                    handler(peer_id, tag, &data);
                    DispatchOutcome::Handled
                }
                None => {
                    debug!(
                        "SIMNET [{}]: Unknown message type '{tag}' from [{peer_id}] and no handler, discarding",
                        self.node_id
                    );
                    DispatchOutcome::Discarded
                }
            },
        }
    }

    fn enqueue(
        &self,
        sender: &SyncSender<Vec<u8>>,
        channel: &str,
        peer_id: &str,
        data: Vec<u8>,
    ) -> DispatchOutcome {
        if offer(sender, data) {
            DispatchOutcome::Queued
        } else {
            warn!(
                "SIMNET [{}]: {channel} reception channel full, dropping message from [{peer_id}]",
                self.node_id
            );
            DispatchOutcome::Dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_builtin_types_reach_their_channels() {
        let (dispatcher, blocks, txs) = Dispatcher::new("n", 4);

        assert_eq!(
            dispatcher.dispatch("p", "NEW_BLOCK", b"b".to_vec()),
            DispatchOutcome::Queued
        );
        assert_eq!(
            dispatcher.dispatch("p", "NEW_TRANSACTION", b"t".to_vec()),
            DispatchOutcome::Queued
        );

        assert_eq!(blocks.drain(), vec![b"b".to_vec()]);
        assert_eq!(txs.drain(), vec![b"t".to_vec()]);
    }

    #[test]
    fn test_full_reception_channel_drops() {
        let (dispatcher, blocks, _txs) = Dispatcher::new("n", 1);

        assert_eq!(
            dispatcher.dispatch("p", "NEW_BLOCK", vec![1]),
            DispatchOutcome::Queued
        );
        assert_eq!(
            dispatcher.dispatch("p", "NEW_BLOCK", vec![2]),
            DispatchOutcome::Dropped
        );
        assert_eq!(blocks.drain(), vec![vec![1]]);
    }

    #[test]
    fn test_other_types_go_to_handler_or_nowhere() {
        let (dispatcher, blocks, txs) = Dispatcher::new("n", 4);
        assert_eq!(
            dispatcher.dispatch("p", "PING", vec![]),
            DispatchOutcome::Discarded
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.set_handler(Some(Arc::new(move |peer: &str, tag: &str, data: &[u8]| {
            sink.lock()
                .unwrap()
                .push((peer.to_string(), tag.to_string(), data.to_vec()));
        })));
        assert!(dispatcher.has_handler());

        assert_eq!(
            dispatcher.dispatch("p", "PING", vec![9]),
            DispatchOutcome::Handled
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("p".to_string(), "PING".to_string(), vec![9])]
        );
        assert!(blocks.try_recv().is_none());
        assert!(txs.try_recv().is_none());
    }

    #[test]
    fn test_handler_may_clear_itself() {
        let (dispatcher, _blocks, _txs) = Dispatcher::new("n", 1);
        let weak = Arc::downgrade(&dispatcher);
        dispatcher.set_handler(Some(Arc::new(move |_: &str, _: &str, _: &[u8]| {
            if let Some(d) = weak.upgrade() {
                d.set_handler(None);
            }
        })));

        assert_eq!(
            dispatcher.dispatch("p", "ONCE", vec![]),
            DispatchOutcome::Handled
        );
        assert_eq!(
            dispatcher.dispatch("p", "ONCE", vec![]),
            DispatchOutcome::Discarded
        );
    }
}
