use crate::config::NetworkConfig;
use crate::core::{Block, Transaction};
use crate::error::{BlockchainError, Result};
use crate::network::dispatch::{DispatchOutcome, Dispatcher, MessageHandler};
use crate::network::message::{NetworkMessage, WirePayload};
use crate::network::peer::Peer;
use crate::network::reception::ReceptionChannel;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Per-call summary of a broadcast. Drops are not errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastResult {
    /// Peers whose mailbox accepted the message
    pub sent: usize,
    /// Peers whose mailbox was full or closed
    pub dropped: usize,
}

/// In-process stand-in for a P2P transport.
///
/// Owns the node's reception channels, its optional generic handler and the
/// registry of connected peers. Every peer runs its own processing thread that
/// feeds this node's channels. Dropping the node disconnects all peers.
pub struct NetworkNode {
    node_id: String,
    config: NetworkConfig,
    dispatcher: Arc<Dispatcher>,
    block_channel: ReceptionChannel,
    transaction_channel: ReceptionChannel,
    peers: RwLock<HashMap<String, Arc<Peer>>>,
}

impl NetworkNode {
    /// Node with default capacities; an empty id becomes `default_sim_node`
    pub fn new(node_id: &str) -> NetworkNode {
        Self::build(NetworkConfig::for_node(node_id))
    }

    pub fn with_config(config: NetworkConfig) -> Result<NetworkNode> {
        let config = config.normalized();
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: NetworkConfig) -> NetworkNode {
        let (dispatcher, block_channel, transaction_channel) =
            Dispatcher::new(&config.node_id, config.reception_capacity);
        info!(
            "SIMNET [{}]: Node created (mailbox capacity {}, reception capacity {})",
            config.node_id, config.mailbox_capacity, config.reception_capacity
        );
        NetworkNode {
            node_id: config.node_id.clone(),
            config,
            dispatcher,
            block_channel,
            transaction_channel,
            peers: RwLock::new(HashMap::new()),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Register `peer_id` and start its processing thread.
    ///
    /// Connecting an id that is already registered returns the existing peer.
    /// Lookup, creation, thread start and insertion happen under one write
    /// lock, so concurrent callers never create two peers for the same id.
    pub fn connect_peer(&self, peer_id: &str) -> Result<Arc<Peer>> {
        if peer_id.is_empty() {
            return Err(BlockchainError::InvalidPeer(format!(
                "SIMNET [{}]: cannot connect to peer with empty ID",
                self.node_id
            )));
        }
        if peer_id == self.node_id {
            return Err(BlockchainError::InvalidPeer(format!(
                "SIMNET [{}]: cannot connect to self",
                self.node_id
            )));
        }

        let mut peers = self.write_peers();

        if let Some(existing) = peers.get(peer_id) {
            debug!(
                "SIMNET [{}]: Peer [{peer_id}] already connected",
                self.node_id
            );
            return Ok(Arc::clone(existing));
        }

        if let Some(max_peers) = self.config.max_peers {
            if peers.len() >= max_peers {
                return Err(BlockchainError::ResourceExhausted(format!(
                    "SIMNET [{}]: peer limit {max_peers} reached, refusing [{peer_id}]",
                    self.node_id
                )));
            }
        }

        let peer = Arc::new(Peer::new(
            peer_id,
            &self.node_id,
            self.config.mailbox_capacity,
        ));
        peer.start_processor(Arc::clone(&self.dispatcher))?;
        peers.insert(peer_id.to_string(), Arc::clone(&peer));

        info!(
            "SIMNET [{}]: Connected to peer [{peer_id}] and started its processor.",
            self.node_id
        );
        Ok(peer)
    }

    /// Remove `peer_id` and wait for its processing thread to exit.
    ///
    /// Returns `false` if the peer was not connected. Once this returns, no
    /// further message is dispatched on behalf of that peer.
    ///
    /// From inside a message handler the call does not wait: the peer is left
    /// `Stopping` and its thread finishes the message it is on before exiting.
    pub fn disconnect_peer(&self, peer_id: &str) -> bool {
        let removed = self.write_peers().remove(peer_id);
        match removed {
            Some(peer) => {
                info!(
                    "SIMNET [{}]: Disconnecting from peer [{peer_id}]...",
                    self.node_id
                );
                peer.stop_processor();
                info!(
                    "SIMNET [{}]: Disconnected from peer [{peer_id}] and stopped its processor.",
                    self.node_id
                );
                true
            }
            None => {
                debug!(
                    "SIMNET [{}]: Peer [{peer_id}] not found for disconnection.",
                    self.node_id
                );
                false
            }
        }
    }

    /// Disconnect every peer
    pub fn shutdown(&self) {
        let drained: Vec<Arc<Peer>> = self.write_peers().drain().map(|(_, peer)| peer).collect();
        if drained.is_empty() {
            return;
        }
        info!(
            "SIMNET [{}]: Shutting down {} peer processors",
            self.node_id,
            drained.len()
        );
        for peer in drained {
            peer.stop_processor();
        }
    }

    pub fn broadcast_block(&self, block: &Block) -> BroadcastResult {
        self.broadcast(block)
    }

    pub fn broadcast_transaction(&self, tx: &Transaction) -> BroadcastResult {
        self.broadcast(tx)
    }

    /// Serialize `payload` once and offer it to every connected peer.
    ///
    /// A serialization failure is logged and nothing is sent.
    pub fn broadcast<P: WirePayload>(&self, payload: &P) -> BroadcastResult {
        let data = match payload.to_wire() {
            Ok(data) => data,
            Err(e) => {
                error!(
                    "SIMNET [{}]: ERROR serializing {} for broadcast: {e}",
                    self.node_id,
                    payload.label()
                );
                return BroadcastResult::default();
            }
        };

        info!(
            "SIMNET [{}]: Broadcasting {} message (size {}) for {}",
            self.node_id,
            P::MESSAGE_TYPE,
            data.len(),
            payload.label()
        );
        self.broadcast_message(NetworkMessage::new(P::MESSAGE_TYPE, data))
    }

    /// Offer an already built message to every connected peer's mailbox
    pub fn broadcast_message(&self, message: NetworkMessage) -> BroadcastResult {
        let snapshot: Vec<Arc<Peer>> = self.read_peers().values().cloned().collect();
        let mut result = BroadcastResult::default();

        for peer in &snapshot {
            if peer.deliver(message.clone()) {
                result.sent += 1;
            } else {
                result.dropped += 1;
                warn!(
                    "SIMNET [{}]: Peer [{}]'s mailbox full for type {}. Message dropped.",
                    self.node_id,
                    peer.id(),
                    message.message_type()
                );
            }
        }
        result
    }

    /// Install, replace or (with `None`) clear the generic message handler
    pub fn register_message_handler(&self, handler: Option<MessageHandler>) {
        let installing = handler.is_some();
        self.dispatcher.set_handler(handler);
        if installing {
            info!("SIMNET [{}]: Generic message handler registered.", self.node_id);
        } else {
            info!("SIMNET [{}]: Generic message handler cleared.", self.node_id);
        }
    }

    pub fn has_message_handler(&self) -> bool {
        self.dispatcher.has_handler()
    }

    /// Dispatch a message as if `peer_id` had sent it.
    ///
    /// `peer_id` need not be connected and no mailbox is involved; a handler,
    /// if invoked, runs on the caller's thread.
    pub fn simulate_receive(
        &self,
        peer_id: &str,
        message_type: &str,
        data: Vec<u8>,
    ) -> DispatchOutcome {
        debug!(
            "SIMNET [{}]: Simulating message reception from peer [{peer_id}] - Type: {message_type}, Size: {} bytes",
            self.node_id,
            data.len()
        );
        self.dispatcher.dispatch(peer_id, message_type, data)
    }

    pub fn block_reception_channel(&self) -> &ReceptionChannel {
        &self.block_channel
    }

    pub fn transaction_reception_channel(&self) -> &ReceptionChannel {
        &self.transaction_channel
    }

    pub fn peer(&self, peer_id: &str) -> Option<Arc<Peer>> {
        self.read_peers().get(peer_id).cloned()
    }

    pub fn is_connected(&self, peer_id: &str) -> bool {
        self.read_peers().contains_key(peer_id)
    }

    pub fn peer_count(&self) -> usize {
        self.read_peers().len()
    }

    /// Connected peer ids in sorted order
    pub fn peer_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read_peers().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn read_peers(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Peer>>> {
        self.peers.read().unwrap_or_else(|poisoned| {
            error!("SIMNET [{}]: peer registry lock poisoned", self.node_id);
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_peers(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Peer>>> {
        self.peers.write().unwrap_or_else(|poisoned| {
            error!("SIMNET [{}]: peer registry lock poisoned", self.node_id);
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Drop for NetworkNode {
    fn drop(&mut self) {
        self.shutdown();
    }
}
