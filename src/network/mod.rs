//! Simulated peer-to-peer transport
//!
//! An in-process stand-in for real sockets: a node broadcasts blocks and
//! transactions into per-peer mailboxes, and each peer's processing thread
//! routes what it receives back into the node's reception channels or its
//! generic message handler.
//!
//! Every send into a bounded queue is non-blocking; on overflow the message
//! is dropped and logged.

pub mod dispatch;
pub mod message;
pub mod node;
pub mod peer;
pub mod reception;

pub use dispatch::{DispatchOutcome, MessageHandler};
pub use message::{MessageKind, NetworkMessage, WirePayload, NEW_BLOCK, NEW_TRANSACTION};
pub use node::{BroadcastResult, NetworkNode};
pub use peer::{Peer, PeerState};
pub use reception::ReceptionChannel;
