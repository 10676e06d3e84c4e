//! # Simnet Relay - in-process peer message routing
//!
//! A stand-in for a peer-to-peer transport that lets node logic be exercised
//! without sockets. A [`NetworkNode`] keeps a registry of connected peers,
//! each owning a bounded mailbox and one processing thread. Broadcasting a
//! block or transaction serializes it once and offers it to every mailbox
//! without blocking; peer threads dispatch by message type into the node's
//! block and transaction reception channels, or to a registered handler.
//!
//! ## Layout
//! - `network/`: node, peers, dispatch rule, message envelope, reception channels
//! - `core/`: the block and transaction payloads that get broadcast
//! - `config/`: node identity and channel bounds (defaults, env, TOML)
//! - `error/`: the crate-wide error enum
//! - `utils/`: hashing, timestamps, bincode wire encoding
//! - `cli/`: argument parsing for the `simnet` binary

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;

#[cfg(test)]
pub mod testnet;

pub use cli::{Command, Opt};
pub use config::NetworkConfig;
pub use core::{Block, TXInput, TXOutput, Transaction, TxType};
pub use error::{BlockchainError, Result};
pub use network::{
    BroadcastResult, DispatchOutcome, MessageHandler, MessageKind, NetworkMessage, NetworkNode,
    Peer, PeerState, ReceptionChannel, WirePayload, NEW_BLOCK, NEW_TRANSACTION,
};
pub use utils::{current_timestamp, sha256_digest};
