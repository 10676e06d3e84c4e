//! Block and transaction data model
//!
//! The relay treats both as opaque payloads: it only needs their wire bytes
//! for transport and their hash/id for logging.

pub mod block;
pub mod transaction;

pub use block::Block;
pub use transaction::{TXInput, TXOutput, Transaction, TxType};
