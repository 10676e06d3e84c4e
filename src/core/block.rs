use crate::core::Transaction;
use crate::error::{BlockchainError, Result};
use crate::utils::{current_timestamp, deserialize, serialize, sha256_digest, sha256_fields};
use serde::{Deserialize, Serialize};

/// A proposed block as carried by `NEW_BLOCK` messages.
///
/// Proposer, signature and state root are filled in by consensus; the relay
/// only needs the hash for logging and the bytes for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    height: i64,
    timestamp: i64,
    prev_block_hash: Vec<u8>,
    transactions: Vec<Transaction>,
    proposer_address: Vec<u8>,
    signature: Vec<u8>,
    hash: Vec<u8>,
    state_root: Vec<u8>,
}

impl Block {
    pub fn new_block(
        height: i64,
        prev_block_hash: &[u8],
        transactions: &[Transaction],
    ) -> Result<Block> {
        if height < 0 {
            return Err(BlockchainError::InvalidBlock(format!(
                "Block height must not be negative, got {height}"
            )));
        }

        let mut block = Block {
            height,
            timestamp: current_timestamp()?,
            prev_block_hash: prev_block_hash.to_vec(),
            transactions: transactions.to_vec(),
            proposer_address: vec![],
            signature: vec![],
            hash: vec![],
            state_root: vec![],
        };
        block.hash = block.header_hash();
        Ok(block)
    }

    /// Attach the proposer identity and signature, then rehash.
    pub fn seal(&mut self, proposer_address: &[u8], signature: &[u8]) {
        self.proposer_address = proposer_address.to_vec();
        self.signature = signature.to_vec();
        self.hash = self.header_hash();
    }

    pub fn set_state_root(&mut self, state_root: &[u8]) {
        self.state_root = state_root.to_vec();
    }

    pub fn hash_transactions(&self) -> Vec<u8> {
        let mut ids = vec![];
        for tx in &self.transactions {
            ids.extend_from_slice(tx.get_id());
        }
        sha256_digest(ids.as_slice())
    }

    fn header_hash(&self) -> Vec<u8> {
        let height = self.height.to_be_bytes();
        let timestamp = self.timestamp.to_be_bytes();
        let txs = self.hash_transactions();
        sha256_fields(&[
            height.as_slice(),
            timestamp.as_slice(),
            self.prev_block_hash.as_slice(),
            txs.as_slice(),
            self.proposer_address.as_slice(),
            self.signature.as_slice(),
        ])
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn get_height(&self) -> i64 {
        self.height
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_prev_block_hash(&self) -> &[u8] {
        self.prev_block_hash.as_slice()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_proposer_address(&self) -> &[u8] {
        self.proposer_address.as_slice()
    }

    pub fn get_hash(&self) -> &[u8] {
        self.hash.as_slice()
    }

    pub fn get_state_root(&self) -> &[u8] {
        self.state_root.as_slice()
    }
}
