// Transactions as the relay sees them: a value that can be turned into wire
// bytes and back. Signing and UTXO validation live with the chain logic, not here.

use crate::error::{BlockchainError, Result};
use crate::utils::{current_timestamp, deserialize, serialize, sha256_fields};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub enum TxType {
    Standard,
    ContractDeploy,
    ContractCall,
    StimulusPayment,
    WealthTax,
}

// A reference to an output of an earlier transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXInput {
    prev_tx_id: Vec<u8>,
    vout: u32,
    pub_key: Vec<u8>,
    script_sig: Vec<u8>,
}

impl TXInput {
    pub fn new(prev_tx_id: &[u8], vout: u32) -> TXInput {
        TXInput {
            prev_tx_id: prev_tx_id.to_vec(),
            vout,
            ..Default::default()
        }
    }

    pub fn get_prev_tx_id(&self) -> &[u8] {
        self.prev_tx_id.as_slice()
    }

    pub fn get_vout(&self) -> u32 {
        self.vout
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: u64,
    pub_key_hash: Vec<u8>,
}

impl TXOutput {
    pub fn new(value: u64, pub_key_hash: &[u8]) -> Result<TXOutput> {
        if value == 0 {
            return Err(BlockchainError::Transaction(
                "Output value must be positive".to_string(),
            ));
        }
        Ok(TXOutput {
            value,
            pub_key_hash: pub_key_hash.to_vec(),
        })
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_pub_key_hash(&self) -> &[u8] {
        self.pub_key_hash.as_slice()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    id: Vec<u8>,
    timestamp: i64,
    tx_type: TxType,
    inputs: Vec<TXInput>,
    outputs: Vec<TXOutput>,
    fee: u64,
    nonce: Vec<u8>,
}

impl Transaction {
    /// Build a transaction and stamp its content id.
    ///
    /// A random nonce keeps two otherwise identical transactions created in the
    /// same nanosecond from colliding on id.
    pub fn new(
        tx_type: TxType,
        inputs: Vec<TXInput>,
        outputs: Vec<TXOutput>,
        fee: u64,
    ) -> Result<Transaction> {
        let mut tx = Transaction {
            id: vec![],
            timestamp: current_timestamp()?,
            tx_type,
            inputs,
            outputs,
            fee,
            nonce: Uuid::new_v4().as_bytes().to_vec(),
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    pub fn new_standard(inputs: Vec<TXInput>, outputs: Vec<TXOutput>, fee: u64) -> Result<Transaction> {
        Self::new(TxType::Standard, inputs, outputs, fee)
    }

    /// Content hash over every field except the id itself
    pub fn hash(&self) -> Result<Vec<u8>> {
        let mut copy = self.clone();
        copy.id = vec![];
        let body = serialize(&copy)?;
        Ok(sha256_fields(&[b"tx".as_slice(), body.as_slice()]))
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize::<Transaction>(bytes)
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_tx_type(&self) -> TxType {
        self.tx_type
    }

    pub fn get_inputs(&self) -> &[TXInput] {
        self.inputs.as_slice()
    }

    pub fn get_outputs(&self) -> &[TXOutput] {
        self.outputs.as_slice()
    }

    pub fn get_fee(&self) -> u64 {
        self.fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        let output = TXOutput::new(50, b"recipient").unwrap();
        Transaction::new_standard(vec![TXInput::new(b"prev", 0)], vec![output], 1).unwrap()
    }

    #[test]
    fn test_transaction_id_matches_hash() {
        let tx = sample_tx();
        assert_eq!(tx.get_id(), tx.hash().unwrap().as_slice());
        assert_eq!(tx.get_id().len(), 32);
    }

    #[test]
    fn test_transactions_get_distinct_ids() {
        assert_ne!(sample_tx().get_id(), sample_tx().get_id());
    }

    #[test]
    fn test_zero_value_output_rejected() {
        assert!(TXOutput::new(0, b"x").is_err());
    }

    #[test]
    fn test_wire_bytes_decode_to_same_transaction() {
        let tx = sample_tx();
        let bytes = tx.serialize().unwrap();
        let decoded = Transaction::deserialize(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.get_tx_type(), TxType::Standard);
    }
}
