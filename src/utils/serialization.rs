// Wire encoding shared by every payload that crosses the relay.
// bincode 2 with the standard configuration; the bytes are opaque to the network layer.
use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};

/// Encode a value into its wire bytes
pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    bincode::encode_to_vec(data, bincode::config::standard())
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}

/// Decode a value from wire bytes, rejecting trailing garbage
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let (data, consumed) = bincode::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if consumed != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Deserialization left {} trailing bytes",
            bytes.len() - consumed
        )));
    }
    Ok(data)
}
