use ring::digest::{Context, SHA256};

use crate::error::{BlockchainError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, as stamped on blocks and transactions.
pub fn current_timestamp() -> Result<i64> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| BlockchainError::Crypto(format!("System time error: {e}")))?
        .as_nanos();

    i64::try_from(nanos).map_err(|_| BlockchainError::Crypto("Timestamp overflow".to_string()))
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    context.finish().as_ref().to_vec()
}

/// Hash several byte fields as one message, each prefixed by its length so
/// that moving bytes between adjacent fields changes the digest.
pub fn sha256_fields(fields: &[&[u8]]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    for field in fields {
        context.update(&(field.len() as u64).to_le_bytes());
        context.update(field);
    }
    context.finish().as_ref().to_vec()
}
