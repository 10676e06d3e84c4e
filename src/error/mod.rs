//! Error handling for the relay
//!
//! One error enum covers the data model, configuration and peer networking.

use std::fmt;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error kinds surfaced by the relay and its data model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// Generic network communication errors
    Network(String),
    /// Peer identifier rejected (empty id, self connection)
    InvalidPeer(String),
    /// No room for another peer or its processing task
    ResourceExhausted(String),
    /// The peer's processing task could not be started
    ConnectionFailed(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Transaction construction errors
    Transaction(String),
    /// Block construction errors
    InvalidBlock(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Network(msg) => write!(f, "Network error: {msg}"),
            BlockchainError::InvalidPeer(msg) => write!(f, "Invalid peer: {msg}"),
            BlockchainError::ResourceExhausted(msg) => write!(f, "Resource exhausted: {msg}"),
            BlockchainError::ConnectionFailed(msg) => write!(f, "Connection failed: {msg}"),
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BlockchainError {
    fn from(err: toml::ser::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = BlockchainError::ResourceExhausted("peer limit 2 reached".to_string());
        assert_eq!(err.to_string(), "Resource exhausted: peer limit 2 reached");

        let err = BlockchainError::InvalidPeer("empty id".to_string());
        assert!(err.to_string().starts_with("Invalid peer"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BlockchainError = io.into();
        assert!(matches!(err, BlockchainError::Io(_)));
    }
}
