use crate::core::{Block, Transaction};
use crate::error::Result;
use data_encoding::HEXLOWER;

pub const NEW_BLOCK: &str = "NEW_BLOCK";
pub const NEW_TRANSACTION: &str = "NEW_TRANSACTION";

/// Envelope passed between a node and its peers.
///
/// `data` is opaque here; its encoding belongs to the payload type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMessage {
    message_type: String,
    data: Vec<u8>,
}

impl NetworkMessage {
    pub fn new(message_type: &str, data: Vec<u8>) -> NetworkMessage {
        NetworkMessage {
            message_type: message_type.to_string(),
            data,
        }
    }

    pub fn message_type(&self) -> &str {
        self.message_type.as_str()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Split the envelope into its tag and payload
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.message_type, self.data)
    }

    pub fn kind(&self) -> MessageKind<'_> {
        MessageKind::from_tag(&self.message_type)
    }
}

/// Routing class of a message tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind<'a> {
    NewBlock,
    NewTransaction,
    Other(&'a str),
}

impl<'a> MessageKind<'a> {
    pub fn from_tag(tag: &'a str) -> MessageKind<'a> {
        match tag {
            NEW_BLOCK => MessageKind::NewBlock,
            NEW_TRANSACTION => MessageKind::NewTransaction,
            other => MessageKind::Other(other),
        }
    }
}

/// A value that can be broadcast under a fixed message tag
pub trait WirePayload {
    const MESSAGE_TYPE: &'static str;

    fn to_wire(&self) -> Result<Vec<u8>>;

    /// Short identifier for log lines
    fn label(&self) -> String;
}

impl WirePayload for Block {
    const MESSAGE_TYPE: &'static str = NEW_BLOCK;

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }

    fn label(&self) -> String {
        format!("block {}", HEXLOWER.encode(self.get_hash()))
    }
}

impl WirePayload for Transaction {
    const MESSAGE_TYPE: &'static str = NEW_TRANSACTION;

    fn to_wire(&self) -> Result<Vec<u8>> {
        self.serialize()
    }

    fn label(&self) -> String {
        format!("tx {}", HEXLOWER.encode(self.get_id()))
    }
}
