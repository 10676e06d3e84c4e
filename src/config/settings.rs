use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_NODE_ID: &str = "default_sim_node";
pub const DEFAULT_MAILBOX_CAPACITY: usize = 100;
pub const DEFAULT_RECEPTION_CAPACITY: usize = 100;

const NODE_ID_KEY: &str = "NODE_ID";
const MAILBOX_CAPACITY_KEY: &str = "SIMNET_MAILBOX_CAPACITY";
const RECEPTION_CAPACITY_KEY: &str = "SIMNET_RECEPTION_CAPACITY";
const MAX_PEERS_KEY: &str = "SIMNET_MAX_PEERS";

/// Settings for one simulated network node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Identity of the local node; empty falls back to `default_sim_node`
    pub node_id: String,
    /// Bound of every peer's mailbox
    pub mailbox_capacity: usize,
    /// Bound of the node's block and transaction reception channels
    pub reception_capacity: usize,
    /// Maximum number of registered peers, `None` for no limit
    pub max_peers: Option<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID.to_string(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            reception_capacity: DEFAULT_RECEPTION_CAPACITY,
            max_peers: None,
        }
    }
}

impl NetworkConfig {
    pub fn for_node(node_id: &str) -> NetworkConfig {
        NetworkConfig {
            node_id: node_id.to_string(),
            ..Default::default()
        }
        .normalized()
    }

    /// Defaults overridden by `NODE_ID` and the `SIMNET_*` environment variables
    pub fn from_env() -> Result<NetworkConfig> {
        let mut config = NetworkConfig::default();
        if let Ok(node_id) = env::var(NODE_ID_KEY) {
            config.node_id = node_id;
        }
        if let Some(capacity) = read_env_usize(MAILBOX_CAPACITY_KEY)? {
            config.mailbox_capacity = capacity;
        }
        if let Some(capacity) = read_env_usize(RECEPTION_CAPACITY_KEY)? {
            config.reception_capacity = capacity;
        }
        if let Some(max_peers) = read_env_usize(MAX_PEERS_KEY)? {
            config.max_peers = Some(max_peers);
        }
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NetworkConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            BlockchainError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: NetworkConfig = toml::from_str(&text)?;
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(BlockchainError::Config(
                "mailbox_capacity must be at least 1".to_string(),
            ));
        }
        if self.reception_capacity == 0 {
            return Err(BlockchainError::Config(
                "reception_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace an empty node id with the default one
    pub fn normalized(mut self) -> NetworkConfig {
        if self.node_id.is_empty() {
            self.node_id = DEFAULT_NODE_ID.to_string();
        }
        self
    }
}

fn read_env_usize(key: &str) -> Result<Option<usize>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| BlockchainError::Config(format!("{key}={raw:?} is not a count: {e}"))),
        Err(_) => Ok(None),
    }
}
