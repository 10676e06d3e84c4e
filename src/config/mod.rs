//! Configuration management
//!
//! Node identity and the channel bounds used by the simulated network,
//! loaded from defaults, environment variables or a TOML file.

pub mod settings;

pub use settings::{
    NetworkConfig, DEFAULT_MAILBOX_CAPACITY, DEFAULT_NODE_ID, DEFAULT_RECEPTION_CAPACITY,
};
