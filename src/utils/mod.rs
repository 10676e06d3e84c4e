//! Utility functions and helpers
//!
//! Hashing, timestamps and the wire encoding used by the data model.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest, sha256_fields};

pub use serialization::{deserialize, serialize};
