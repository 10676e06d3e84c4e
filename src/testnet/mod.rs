//! Test helpers for the simulated network
//!
//! Sample payloads, a recording handler and a handler that parks the peer
//! thread so mailbox backpressure can be observed deterministically.

pub mod test_utils;

pub use test_utils::*;
