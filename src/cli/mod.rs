//! Command-line interface
//!
//! Argument parsing for the `simnet` binary.

pub mod commands;

pub use commands::{Command, Opt};
