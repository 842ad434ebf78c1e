//! Logger setup for binaries and tests.
//!
//! The engine itself only talks to the `log` facade; this module wires
//! `env_logger` behind it for hosts that have a terminal.

mod init;

pub use init::{init_logging, LoggingConfig};
