//! CLI module for repfail
//!
//! One invocation runs one failover operation:
//! - `-B`: show the best replica
//! - `-D`: show every replica in ranked order
//! - `-F`: promote the best replica
//! - `-G <name>`: promote the named replica

mod args;
mod commands;
mod errors;

pub use args::Cli;
pub use commands::{failover, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
