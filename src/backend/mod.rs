//! Session backends
//!
//! - `mysql`: live MySQL sessions with per-call timeouts
//! - `memory`: scripted in-memory replica set for tests and dry runs

pub mod memory;
pub mod mysql;

pub use self::memory::{Call, MemoryCluster, MemoryNode};
pub use self::mysql::MysqlConnector;
