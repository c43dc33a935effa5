//! repfail - GTID replica set failover for MySQL
//!
//! Promotes a replica to primary once the old primary is gone and repoints
//! the remaining replicas to it.

pub mod backend;
pub mod cli;
pub mod config;
pub mod failover;
pub mod lock;
pub mod observability;
pub mod replica;
