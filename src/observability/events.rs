//! Failover events
//!
//! Every step that touches a node is logged under one of these names.

use std::fmt;

/// Observable events of one failover invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    /// Program lock taken
    LockAcquired,
    /// Another instance holds the lock
    LockHeld,
    /// Configuration file parsed and validated
    ConfigLoaded,
    /// Replica sessions opened
    ReplicaSetLoaded,
    /// A configured replica could not be reached and was excluded
    ReplicaUnreachable,
    /// Empty replica set or a replica without GTID mode
    PreconditionFailed,

    // Promotion
    /// New primary session opened
    PrimaryPromoted,
    /// New primary session could not be opened (FATAL for the operation)
    PromotionFailed,

    // Repoint
    /// Replica now follows the new primary
    ReplicaRepointed,
    /// Replica did not change to the new primary
    RepointFailed,

    // Teardown
    /// All sessions closed
    ConnectionsReleased,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::LockAcquired => "LOCK_ACQUIRED",
            Event::LockHeld => "LOCK_HELD",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ReplicaSetLoaded => "REPLICA_SET_LOADED",
            Event::ReplicaUnreachable => "REPLICA_UNREACHABLE",
            Event::PreconditionFailed => "PRECONDITION_FAILED",
            Event::PrimaryPromoted => "PRIMARY_PROMOTED",
            Event::PromotionFailed => "PROMOTION_FAILED",
            Event::ReplicaRepointed => "REPLICA_REPOINTED",
            Event::RepointFailed => "REPOINT_FAILED",
            Event::ConnectionsReleased => "CONNECTIONS_RELEASED",
        }
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> super::Severity {
        use super::Severity;
        match self {
            Event::ReplicaRepointed => Severity::Trace,
            Event::LockHeld | Event::ReplicaUnreachable | Event::RepointFailed => Severity::Warn,
            Event::PreconditionFailed | Event::PromotionFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
