//! Failover error types
//!
//! Errors carry structured fields and only become operator text through
//! `Display`, at the reporting boundary.

use std::io;

use thiserror::Error;

/// Why a failover operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailoverError {
    /// Empty replica set, or a replica without GTID mode
    #[error("Error:  Empty Slave array or Slave(s) not GTID enabled.")]
    PreconditionFailed,

    /// Ranking or lookup attempted on an empty set
    #[error("No replicas available")]
    NoReplicas,

    /// Designated replica is not in the set
    #[error("Slave: {name} was not found in slave array")]
    ReplicaNotFound { name: String },

    /// No configuration entry matches the chosen node
    #[error("{operation}: Replication credentials not found for server({name}) port {port}")]
    CredentialsNotFound {
        operation: &'static str,
        name: String,
        port: u16,
    },

    /// New primary session could not be opened; nothing was repointed
    #[error("{operation}: Error on server({server}): {diagnostic} No slaves were changed to new master.")]
    PromotionFailed {
        operation: &'static str,
        server: String,
        diagnostic: String,
    },

    /// Some replicas did not change to the new primary
    #[error("Slaves: {failed:?} that did not change to new master.")]
    RepointFailed { failed: Vec<String> },

    /// Operator report could not be written
    #[error("Cannot write report: {0}")]
    Output(String),
}

/// Failover error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverErrorKind {
    Precondition,
    NoReplicas,
    NotFound,
    Credentials,
    Promotion,
    Repoint,
    Output,
}

impl FailoverError {
    pub fn kind(&self) -> FailoverErrorKind {
        match self {
            Self::PreconditionFailed => FailoverErrorKind::Precondition,
            Self::NoReplicas => FailoverErrorKind::NoReplicas,
            Self::ReplicaNotFound { .. } => FailoverErrorKind::NotFound,
            Self::CredentialsNotFound { .. } => FailoverErrorKind::Credentials,
            Self::PromotionFailed { .. } => FailoverErrorKind::Promotion,
            Self::RepointFailed { .. } => FailoverErrorKind::Repoint,
            Self::Output(_) => FailoverErrorKind::Output,
        }
    }

    /// A new primary exists but some replicas still follow the old one.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::RepointFailed { .. })
    }

    /// Names of replicas left behind, if any.
    pub fn failed_replicas(&self) -> &[String] {
        match self {
            Self::RepointFailed { failed } => failed,
            _ => &[],
        }
    }
}

impl From<io::Error> for FailoverError {
    fn from(e: io::Error) -> Self {
        Self::Output(e.to_string())
    }
}

/// Result type for failover operations.
///
/// `Ok` is "not failed, no message"; `Err` renders the operator message.
pub type FailoverResult<T = ()> = Result<T, FailoverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = FailoverError::ReplicaNotFound {
            name: "db9".to_string(),
        };
        assert_eq!(err.to_string(), "Slave: db9 was not found in slave array");
        assert_eq!(err.kind(), FailoverErrorKind::NotFound);
    }

    #[test]
    fn test_promotion_failed_message() {
        let err = FailoverError::PromotionFailed {
            operation: "promote_best_slave",
            server: "db2".to_string(),
            diagnostic: "Access denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "promote_best_slave: Error on server(db2): Access denied No slaves were changed to new master."
        );
    }

    #[test]
    fn test_repoint_failed_message_lists_names_in_order() {
        let err = FailoverError::RepointFailed {
            failed: vec!["db3".to_string(), "db1".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Slaves: [\"db3\", \"db1\"] that did not change to new master."
        );
        assert!(err.is_partial());
        assert_eq!(err.failed_replicas(), ["db3".to_string(), "db1".to_string()]);
    }

    #[test]
    fn test_precondition_message() {
        assert_eq!(
            FailoverError::PreconditionFailed.to_string(),
            "Error:  Empty Slave array or Slave(s) not GTID enabled."
        );
        assert!(FailoverError::PreconditionFailed.failed_replicas().is_empty());
    }
}
