//! Session collaborator seam
//!
//! The failover protocol never speaks a wire protocol itself. It opens
//! sessions through a [`Connector`] and drives them through [`NodeSession`].

use thiserror::Error;

use super::endpoint::{NodeEndpoint, NodeRole};
use super::handle::PrimaryHandle;
use super::position::GtidSet;

/// Failure reported by a session backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Node could not be reached or refused the login
    #[error("cannot connect to {server}: {reason}")]
    Unreachable { server: String, reason: String },

    /// Node accepted the session but a command failed
    #[error("command failed on {server}: {reason}")]
    Command { server: String, reason: String },

    /// Handle has no open session
    #[error("no open session to {server}")]
    NotConnected { server: String },
}

impl SessionError {
    pub fn unreachable(server: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            server: server.into(),
            reason: reason.into(),
        }
    }

    pub fn command(server: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Command {
            server: server.into(),
            reason: reason.into(),
        }
    }

    pub fn not_connected(server: impl Into<String>) -> Self {
        Self::NotConnected {
            server: server.into(),
        }
    }

    /// Name of the node the error came from.
    pub fn server(&self) -> &str {
        match self {
            Self::Unreachable { server, .. }
            | Self::Command { server, .. }
            | Self::NotConnected { server } => server,
        }
    }

    /// Underlying diagnostic without the node prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::Unreachable { reason, .. } | Self::Command { reason, .. } => reason,
            Self::NotConnected { .. } => "no open session",
        }
    }
}

/// Replication state read from a replica when its session opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationStatus {
    pub executed_gtid_set: GtidSet,
    /// GTID mode is ON
    pub gtid_mode: bool,
}

/// One open session to one node.
///
/// Implementations bound every call with their own timeout; the repoint
/// loop has no shared deadline.
pub trait NodeSession {
    /// Read the node's executed GTID set and GTID mode.
    fn replication_status(&mut self) -> Result<ReplicationStatus, SessionError>;

    /// Make this node replicate from `primary`.
    fn change_primary(&mut self, primary: &PrimaryHandle) -> Result<(), SessionError>;

    /// Release the session. Called at most once per session.
    fn close(&mut self);
}

/// Opens sessions to nodes.
pub trait Connector {
    fn connect(
        &self,
        endpoint: &NodeEndpoint,
        role: NodeRole,
    ) -> Result<Box<dyn NodeSession>, SessionError>;
}
