//! Replica and primary handles
//!
//! A handle pairs a node's identity with its open session. Sessions are
//! released through `disconnect`, which is safe to call any number of times.

use std::fmt;

use super::endpoint::{NodeEndpoint, NodeRole, ReplicationCredentials};
use super::position::GtidSet;
use super::session::{Connector, NodeSession, ReplicationStatus, SessionError};

/// One replication follower.
pub struct ReplicaHandle {
    endpoint: NodeEndpoint,
    executed_gtid_set: GtidSet,
    gtid_mode: bool,
    session: Option<Box<dyn NodeSession>>,
}

impl ReplicaHandle {
    /// Build a handle from already-known state.
    pub fn new(
        endpoint: NodeEndpoint,
        status: ReplicationStatus,
        session: Option<Box<dyn NodeSession>>,
    ) -> Self {
        Self {
            endpoint,
            executed_gtid_set: status.executed_gtid_set,
            gtid_mode: status.gtid_mode,
            session,
        }
    }

    /// Open a replica session and read the node's replication state.
    pub fn connect(endpoint: NodeEndpoint, connector: &dyn Connector) -> Result<Self, SessionError> {
        let mut session = connector.connect(&endpoint, NodeRole::Replica)?;
        match session.replication_status() {
            Ok(status) => Ok(Self::new(endpoint, status, Some(session))),
            Err(e) => {
                session.close();
                Err(e)
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.endpoint.name
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port
    }

    pub fn server_id(&self) -> u32 {
        self.endpoint.server_id
    }

    pub fn endpoint(&self) -> &NodeEndpoint {
        &self.endpoint
    }

    pub fn executed_gtid_set(&self) -> &GtidSet {
        &self.executed_gtid_set
    }

    /// Whether the node runs with GTID mode on.
    pub fn is_gtid_enabled(&self) -> bool {
        self.gtid_mode
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Repoint this replica to `primary`.
    pub fn follow(&mut self, primary: &PrimaryHandle) -> Result<(), SessionError> {
        match self.session.as_mut() {
            Some(session) => session.change_primary(primary),
            None => Err(SessionError::not_connected(self.endpoint.name.clone())),
        }
    }

    /// Release the session. No-op when already released.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}

impl fmt::Debug for ReplicaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaHandle")
            .field("endpoint", &self.endpoint)
            .field("executed_gtid_set", &self.executed_gtid_set)
            .field("gtid_mode", &self.gtid_mode)
            .field("connected", &self.session.is_some())
            .finish()
    }
}

/// The promoted node in its new role.
///
/// Created once per promotion and never changed afterwards except to
/// release its session.
pub struct PrimaryHandle {
    endpoint: NodeEndpoint,
    credentials: ReplicationCredentials,
    connection_error: Option<String>,
    session: Option<Box<dyn NodeSession>>,
}

impl PrimaryHandle {
    /// Copy identity from `replica` and open a primary-role session.
    ///
    /// A failed connection is recorded in `connection_error`; the handle is
    /// returned either way.
    pub fn open(
        replica: &ReplicaHandle,
        credentials: ReplicationCredentials,
        connector: &dyn Connector,
    ) -> Self {
        let endpoint = replica.endpoint().clone();
        let (session, connection_error) = match connector.connect(&endpoint, NodeRole::Primary) {
            Ok(session) => (Some(session), None),
            Err(e) => (None, Some(e.reason().to_string())),
        };

        Self {
            endpoint,
            credentials,
            connection_error,
            session,
        }
    }

    pub fn name(&self) -> &str {
        &self.endpoint.name
    }

    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port
    }

    pub fn server_id(&self) -> u32 {
        self.endpoint.server_id
    }

    pub fn endpoint(&self) -> &NodeEndpoint {
        &self.endpoint
    }

    /// Credentials replicas use to follow this primary.
    pub fn credentials(&self) -> &ReplicationCredentials {
        &self.credentials
    }

    /// Diagnostic from the promotion connection attempt, if it failed.
    pub fn connection_error(&self) -> Option<&str> {
        self.connection_error.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Release the session. No-op when already released or never opened.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}

impl fmt::Debug for PrimaryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimaryHandle")
            .field("endpoint", &self.endpoint)
            .field("credentials", &self.credentials)
            .field("connection_error", &self.connection_error)
            .field("connected", &self.session.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{Call, MemoryCluster};

    fn creds() -> ReplicationCredentials {
        ReplicationCredentials::new("repl", "replpass")
    }

    #[test]
    fn test_connect_reads_status() {
        let cluster = MemoryCluster::new().with_replica("db1", "uuid:1-10");
        let replica = ReplicaHandle::connect(cluster.endpoint("db1"), &cluster).unwrap();

        assert_eq!(replica.name(), "db1");
        assert_eq!(replica.executed_gtid_set().as_str(), "uuid:1-10");
        assert!(replica.is_gtid_enabled());
        assert!(replica.is_connected());
    }

    #[test]
    fn test_connect_unreachable() {
        let cluster = MemoryCluster::new().with_replica("db1", "uuid:1-10");
        cluster.set_reachable("db1", false);

        let err = ReplicaHandle::connect(cluster.endpoint("db1"), &cluster).unwrap_err();
        assert!(matches!(err, SessionError::Unreachable { .. }));
    }

    #[test]
    fn test_disconnect_twice_is_noop() {
        let cluster = MemoryCluster::new().with_replica("db1", "uuid:1-10");
        let mut replica = ReplicaHandle::connect(cluster.endpoint("db1"), &cluster).unwrap();

        replica.disconnect();
        replica.disconnect();

        assert!(!replica.is_connected());
        assert_eq!(cluster.close_count("db1"), 1);
    }

    #[test]
    fn test_follow_without_session_fails() {
        let cluster = MemoryCluster::new()
            .with_replica("db1", "uuid:1-10")
            .with_replica("db2", "uuid:1-9");
        let chosen = ReplicaHandle::connect(cluster.endpoint("db1"), &cluster).unwrap();
        let primary = PrimaryHandle::open(&chosen, creds(), &cluster);

        let mut other = ReplicaHandle::connect(cluster.endpoint("db2"), &cluster).unwrap();
        other.disconnect();

        let err = other.follow(&primary).unwrap_err();
        assert_eq!(err, SessionError::not_connected("db2"));
    }

    #[test]
    fn test_primary_copies_identity() {
        let cluster = MemoryCluster::new().with_replica("db1", "uuid:1-10");
        let replica = ReplicaHandle::connect(cluster.endpoint("db1"), &cluster).unwrap();
        let primary = PrimaryHandle::open(&replica, creds(), &cluster);

        assert_eq!(primary.name(), replica.name());
        assert_eq!(primary.port(), replica.port());
        assert_eq!(primary.server_id(), replica.server_id());
        assert_eq!(primary.credentials().user, "repl");
        assert!(primary.connection_error().is_none());
        assert!(primary.is_connected());
        assert!(cluster.calls().contains(&Call::Connect {
            server: "db1".to_string(),
            role: NodeRole::Primary,
        }));
    }

    #[test]
    fn test_primary_connection_error_recorded() {
        let cluster = MemoryCluster::new().with_replica("db1", "uuid:1-10");
        let replica = ReplicaHandle::connect(cluster.endpoint("db1"), &cluster).unwrap();
        cluster.fail_primary_login("db1", "Access denied for user 'admin'");

        let mut primary = PrimaryHandle::open(&replica, creds(), &cluster);
        assert_eq!(
            primary.connection_error(),
            Some("Access denied for user 'admin'")
        );
        assert!(!primary.is_connected());

        // Releasing a handle that never connected does not fault
        primary.disconnect();
        primary.disconnect();
    }
}
