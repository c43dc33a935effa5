//! Working replica set
//!
//! Owned by the controller for one invocation. Components that only read
//! get a slice; components that repoint get an owned `Vec` that is checked
//! out and back in.

use super::endpoint::NodeEndpoint;
use super::handle::ReplicaHandle;
use super::session::{Connector, SessionError};
use crate::observability::{log_event, Event};

/// Index of the replica called `name`.
pub fn position_by_name(replicas: &[ReplicaHandle], name: &str) -> Option<usize> {
    replicas.iter().position(|r| r.name() == name)
}

/// Find a replica by name.
pub fn find_by_name<'a>(replicas: &'a [ReplicaHandle], name: &str) -> Option<&'a ReplicaHandle> {
    position_by_name(replicas, name).map(|i| &replicas[i])
}

/// The replicas taking part in one failover invocation.
#[derive(Debug, Default)]
pub struct ReplicaSet {
    replicas: Vec<ReplicaHandle>,
}

impl ReplicaSet {
    pub fn new(replicas: Vec<ReplicaHandle>) -> Self {
        Self { replicas }
    }

    /// Open a session to every endpoint.
    ///
    /// Unreachable nodes are logged and left out of the set; their errors
    /// are returned alongside it in input order.
    pub fn connect(
        endpoints: impl IntoIterator<Item = NodeEndpoint>,
        connector: &dyn Connector,
    ) -> (Self, Vec<SessionError>) {
        let mut replicas = Vec::new();
        let mut unreachable = Vec::new();

        for endpoint in endpoints {
            match ReplicaHandle::connect(endpoint, connector) {
                Ok(replica) => replicas.push(replica),
                Err(e) => {
                    log_event(
                        Event::ReplicaUnreachable,
                        &[("server", e.server()), ("error", e.reason())],
                    );
                    unreachable.push(e);
                }
            }
        }

        let count = replicas.len().to_string();
        log_event(Event::ReplicaSetLoaded, &[("replicas", count.as_str())]);

        (Self { replicas }, unreachable)
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    pub fn as_slice(&self) -> &[ReplicaHandle] {
        &self.replicas
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicaHandle> {
        self.replicas.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.replicas.iter().map(|r| r.name()).collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&ReplicaHandle> {
        find_by_name(&self.replicas, name)
    }

    /// True when every replica runs with GTID mode on.
    pub fn all_gtid_enabled(&self) -> bool {
        self.replicas.iter().all(|r| r.is_gtid_enabled())
    }

    /// Move the handles out for an operation that reorders or removes them.
    pub fn check_out(&mut self) -> Vec<ReplicaHandle> {
        std::mem::take(&mut self.replicas)
    }

    /// Return handles after an operation. Order is the caller's.
    pub fn check_in(&mut self, replicas: Vec<ReplicaHandle>) {
        self.replicas.extend(replicas);
    }

    /// Release every replica session. Safe to call repeatedly.
    pub fn disconnect_all(&mut self) {
        for replica in &mut self.replicas {
            replica.disconnect();
        }
    }
}

impl From<Vec<ReplicaHandle>> for ReplicaSet {
    fn from(replicas: Vec<ReplicaHandle>) -> Self {
        Self::new(replicas)
    }
}
