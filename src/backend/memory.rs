//! In-memory session backend
//!
//! Scripted node states plus an ordered record of every call made against
//! them. Drives the test suite and dry runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::replica::{
    Connector, GtidSet, NodeEndpoint, NodeRole, NodeSession, PrimaryHandle, ReplicationStatus,
    SessionError,
};

/// Scripted state of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNode {
    pub name: String,
    pub reachable: bool,
    pub executed_gtid_set: String,
    pub gtid_mode: bool,
    /// Repoint attempts on this node fail
    pub repoint_fails: bool,
    /// Primary-role logins fail with this diagnostic
    pub primary_login_error: Option<String>,
    /// Name of the primary this node follows after a repoint
    pub following: Option<String>,
}

impl MemoryNode {
    /// A reachable GTID replica.
    pub fn replica(name: impl Into<String>, executed_gtid_set: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reachable: true,
            executed_gtid_set: executed_gtid_set.into(),
            gtid_mode: true,
            repoint_fails: false,
            primary_login_error: None,
            following: None,
        }
    }
}

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { server: String, role: NodeRole },
    Repoint { server: String, primary: String },
    Close { server: String, role: NodeRole },
}

#[derive(Debug, Default)]
struct ClusterState {
    nodes: Vec<MemoryNode>,
    calls: Vec<Call>,
}

impl ClusterState {
    fn node(&self, name: &str) -> Option<&MemoryNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut MemoryNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }
}

/// A scripted replica set. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCluster {
    state: Arc<Mutex<ClusterState>>,
}

fn lock(state: &Mutex<ClusterState>) -> MutexGuard<'_, ClusterState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reachable GTID replica.
    pub fn with_replica(self, name: &str, executed_gtid_set: &str) -> Self {
        self.add_node(MemoryNode::replica(name, executed_gtid_set));
        self
    }

    /// Add or replace a node.
    pub fn add_node(&self, node: MemoryNode) {
        let mut state = lock(&self.state);
        match state.node_mut(&node.name) {
            Some(existing) => *existing = node,
            None => state.nodes.push(node),
        }
    }

    pub fn set_reachable(&self, name: &str, reachable: bool) {
        self.update(name, |n| n.reachable = reachable);
    }

    pub fn set_gtid_mode(&self, name: &str, enabled: bool) {
        self.update(name, |n| n.gtid_mode = enabled);
    }

    /// Make every repoint of `name` fail.
    pub fn fail_repoint(&self, name: &str) {
        self.update(name, |n| n.repoint_fails = true);
    }

    /// Make primary-role logins to `name` fail with `diagnostic`.
    pub fn fail_primary_login(&self, name: &str, diagnostic: &str) {
        self.update(name, |n| n.primary_login_error = Some(diagnostic.to_string()));
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut MemoryNode)) {
        if let Some(node) = lock(&self.state).node_mut(name) {
            f(node);
        }
    }

    /// Endpoint for a node, in the shape a config file would give.
    pub fn endpoint(&self, name: &str) -> NodeEndpoint {
        let state = lock(&self.state);
        let server_id = state
            .nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| i as u32 + 1)
            .unwrap_or(0);
        NodeEndpoint::new(name, server_id, format!("{}.local", name), 3306, "admin", "admin")
    }

    /// Endpoints of every node in insertion order.
    pub fn endpoints(&self) -> Vec<NodeEndpoint> {
        let names: Vec<String> = lock(&self.state).nodes.iter().map(|n| n.name.clone()).collect();
        names.iter().map(|name| self.endpoint(name)).collect()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.state).calls.clone()
    }

    /// `(replica, primary)` pairs of every repoint attempt, in order.
    pub fn repoint_attempts(&self) -> Vec<(String, String)> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Repoint { server, primary } => Some((server.clone(), primary.clone())),
                _ => None,
            })
            .collect()
    }

    /// How many sessions to `name` were closed, in any role.
    pub fn close_count(&self, name: &str) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Close { server, .. } if server == name))
            .count()
    }

    /// Sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        let state = lock(&self.state);
        let opened = state.calls.iter().filter(|c| matches!(c, Call::Connect { .. })).count();
        let closed = state.calls.iter().filter(|c| matches!(c, Call::Close { .. })).count();
        opened.saturating_sub(closed)
    }

    /// Primary `name` follows after a successful repoint.
    pub fn following(&self, name: &str) -> Option<String> {
        lock(&self.state).node(name).and_then(|n| n.following.clone())
    }
}

impl Connector for MemoryCluster {
    fn connect(
        &self,
        endpoint: &NodeEndpoint,
        role: NodeRole,
    ) -> Result<Box<dyn NodeSession>, SessionError> {
        let mut state = lock(&self.state);
        let node = state
            .node(&endpoint.name)
            .cloned()
            .ok_or_else(|| SessionError::unreachable(&endpoint.name, "Unknown MySQL server host"))?;

        if !node.reachable {
            return Err(SessionError::unreachable(
                &endpoint.name,
                format!("Can't connect to MySQL server on '{}'", endpoint.address()),
            ));
        }
        if role == NodeRole::Primary {
            if let Some(diagnostic) = node.primary_login_error {
                return Err(SessionError::unreachable(&endpoint.name, diagnostic));
            }
        }

        state.calls.push(Call::Connect {
            server: endpoint.name.clone(),
            role,
        });

        Ok(Box::new(MemorySession {
            server: endpoint.name.clone(),
            role,
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemorySession {
    server: String,
    role: NodeRole,
    state: Arc<Mutex<ClusterState>>,
}

impl NodeSession for MemorySession {
    fn replication_status(&mut self) -> Result<ReplicationStatus, SessionError> {
        let state = lock(&self.state);
        let node = state
            .node(&self.server)
            .ok_or_else(|| SessionError::command(&self.server, "node removed"))?;
        Ok(ReplicationStatus {
            executed_gtid_set: GtidSet::new(&node.executed_gtid_set),
            gtid_mode: node.gtid_mode,
        })
    }

    fn change_primary(&mut self, primary: &PrimaryHandle) -> Result<(), SessionError> {
        let mut state = lock(&self.state);
        state.calls.push(Call::Repoint {
            server: self.server.clone(),
            primary: primary.name().to_string(),
        });

        let node = state
            .node_mut(&self.server)
            .ok_or_else(|| SessionError::command(&self.server, "node removed"))?;
        if node.repoint_fails {
            return Err(SessionError::command(
                &self.server,
                "Slave failed to initialize relay log info structure",
            ));
        }
        node.following = Some(primary.name().to_string());
        Ok(())
    }

    fn close(&mut self) {
        lock(&self.state).calls.push(Call::Close {
            server: self.server.clone(),
            role: self.role,
        });
    }
}
