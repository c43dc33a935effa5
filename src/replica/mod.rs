//! Replica data model
//!
//! - Node identity and connection descriptors
//! - GTID position tokens
//! - Replica / primary handles owning their sessions
//! - The session collaborator traits backends implement
//! - The working replica set of one invocation

mod endpoint;
mod handle;
mod position;
mod session;
mod set;

pub use endpoint::{CredentialSource, NodeEndpoint, NodeRole, ReplicationCredentials, TlsParams};
pub use handle::{PrimaryHandle, ReplicaHandle};
pub use position::GtidSet;
pub use session::{Connector, NodeSession, ReplicationStatus, SessionError};
pub use set::{find_by_name, position_by_name, ReplicaSet};
