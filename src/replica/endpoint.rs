//! Node identity and connection descriptors

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Role a session is opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Accepts writes; other nodes follow it
    Primary,
    /// Applies the primary's write stream
    Replica,
}

impl NodeRole {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Primary => "primary",
            NodeRole::Replica => "replica",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// TLS settings for a node session.
///
/// Opaque to the failover protocol; only the session backend reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsParams {
    pub ssl_client_ca: Option<PathBuf>,
    pub ssl_ca_path: Option<PathBuf>,
    pub ssl_client_key: Option<PathBuf>,
    pub ssl_client_cert: Option<PathBuf>,
    pub ssl_client_flag: Option<i64>,
    pub ssl_disabled: bool,
    pub ssl_verify_id: bool,
    pub ssl_verify_cert: bool,
    pub tls_versions: Vec<String>,
}

impl TlsParams {
    /// True when a TLS session should be negotiated.
    pub fn is_requested(&self) -> bool {
        !self.ssl_disabled
            && (self.ssl_client_ca.is_some()
                || self.ssl_ca_path.is_some()
                || self.ssl_client_key.is_some()
                || self.ssl_client_cert.is_some())
    }
}

/// Where a node lives and how to log into it.
#[derive(Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    /// Unique within one replica set
    pub name: String,
    pub server_id: u32,
    pub host: String,
    pub port: u16,
    pub sql_user: String,
    pub sql_pass: String,
    pub extra_def_file: Option<PathBuf>,
    pub tls: TlsParams,
}

impl NodeEndpoint {
    /// Create an endpoint with no extra defaults file and no TLS.
    pub fn new(
        name: impl Into<String>,
        server_id: u32,
        host: impl Into<String>,
        port: u16,
        sql_user: impl Into<String>,
        sql_pass: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            server_id,
            host: host.into(),
            port,
            sql_user: sql_user.into(),
            sql_pass: sql_pass.into(),
            extra_def_file: None,
            tls: TlsParams::default(),
        }
    }

    /// `host:port` for diagnostics.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEndpoint")
            .field("name", &self.name)
            .field("server_id", &self.server_id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sql_user", &self.sql_user)
            .field("sql_pass", &"<redacted>")
            .field("extra_def_file", &self.extra_def_file)
            .field("tls", &self.tls)
            .finish()
    }
}

/// Credentials other replicas use to follow a primary.
#[derive(Clone, PartialEq, Eq)]
pub struct ReplicationCredentials {
    pub user: String,
    pub password: String,
}

impl ReplicationCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ReplicationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicationCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Lookup of replication credentials by node identity.
pub trait CredentialSource {
    /// Credentials for the node declared with `name` and `port`, if any.
    fn replication_credentials(&self, name: &str, port: u16) -> Option<ReplicationCredentials>;
}
