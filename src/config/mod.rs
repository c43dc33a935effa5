//! Replica set configuration
//!
//! One JSON document describes every replica taking part in a failover:
//! where it lives, how to log into it and which replication account other
//! nodes use once it is promoted. The file is read once and never written.

mod errors;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event, Event};
use crate::replica::{CredentialSource, NodeEndpoint, ReplicationCredentials, TlsParams};

pub use errors::{ConfigError, ConfigResult};

/// One replica entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
    #[serde(default)]
    pub server_id: u32,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub sql_user: String,
    #[serde(default)]
    pub sql_pass: String,
    /// Replication account used by other nodes after promotion
    #[serde(default)]
    pub rep_user: String,
    #[serde(default)]
    pub rep_pass: String,
    /// MySQL option file with a `[client]` section
    #[serde(default)]
    pub extra_def_file: Option<PathBuf>,
    #[serde(default)]
    pub tls: TlsParams,
}

fn default_port() -> u16 {
    3306
}

impl NodeConfig {
    pub fn endpoint(&self) -> NodeEndpoint {
        NodeEndpoint {
            name: self.name.clone(),
            server_id: self.server_id,
            host: self.host.clone(),
            port: self.port,
            sql_user: self.sql_user.clone(),
            sql_pass: self.sql_pass.clone(),
            extra_def_file: self.extra_def_file.clone(),
            tls: self.tls.clone(),
        }
    }
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("name", &self.name)
            .field("server_id", &self.server_id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sql_user", &self.sql_user)
            .field("rep_user", &self.rep_user)
            .field("extra_def_file", &self.extra_def_file)
            .finish_non_exhaustive()
    }
}

/// The replica set file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSetConfig {
    /// Seconds allowed to open one session
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds allowed for one command on an open session
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    pub replicas: Vec<NodeConfig>,
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_command_timeout() -> u64 {
    30
}

impl ReplicaSetConfig {
    /// Locate `file` against `dir`.
    ///
    /// A path that exists as given is used directly, anything else is taken
    /// relative to `dir`.
    pub fn resolve(file: &Path, dir: &Path) -> PathBuf {
        if file.is_absolute() || file.exists() {
            file.to_path_buf()
        } else {
            dir.join(file)
        }
    }

    /// Resolve, read, parse and validate the replica set file.
    pub fn load(file: &Path, dir: &Path) -> ConfigResult<Self> {
        let path = Self::resolve(file, dir);
        let config = Self::load_path(&path)?;

        let count = config.replicas.len().to_string();
        let shown = path.display().to_string();
        log_event(
            Event::ConfigLoaded,
            &[("path", shown.as_str()), ("replicas", count.as_str())],
        );
        Ok(config)
    }

    fn load_path(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a document held in memory.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ReplicaSetConfig =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate entries and timeouts.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("connect_timeout_secs"));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("command_timeout_secs"));
        }
        if self.replicas.is_empty() {
            return Err(ConfigError::NoReplicas);
        }

        let mut seen = HashSet::new();
        for (index, node) in self.replicas.iter().enumerate() {
            for (field, value) in [
                ("name", &node.name),
                ("host", &node.host),
                ("sql_user", &node.sql_user),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::EmptyField { index, field });
                }
            }
            if node.port == 0 {
                return Err(ConfigError::InvalidPort {
                    name: node.name.clone(),
                });
            }
            if !seen.insert(node.name.as_str()) {
                return Err(ConfigError::DuplicateName(node.name.clone()));
            }
        }

        Ok(())
    }

    /// Endpoints in file order.
    pub fn endpoints(&self) -> Vec<NodeEndpoint> {
        self.replicas.iter().map(NodeConfig::endpoint).collect()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl CredentialSource for ReplicaSetConfig {
    /// First entry matching both `name` and `port`.
    fn replication_credentials(&self, name: &str, port: u16) -> Option<ReplicationCredentials> {
        self.replicas
            .iter()
            .find(|node| node.name == name && node.port == port)
            .map(|node| ReplicationCredentials::new(&node.rep_user, &node.rep_pass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "replicas": [
            { "name": "db1", "server_id": 11, "host": "10.0.0.1",
              "sql_user": "admin", "sql_pass": "a", "rep_user": "repl", "rep_pass": "r1" },
            { "name": "db2", "server_id": 12, "host": "10.0.0.2", "port": 3307,
              "sql_user": "admin", "sql_pass": "b", "rep_user": "repl", "rep_pass": "r2",
              "tls": { "ssl_client_ca": "/etc/mysql/ca.pem", "ssl_verify_cert": true } }
        ]
    }"#;

    #[test]
    fn test_defaults() {
        let config = ReplicaSetConfig::from_json(DOC).unwrap();

        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.replicas[0].port, 3306);
        assert!(!config.replicas[0].tls.is_requested());
        assert!(config.replicas[1].tls.is_requested());
    }

    #[test]
    fn test_endpoints_keep_file_order() {
        let config = ReplicaSetConfig::from_json(DOC).unwrap();
        let endpoints = config.endpoints();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].name, "db1");
        assert_eq!(endpoints[1].address(), "10.0.0.2:3307");
        assert_eq!(endpoints[1].server_id, 12);
    }

    #[test]
    fn test_credentials_match_name_and_port() {
        let config = ReplicaSetConfig::from_json(DOC).unwrap();

        let creds = config.replication_credentials("db2", 3307).unwrap();
        assert_eq!(creds.password, "r2");
        assert!(config.replication_credentials("db2", 3306).is_none());
        assert!(config.replication_credentials("db9", 3306).is_none());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let doc = r#"{ "replicas": [
            { "name": "db1", "host": "h1", "sql_user": "u" },
            { "name": "db1", "host": "h2", "sql_user": "u" } ] }"#;
        assert!(matches!(
            ReplicaSetConfig::from_json(doc),
            Err(ConfigError::DuplicateName(name)) if name == "db1"
        ));
    }

    #[test]
    fn test_rejects_empty_set_and_zero_values() {
        assert!(matches!(
            ReplicaSetConfig::from_json(r#"{ "replicas": [] }"#),
            Err(ConfigError::NoReplicas)
        ));
        assert!(matches!(
            ReplicaSetConfig::from_json(
                r#"{ "replicas": [ { "name": "db1", "host": "h", "sql_user": "u", "port": 0 } ] }"#
            ),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(matches!(
            ReplicaSetConfig::from_json(
                r#"{ "command_timeout_secs": 0, "replicas": [ { "name": "db1", "host": "h", "sql_user": "u" } ] }"#
            ),
            Err(ConfigError::InvalidTimeout("command_timeout_secs"))
        ));
        assert!(matches!(
            ReplicaSetConfig::from_json(
                r#"{ "replicas": [ { "name": "db1", "host": " ", "sql_user": "u" } ] }"#
            ),
            Err(ConfigError::EmptyField { index: 0, field: "host" })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            ReplicaSetConfig::from_json("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
