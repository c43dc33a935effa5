//! Config Loading Tests
//!
//! Replica set files on disk:
//! - Path resolution against the config directory
//! - Validation failures surface as ConfigError
//! - Loaded config drives a full run against a scripted replica set

use std::fs;
use std::path::Path;

use repfail::backend::MemoryCluster;
use repfail::cli::{failover, CliErrorCode};
use repfail::config::{ConfigError, ReplicaSetConfig};
use repfail::failover::Operation;
use repfail::replica::CredentialSource;
use tempfile::TempDir;

const REPLICAS: &str = r#"{
    "connect_timeout_secs": 5,
    "replicas": [
        { "name": "db1", "server_id": 11, "host": "db1.local",
          "sql_user": "admin", "sql_pass": "a", "rep_user": "repl", "rep_pass": "r1" },
        { "name": "db2", "server_id": 12, "host": "db2.local",
          "sql_user": "admin", "sql_pass": "b", "rep_user": "repl", "rep_pass": "r2" },
        { "name": "db3", "server_id": 13, "host": "db3.local",
          "sql_user": "admin", "sql_pass": "c", "rep_user": "repl", "rep_pass": "r3" }
    ]
}"#;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Bare file name is found in the config directory.
#[test]
fn test_load_relative_to_dir() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "replicas.json", REPLICAS);

    let config = ReplicaSetConfig::load(Path::new("replicas.json"), dir.path()).unwrap();

    assert_eq!(config.replicas.len(), 3);
    assert_eq!(config.connect_timeout_secs, 5);
    assert_eq!(config.command_timeout_secs, 30);
}

/// A path that exists as given is used directly.
#[test]
fn test_load_existing_path_ignores_dir() {
    let dir = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    write(dir.path(), "replicas.json", REPLICAS);
    let full = dir.path().join("replicas.json");

    let config = ReplicaSetConfig::load(&full, other.path()).unwrap();

    assert_eq!(config.endpoints()[2].name, "db3");
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();

    let err = ReplicaSetConfig::load(Path::new("absent.json"), dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.json", "{ \"replicas\": [");

    let err = ReplicaSetConfig::load(Path::new("broken.json"), dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_credentials_from_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "replicas.json", REPLICAS);
    let config = ReplicaSetConfig::load(Path::new("replicas.json"), dir.path()).unwrap();

    let creds = config.replication_credentials("db2", 3306).unwrap();
    assert_eq!(creds.user, "repl");
    assert_eq!(creds.password, "r2");
}

/// Config file through to a completed promotion.
#[test]
fn test_loaded_config_drives_promotion() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "replicas.json", REPLICAS);
    let config = ReplicaSetConfig::load(Path::new("replicas.json"), dir.path()).unwrap();

    let cluster = MemoryCluster::new()
        .with_replica("db1", "a:1-30")
        .with_replica("db2", "a:1-10")
        .with_replica("db3", "a:1-20");
    let mut out = Vec::new();

    failover(&config, &cluster, &[Operation::PromoteBest], &mut out).unwrap();

    assert_eq!(
        cluster.repoint_attempts(),
        vec![("db3".into(), "db2".into()), ("db1".into(), "db2".into())]
    );
    assert_eq!(cluster.open_sessions(), 0);
}

/// A replica missing from the cluster is left out, the rest still run.
#[test]
fn test_unreachable_replica_excluded() {
    let config = ReplicaSetConfig::from_json(REPLICAS).unwrap();
    let cluster = MemoryCluster::new()
        .with_replica("db1", "a:1-30")
        .with_replica("db3", "a:1-20");
    let mut out = Vec::new();

    failover(&config, &cluster, &[Operation::ShowRanking], &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Best Slave: db3\tGTID Pos: a:1-20\n     Slave: db1\tGTID Pos: a:1-30\n"
    );
}

/// Precondition failure is written to the operator output.
#[test]
fn test_precondition_failure_reported() {
    let config = ReplicaSetConfig::from_json(REPLICAS).unwrap();
    let cluster = MemoryCluster::new()
        .with_replica("db1", "a:1-30")
        .with_replica("db2", "a:1-10");
    cluster.set_gtid_mode("db2", false);
    let mut out = Vec::new();

    let err = failover(&config, &cluster, &[Operation::ShowBest], &mut out).unwrap_err();

    assert_eq!(err.code(), &CliErrorCode::OperationFailed);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Error:  Empty Slave array or Slave(s) not GTID enabled.\n"
    );
}
