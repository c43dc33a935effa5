//! CLI command implementation
//!
//! Sequence for every run:
//! 1. Take the program lock for the flavor id
//! 2. Load the replica set file
//! 3. Open a session to every replica (unreachable ones are left out)
//! 4. Run the requested operation
//! 5. Release sessions, then the lock
//!
//! Operator output and failure messages go to stdout, logs to stderr.

use std::io::{self, Write};

use crate::backend::MysqlConnector;
use crate::config::ReplicaSetConfig;
use crate::failover::{FailoverController, Operation};
use crate::lock::{LockError, ProgramLock};
use crate::observability::Logger;
use crate::replica::{Connector, ReplicaSet};

use super::args::Cli;
use super::errors::CliResult;

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}

/// Run with parsed arguments
pub fn run_command(cli: Cli) -> CliResult<()> {
    Logger::set_min_severity(cli.log_level);

    let _lock = match ProgramLock::acquire(cli.flavor()) {
        Ok(lock) => lock,
        Err(e @ LockError::Held { .. }) => {
            println!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let config = ReplicaSetConfig::load(&cli.config, &cli.dir)?;
    let connector = MysqlConnector::new(config.connect_timeout(), config.command_timeout());

    let stdout = io::stdout();
    failover(&config, &connector, &cli.operations(), stdout.lock())
}

/// Connect the configured replica set and run `operations` against it.
///
/// A failed operation has its message written to `out` and is returned as
/// an already-reported `CliError`.
pub fn failover<W: Write>(
    config: &ReplicaSetConfig,
    connector: &dyn Connector,
    operations: &[Operation],
    out: W,
) -> CliResult<()> {
    let (replicas, _unreachable) = ReplicaSet::connect(config.endpoints(), connector);
    let mut controller = FailoverController::new(replicas, config, connector, out);

    let result = controller.run(operations);
    let mut out = controller.into_output();

    match result {
        Ok(()) => {
            out.flush()?;
            Ok(())
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            out.flush()?;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryCluster;
    use crate::cli::errors::CliErrorCode;

    fn config(names: &[&str]) -> ReplicaSetConfig {
        let replicas: Vec<String> = names
            .iter()
            .map(|n| {
                format!(
                    r#"{{ "name": "{n}", "host": "{n}.local", "sql_user": "admin", "rep_user": "repl", "rep_pass": "r" }}"#
                )
            })
            .collect();
        ReplicaSetConfig::from_json(&format!(r#"{{ "replicas": [{}] }}"#, replicas.join(","))).unwrap()
    }

    #[test]
    fn test_failover_prints_failure_message() {
        let cluster = MemoryCluster::new()
            .with_replica("db1", "a:1-5")
            .with_replica("db2", "a:1-4");
        let mut out = Vec::new();

        let err = failover(
            &config(&["db1", "db2"]),
            &cluster,
            &[Operation::PromoteDesignated {
                name: "db7".to_string(),
            }],
            &mut out,
        )
        .unwrap_err();

        assert_eq!(err.code(), &CliErrorCode::OperationFailed);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Slave: db7 was not found in slave array\n"
        );
    }

    #[test]
    fn test_failover_excludes_unreachable() {
        let cluster = MemoryCluster::new()
            .with_replica("db1", "a:1-5")
            .with_replica("db2", "a:1-4")
            .with_replica("db3", "a:1-3");
        cluster.set_reachable("db1", false);
        let mut out = Vec::new();

        failover(
            &config(&["db1", "db2", "db3"]),
            &cluster,
            &[Operation::PromoteBest],
            &mut out,
        )
        .unwrap();

        assert_eq!(cluster.repoint_attempts(), vec![("db2".into(), "db3".into())]);
        assert!(out.is_empty());
        assert_eq!(cluster.open_sessions(), 0);
    }
}
