//! Repointing
//!
//! Every remaining replica is told to follow the new primary, one at a
//! time, in the order given. A failed node is recorded and the loop moves
//! on; the promoted node's own replication thread is left untouched.

use crate::observability::{log_event, Event};
use crate::replica::{PrimaryHandle, ReplicaHandle};

/// Repoint each replica to `primary`, exactly once each.
///
/// Returns the names of the replicas that did not change, in attempt order.
pub fn repoint_all<'a, I>(primary: &PrimaryHandle, replicas: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a mut ReplicaHandle>,
{
    let mut failed = Vec::new();

    for replica in replicas {
        match replica.follow(primary) {
            Ok(()) => log_event(
                Event::ReplicaRepointed,
                &[("server", replica.name()), ("primary", primary.name())],
            ),
            Err(e) => {
                log_event(
                    Event::RepointFailed,
                    &[
                        ("server", replica.name()),
                        ("primary", primary.name()),
                        ("error", e.reason()),
                    ],
                );
                failed.push(replica.name().to_string());
            }
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryCluster;
    use crate::replica::ReplicationCredentials;

    fn setup(names: &[&str]) -> (MemoryCluster, PrimaryHandle, Vec<ReplicaHandle>) {
        let mut cluster = MemoryCluster::new().with_replica("new-primary", "a:1-9");
        for name in names {
            cluster = cluster.with_replica(name, "a:1-5");
        }
        let chosen = ReplicaHandle::connect(cluster.endpoint("new-primary"), &cluster).unwrap();
        let primary =
            PrimaryHandle::open(&chosen, ReplicationCredentials::new("repl", "x"), &cluster);
        let replicas = names
            .iter()
            .map(|n| ReplicaHandle::connect(cluster.endpoint(n), &cluster).unwrap())
            .collect();
        (cluster, primary, replicas)
    }

    #[test]
    fn test_all_succeed() {
        let (cluster, primary, mut replicas) = setup(&["db2", "db3"]);

        let failed = repoint_all(&primary, replicas.iter_mut());

        assert!(failed.is_empty());
        assert_eq!(cluster.following("db2").as_deref(), Some("new-primary"));
        assert_eq!(cluster.following("db3").as_deref(), Some("new-primary"));
    }

    #[test]
    fn test_no_short_circuit() {
        let (cluster, primary, mut replicas) = setup(&["first", "second", "third"]);
        cluster.fail_repoint("first");
        cluster.fail_repoint("second");

        let failed = repoint_all(&primary, replicas.iter_mut());

        assert_eq!(failed, vec!["first", "second"]);
        let attempted: Vec<String> = cluster.repoint_attempts().into_iter().map(|(s, _)| s).collect();
        assert_eq!(attempted, vec!["first", "second", "third"]);
        assert_eq!(cluster.following("third").as_deref(), Some("new-primary"));
    }

    #[test]
    fn test_disconnected_replica_counts_as_failed() {
        let (cluster, primary, mut replicas) = setup(&["db2", "db3"]);
        replicas[0].disconnect();

        let failed = repoint_all(&primary, replicas.iter_mut());

        assert_eq!(failed, vec!["db2"]);
        assert_eq!(cluster.repoint_attempts().len(), 1);
    }

    #[test]
    fn test_empty_set() {
        let (cluster, primary, mut replicas) = setup(&[]);
        assert!(repoint_all(&primary, replicas.iter_mut()).is_empty());
        assert!(cluster.repoint_attempts().is_empty());
    }
}
