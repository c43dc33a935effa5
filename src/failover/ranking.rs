//! Replica ranking
//!
//! Orders replicas by executed GTID set, best first. The comparison is the
//! natural order of the set's text form and the smallest set ranks best.
//! Sorting is stable: replicas with equal sets keep their input order.

use std::cmp::Ordering;

use crate::replica::{GtidSet, ReplicaHandle};

/// One replica paired with the position it was ranked by.
#[derive(Debug, Clone, Copy)]
pub struct RankedEntry<'a> {
    pub position: &'a GtidSet,
    pub replica: &'a ReplicaHandle,
}

/// Order used by every ranking in the crate.
pub fn compare_positions(a: &ReplicaHandle, b: &ReplicaHandle) -> Ordering {
    a.executed_gtid_set().cmp(b.executed_gtid_set())
}

/// Rank `replicas`, best first. Pure; never fails.
pub fn rank(replicas: &[ReplicaHandle]) -> Vec<RankedEntry<'_>> {
    let mut entries: Vec<RankedEntry<'_>> = replicas
        .iter()
        .map(|replica| RankedEntry {
            position: replica.executed_gtid_set(),
            replica,
        })
        .collect();
    entries.sort_by(|a, b| a.position.cmp(b.position));
    entries
}

/// Rank owned handles, keeping each handle's original index.
pub fn rank_owned(replicas: Vec<ReplicaHandle>) -> Vec<(usize, ReplicaHandle)> {
    let mut indexed: Vec<(usize, ReplicaHandle)> = replicas.into_iter().enumerate().collect();
    indexed.sort_by(|(_, a), (_, b)| compare_positions(a, b));
    indexed
}
