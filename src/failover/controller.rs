//! Failover Controller
//!
//! Owns the working replica set for one invocation:
//! - Checks preconditions once, before any operation runs
//! - Runs requested operations in dispatch order, stopping at the first failure
//! - Releases every replica session before returning
//!
//! The controller never retries. A failed operation is reported through
//! `FailoverError` and the operator decides what happens next.

use std::io::Write;

use uuid::Uuid;

use super::errors::{FailoverError, FailoverResult};
use super::operation::Operation;
use super::promotion::promote;
use super::ranking::{rank, rank_owned};
use super::repoint::repoint_all;
use crate::observability::{log_event, Event, ObservationScope};
use crate::replica::{position_by_name, Connector, CredentialSource, ReplicaHandle, ReplicaSet};

/// Runs failover operations against one replica set.
///
/// Operator-facing output (rankings, best replica) is written to `out`.
pub struct FailoverController<'a, W: Write> {
    replicas: ReplicaSet,
    credentials: &'a dyn CredentialSource,
    connector: &'a dyn Connector,
    out: W,
    run_id: Uuid,
}

impl<'a, W: Write> FailoverController<'a, W> {
    pub fn new(
        replicas: ReplicaSet,
        credentials: &'a dyn CredentialSource,
        connector: &'a dyn Connector,
        out: W,
    ) -> Self {
        Self {
            replicas,
            credentials,
            connector,
            out,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn replicas(&self) -> &ReplicaSet {
        &self.replicas
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    // =========================================================================
    // INVOCATION
    // =========================================================================

    /// Run `requested` operations.
    ///
    /// A precondition failure stops before any operation and leaves sessions
    /// as they are. Otherwise every replica session is released on return,
    /// whichever way the operations went.
    pub fn run(&mut self, requested: &[Operation]) -> FailoverResult {
        self.check_preconditions()?;

        let mut result = Ok(());
        for op in Operation::dispatch_order(requested) {
            result = self.execute(&op);
            if result.is_err() {
                break;
            }
        }

        self.release_connections();
        result
    }

    /// Non-empty set, every replica in GTID mode.
    pub fn check_preconditions(&self) -> FailoverResult {
        if self.replicas.is_empty() || !self.replicas.all_gtid_enabled() {
            let count = self.replicas.len().to_string();
            let run_id = self.run_id.to_string();
            log_event(
                Event::PreconditionFailed,
                &[("replicas", count.as_str()), ("run_id", run_id.as_str())],
            );
            return Err(FailoverError::PreconditionFailed);
        }
        Ok(())
    }

    /// Run one operation inside an observation scope.
    pub fn execute(&mut self, op: &Operation) -> FailoverResult {
        let run_id = self.run_id.to_string();
        let scope = ObservationScope::with_fields(
            "OPERATION",
            &[("operation", op.label()), ("run_id", run_id.as_str())],
        );

        let result = match op {
            Operation::ShowBest => self.show_best(),
            Operation::ShowRanking => self.show_ranking(),
            Operation::PromoteBest => self.promote_best(),
            Operation::PromoteDesignated { name } => self.promote_designated(name),
        };

        match &result {
            Ok(()) => scope.complete(),
            Err(e) => scope.fail(&e.to_string()),
        }
        result
    }

    /// Release every replica session. Safe to call more than once.
    pub fn release_connections(&mut self) {
        self.replicas.disconnect_all();
        let count = self.replicas.len().to_string();
        let run_id = self.run_id.to_string();
        log_event(
            Event::ConnectionsReleased,
            &[("replicas", count.as_str()), ("run_id", run_id.as_str())],
        );
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Print the best replica, then the rest in ranked order.
    pub fn show_ranking(&mut self) -> FailoverResult {
        let ranked = rank(self.replicas.as_slice());
        let (head, rest) = ranked.split_first().ok_or(FailoverError::NoReplicas)?;

        writeln!(self.out, "Best Slave: {}\tGTID Pos: {}", head.replica.name(), head.position)?;
        for entry in rest {
            writeln!(self.out, "     Slave: {}\tGTID Pos: {}", entry.replica.name(), entry.position)?;
        }
        Ok(())
    }

    /// Print the best replica's name.
    pub fn show_best(&mut self) -> FailoverResult {
        let ranked = rank(self.replicas.as_slice());
        let head = ranked.first().ok_or(FailoverError::NoReplicas)?;

        writeln!(self.out, "Best Slave: {}", head.replica.name())?;
        Ok(())
    }

    /// Promote the best replica; repoint the rest best-first.
    pub fn promote_best(&mut self) -> FailoverResult {
        const OPERATION: &str = "promote_best_slave";

        let mut ranked = rank_owned(self.replicas.check_out());
        if ranked.is_empty() {
            return Err(FailoverError::NoReplicas);
        }

        let (index, chosen) = ranked.remove(0);
        let result = self.promote_and_repoint(OPERATION, &chosen, ranked.iter_mut().map(|(_, r)| r));

        ranked.push((index, chosen));
        ranked.sort_by_key(|(i, _)| *i);
        self.replicas.check_in(ranked.into_iter().map(|(_, r)| r).collect());

        result
    }

    /// Promote the replica called `name`; repoint the rest in set order.
    pub fn promote_designated(&mut self, name: &str) -> FailoverResult {
        const OPERATION: &str = "promote_designated_slave";

        if self.replicas.is_empty() {
            return Err(FailoverError::NoReplicas);
        }

        let mut working = self.replicas.check_out();
        let position = match position_by_name(&working, name) {
            Some(position) => position,
            None => {
                self.replicas.check_in(working);
                return Err(FailoverError::ReplicaNotFound {
                    name: name.to_string(),
                });
            }
        };

        let chosen = working.remove(position);
        let result = self.promote_and_repoint(OPERATION, &chosen, working.iter_mut());

        working.insert(position, chosen);
        self.replicas.check_in(working);

        result
    }

    /// Promote `chosen`, repoint `rest` unless promotion failed, then release
    /// the primary session.
    fn promote_and_repoint<'r, I>(
        &self,
        operation: &'static str,
        chosen: &ReplicaHandle,
        rest: I,
    ) -> FailoverResult
    where
        I: IntoIterator<Item = &'r mut ReplicaHandle>,
    {
        let mut primary = promote(operation, chosen, self.credentials, self.connector)?;

        let result = match primary.connection_error() {
            Some(diagnostic) => Err(FailoverError::PromotionFailed {
                operation,
                server: primary.name().to_string(),
                diagnostic: diagnostic.to_string(),
            }),
            None => {
                let failed = repoint_all(&primary, rest);
                if failed.is_empty() {
                    Ok(())
                } else {
                    Err(FailoverError::RepointFailed { failed })
                }
            }
        };

        primary.disconnect();
        result
    }
}
