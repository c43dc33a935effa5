//! Failover Subsystem
//!
//! Promotes a new primary from a set of live GTID replicas after the old
//! primary is gone, and repoints the remaining replicas to it.
//!
//! - Ranking is by executed GTID set; the smallest set ranks best
//! - Promotion opens a primary-role session on the chosen node
//! - Repointing attempts every remaining replica, never short-circuits
//! - No automatic detection of primary failure: the operator asserts it
//!
//! Nothing here retries. Failures are explicit and surface once, through
//! `FailoverError`.

mod controller;
mod errors;
mod operation;
mod promotion;
mod ranking;
mod repoint;

pub use controller::FailoverController;
pub use errors::{FailoverError, FailoverErrorKind, FailoverResult};
pub use operation::Operation;
pub use promotion::promote;
pub use ranking::{compare_positions, rank, rank_owned, RankedEntry};
pub use repoint::repoint_all;
