//! Promotion
//!
//! Turns the chosen replica into a primary handle: look up the replication
//! credentials other nodes will use, copy the replica's identity and open a
//! primary-role session.

use super::errors::{FailoverError, FailoverResult};
use crate::observability::{log_event, Event};
use crate::replica::{Connector, CredentialSource, PrimaryHandle, ReplicaHandle};

/// Promote `chosen`.
///
/// A missing credentials entry fails before any session is opened. A failed
/// session is not an error here: the returned handle carries the diagnostic
/// in `connection_error` and the caller decides what to do with it.
pub fn promote(
    operation: &'static str,
    chosen: &ReplicaHandle,
    credentials: &dyn CredentialSource,
    connector: &dyn Connector,
) -> FailoverResult<PrimaryHandle> {
    let port = chosen.port().to_string();

    let creds = match credentials.replication_credentials(chosen.name(), chosen.port()) {
        Some(creds) => creds,
        None => {
            log_event(
                Event::PromotionFailed,
                &[
                    ("server", chosen.name()),
                    ("port", port.as_str()),
                    ("error", "replication credentials not found"),
                ],
            );
            return Err(FailoverError::CredentialsNotFound {
                operation,
                name: chosen.name().to_string(),
                port: chosen.port(),
            });
        }
    };

    let primary = PrimaryHandle::open(chosen, creds, connector);

    match primary.connection_error() {
        Some(diagnostic) => log_event(
            Event::PromotionFailed,
            &[("server", primary.name()), ("error", diagnostic)],
        ),
        None => log_event(
            Event::PrimaryPromoted,
            &[
                ("server", primary.name()),
                ("port", port.as_str()),
                ("gtid_executed", chosen.executed_gtid_set().as_str()),
            ],
        ),
    }

    Ok(primary)
}
