//! Observability for failover runs
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed failover events
//! - Operation scopes with elapsed time
//!
//! Observability is read-only: a failed log write never changes the
//! outcome of an operation.
//!
//! ```ignore
//! use repfail::observability::{log_event, Event};
//!
//! log_event(Event::RepointFailed, &[("server", "db3"), ("error", "timeout")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a failover event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::LockAcquired, &[]);
        log_event(Event::ConfigLoaded, &[("path", "/tmp/replicas.json")]);
    }
}
