//! Replication position tokens
//!
//! A node's executed GTID set, compared as an opaque string.

use std::cmp::Ordering;
use std::fmt;

/// Executed GTID set of one node.
///
/// Ordering is plain lexicographic order over the normalized text. Ranking
/// treats the smallest set as the most advanced, so callers must hand in
/// sets whose representation follows that convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GtidSet(String);

impl GtidSet {
    /// Normalize a GTID set as reported by the server.
    ///
    /// Servers wrap long sets across lines; whitespace carries no meaning.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialOrd for GtidSet {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GtidSet {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl fmt::Display for GtidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GtidSet {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for GtidSet {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
