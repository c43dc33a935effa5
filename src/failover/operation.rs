//! Failover operations and their dispatch order.

use std::fmt;

/// One operator-requested failover operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Print the best replica's name
    ShowBest,
    /// Print every replica with its executed GTID set, best first
    ShowRanking,
    /// Promote the best replica and repoint the rest
    PromoteBest,
    /// Promote the named replica and repoint the rest
    PromoteDesignated { name: String },
}

impl Operation {
    /// Label used in operator messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShowBest => "show_best_slave",
            Self::ShowRanking => "show_slave_delays",
            Self::PromoteBest => "promote_best_slave",
            Self::PromoteDesignated { .. } => "promote_designated_slave",
        }
    }

    /// Position in the dispatch table.
    fn slot(&self) -> u8 {
        match self {
            Self::ShowBest => 0,
            Self::ShowRanking => 1,
            Self::PromoteBest => 2,
            Self::PromoteDesignated { .. } => 3,
        }
    }

    /// Requested operations in dispatch table order, duplicates removed.
    pub fn dispatch_order(requested: &[Operation]) -> Vec<Operation> {
        let mut ops: Vec<Operation> = Vec::with_capacity(requested.len());
        for op in requested {
            if !ops.contains(op) {
                ops.push(op.clone());
            }
        }
        ops.sort_by_key(Operation::slot);
        ops
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Operation::ShowRanking.label(), "show_slave_delays");
        assert_eq!(
            Operation::PromoteDesignated {
                name: "db2".to_string()
            }
            .to_string(),
            "promote_designated_slave"
        );
    }

    #[test]
    fn test_dispatch_order_follows_table() {
        let requested = vec![
            Operation::PromoteBest,
            Operation::ShowBest,
            Operation::ShowRanking,
            Operation::ShowBest,
        ];
        assert_eq!(
            Operation::dispatch_order(&requested),
            vec![
                Operation::ShowBest,
                Operation::ShowRanking,
                Operation::PromoteBest
            ]
        );
    }

    #[test]
    fn test_dispatch_order_empty() {
        assert!(Operation::dispatch_order(&[]).is_empty());
    }
}
