//! CLI argument definitions using clap
//!
//! repfail -s <file> -d <dir> (-F | -G <name> | -B | -D) [-y <flavor>]

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::failover::Operation;
use crate::observability::Severity;

/// repfail - GTID replica set failover for MySQL
///
/// Run only when the primary is down. Promotes one replica to primary and
/// repoints every other replica to follow it.
#[derive(Parser, Debug)]
#[command(name = "repfail")]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("operation")
        .required(true)
        .args(["promote_best", "promote_designated", "show_best", "show_ranking"])
))]
pub struct Cli {
    /// Replica set configuration file
    #[arg(short = 's', value_name = "FILE")]
    pub config: PathBuf,

    /// Directory the configuration file is resolved against
    #[arg(short = 'd', value_name = "DIR", value_parser = existing_dir)]
    pub dir: PathBuf,

    /// Promote the best replica and repoint the others to it
    #[arg(short = 'F')]
    pub promote_best: bool,

    /// Promote the named replica and repoint the others to it
    #[arg(short = 'G', value_name = "NAME")]
    pub promote_designated: Option<String>,

    /// Show the best replica
    #[arg(short = 'B')]
    pub show_best: bool,

    /// Show every replica in ranked order with its GTID position
    #[arg(short = 'D')]
    pub show_ranking: bool,

    /// Flavor id, allowing separate runs against separate replica sets
    #[arg(short = 'y', value_name = "FLAVOR")]
    pub flavor: Option<String>,

    /// Lowest log severity written to stderr
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: Severity,
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("directory does not exist: {}", value))
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Requested operations.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = Vec::new();
        if self.show_best {
            ops.push(Operation::ShowBest);
        }
        if self.show_ranking {
            ops.push(Operation::ShowRanking);
        }
        if self.promote_best {
            ops.push(Operation::PromoteBest);
        }
        if let Some(name) = &self.promote_designated {
            ops.push(Operation::PromoteDesignated { name: name.clone() });
        }
        ops
    }

    pub fn flavor(&self) -> &str {
        self.flavor.as_deref().unwrap_or("")
    }
}
