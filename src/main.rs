//! repfail CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments and runs the operation (via cli::run)
//! 2. Prints errors to stderr unless already reported on stdout
//! 3. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use repfail::cli;

fn main() {
    if let Err(e) = cli::run() {
        if !e.is_reported() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
