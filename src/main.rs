//! # cache-prune CLI
//!
//! Evicts least-recently-used entries from a shared build-artifact cache
//! until it fits under its quota.
//!
//! ## Quick Start
//!
//! ```bash
//! # Default quota of 200 GiB, prune down to 80% of it
//! cache-prune --cache-dir /var/cache/scons
//!
//! # 50 GiB quota, prune down to half, preview only
//! cache-prune -d /var/cache/scons -s 50 -p 0.5 --dry-run
//! ```
//!
//! ## Exit Status
//!
//! - `0`: the cache was pruned, or was already within its quota
//! - `1`: invalid arguments, or a fatal failure such as an unlistable cache
//!   directory
//!
//! All output goes to stderr. Fatal errors are printed as a single line.

use cache_prune::cli::Cli;
use cache_prune::error::OneLineReportHandler;

fn main() -> miette::Result<()> {
    // Install miette's fancy panic hook
    miette::set_panic_hook();

    // Fatal errors are reported on a single stderr line
    miette::set_hook(Box::new(|_| Box::new(OneLineReportHandler)))?;

    let cli = Cli::parse_args();

    cache_prune::commands::execute(&cli)?;

    Ok(())
}
