//! Wiring from parsed CLI arguments to a prune run.

use crate::cli::Cli;
use crate::error::Result;
use crate::logging::Logger;
use crate::prune::PruneRequest;
use crate::prune::size::gib_to_bytes;

pub(crate) mod prune;

pub use prune::{Prune, PruneBuilder, PruneSummary};


/// Execute a prune run based on the parsed CLI arguments, logging to stderr.
pub fn execute(cli: &Cli) -> Result<PruneSummary> {
    let quiet = cli.quiet();
    let verbose = if quiet { 0 } else { cli.verbose() };

    execute_with_logger(cli, &Logger::new(verbose, quiet))
}

/// Execute a prune run with an explicit logger.
pub fn execute_with_logger(cli: &Cli, log: &Logger) -> Result<PruneSummary> {
    let request = PruneRequest::builder()
        .cache_root(cli.get_cache_dir())
        .quota_bytes(gib_to_bytes(cli.cache_size_gib()))
        .target_ratio(cli.prune_ratio())
        .build();

    Prune::builder(log)
        .request(request)
        .dry_run(cli.dry_run())
        .reap(cli.reap())
        .build()?
        .run()
}
