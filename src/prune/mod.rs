//! Least-recently-used pruning of a shared build-artifact cache.
//!
//! The cache is laid out as `<root>/<bucket>/<entry>`. A run flows through
//! three components, each given the same [`Logger`](crate::logging::Logger):
//!
//! - [`Probe`]: lists buckets and stats every entry once (atime and size)
//! - [`Planner`]: picks the oldest entries until the cache would be at or
//!   below `quota * ratio`, or plans a wholesale wipe
//! - [`Remover`]: claims each entry by renaming it to `<entry>.del`, then
//!   unlinks the claimed file
//!
//! Concurrent pruners, writers and readers coordinate only through that
//! atomic rename. Everything runs on one thread.
//!
//! # Example
//!
//! ```no_run
//! use cache_prune::logging::Logger;
//! use cache_prune::prune::{Planner, Probe, PruneRequest, Remover};
//!
//! let log = Logger::new(0, false);
//! let request = PruneRequest::builder()
//!     .cache_root("/var/cache/build")
//!     .quota_bytes(5 * 1024 * 1024 * 1024) // 5GiB
//!     .target_ratio(0.8)
//!     .build();
//!
//! let index = Probe::new(log.clone()).enumerate(request.cache_root())?;
//! let plan = Planner::new(log.clone()).plan(&index, &request)?;
//! let report = Remover::new(request.cache_root(), log).apply(&plan)?;
//! println!("Freed {} bytes", report.bytes_reclaimed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod planner;
mod probe;
mod remover;
mod request;
pub mod size;

pub use planner::{EvictionPlan, Planner};
pub use probe::{CacheEntry, CacheIndex, DEL_SUFFIX, Probe};
pub use remover::{
    Filesystem, ReapReport, RemovalOutcome, RemovalReport, Remover, StdFilesystem,
};
pub use request::{DEFAULT_QUOTA_GIB, DEFAULT_TARGET_RATIO, PruneRequest, PruneRequestBuilder};
