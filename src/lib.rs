//! # cache-prune
//!
//! Keeps a shared, content-addressed build-artifact cache under a disk quota
//! by evicting its least-recently-used entries.
//!
//! ## Overview
//!
//! The cache is a two-level tree, `<cache-dir>/<bucket>/<entry>`, written to
//! and read from by many build jobs at once. When the total size of all
//! entries meets or exceeds the quota, cache-prune removes entries in order
//! of last access time until the cache is at or below `quota * ratio`.
//!
//! ## Key Features
//!
//! - **Oldest first**: entries are ordered by atime, ties broken by path, so
//!   two runs over the same cache remove the same files in the same order
//! - **Crash-safe removal**: each entry is renamed to `<entry>.del` before it
//!   is unlinked, so concurrent pruners never remove the same file twice
//! - **Tolerant of races**: files that vanish mid-run are skipped, not errors
//! - **Stale sweep**: `.del` files left by interrupted runs are reaped on the
//!   next run
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: The prune run wiring probe, planner and remover together
//! - [`prune`]: Probe, planner, remover and their data types
//! - [`logging`]: Leveled diagnostics sink threaded through every component
//! - [`error`]: Error types and handling with thiserror + miette
//!
//! ## Usage
//!
//! ```bash
//! # Prune to 80% of 200 GiB once the cache reaches 200 GiB
//! cache-prune --cache-dir /var/cache/scons
//!
//! # Custom quota and ratio, showing each removed entry
//! cache-prune -d /var/cache/scons -s 50 -p 0.5 -v
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use cache_prune::cli::Cli;
//! use cache_prune::commands;
//!
//! let cli = Cli::builder()
//!     .cache_dir("/var/cache/scons")
//!     .cache_size_gib(50)
//!     .prune_ratio(0.5)
//!     .build()?;
//!
//! let summary = commands::execute(&cli)?;
//! println!("Reclaimed {} bytes", summary.removal.bytes_reclaimed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod prune;

mod timestamp;
