//! Command-line interface definitions for cache-prune.
//!
//! This module defines the CLI structure using clap. The main entry point is
//! the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use cache_prune::cli::Cli;
//!
//! let cli = Cli::parse_args();
//! println!(
//!     "Pruning {:?} to {} GiB",
//!     cli.cache_dir(),
//!     cli.cache_size_gib()
//! );
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use clap::error::ErrorKind;

use crate::error::{PruneError, Result};
use crate::prune::{DEFAULT_QUOTA_GIB, DEFAULT_TARGET_RATIO};

/// Exit status for invalid arguments and fatal failures
pub const EXIT_FAILURE: i32 = 1;

/// Command-line interface of the cache pruner.
#[derive(Debug, Parser)]
#[command(
    name = "cache-prune",
    bin_name = "cache-prune",
    author,
    version,
    about = "Evict least-recently-used entries from a shared build cache",
    long_about = "Keeps a shared build-artifact cache under its quota.\n\nWhen the total size of \
                  the entries in <cache-dir>/<bucket>/ meets or exceeds the quota, the oldest \
                  entries (by access time) are removed until the cache is at or below \
                  quota * prune-ratio. Each entry is renamed to <entry>.del before it is \
                  unlinked so concurrent pruners never fight over a file."
)]
pub struct Cli {
    /// Cache root containing one directory per bucket
    #[arg(short = 'd', long = "cache-dir", value_name = "PATH")]
    cache_dir: PathBuf,

    /// Quota in GiB; eviction starts when the cache reaches it
    #[arg(short = 's', long = "cache-size", value_name = "GIB", default_value_t = DEFAULT_QUOTA_GIB)]
    cache_size: u64,

    /// Fraction of the quota to prune down to, strictly between 0 and 1
    #[arg(short = 'p', long = "prune-ratio", value_name = "RATIO", default_value_t = DEFAULT_TARGET_RATIO)]
    prune_ratio: f64,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show what would be removed without removing anything
    #[arg(long)]
    dry_run: bool,

    /// Leave stale `.del` files from interrupted runs in place
    #[arg(long)]
    no_reap: bool,
}

impl Cli {
    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Get the cache directory as given
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the absolute cache directory path
    pub fn get_cache_dir(&self) -> PathBuf {
        normalize_path(&self.cache_dir)
    }

    /// Get the quota in GiB
    pub fn cache_size_gib(&self) -> u64 {
        self.cache_size
    }

    /// Get the prune ratio
    pub fn prune_ratio(&self) -> f64 {
        self.prune_ratio
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Check whether the stale `.del` sweep should run
    pub fn reap(&self) -> bool {
        !self.no_reap
    }

    /// Parse command line arguments.
    ///
    /// Usage errors print a one-line diagnostic and exit with status 1
    /// rather than clap's default of 2; `--help` and `--version` still exit
    /// successfully.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
                _ => {
                    eprintln!("{}", usage_error_line(&err.render().to_string()));
                    std::process::exit(EXIT_FAILURE);
                }
            },
        }
    }
}

/// Collapse clap's rendered error to its first paragraph on a single line,
/// dropping the usage block and tips that follow it.
fn usage_error_line(rendered: &str) -> String {
    rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    cache_dir: Option<PathBuf>,
    cache_size: Option<u64>,
    prune_ratio: Option<f64>,
    verbose: u8,
    quiet: bool,
    dry_run: bool,
    no_reap: bool,
}

impl CliBuilder {
    /// Set the cache directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the quota in GiB
    pub fn cache_size_gib(mut self, gib: u64) -> Self {
        self.cache_size = Some(gib);
        self
    }

    /// Set the prune ratio
    pub fn prune_ratio(mut self, ratio: f64) -> Self {
        self.prune_ratio = Some(ratio);
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Enable dry run mode
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enable or disable the stale `.del` sweep
    pub fn reap(mut self, enabled: bool) -> Self {
        self.no_reap = !enabled;
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let cache_dir = self
            .cache_dir
            .ok_or(PruneError::MissingOption { name: "cache_dir" })?;

        Ok(Cli {
            cache_dir,
            cache_size: self.cache_size.unwrap_or(DEFAULT_QUOTA_GIB),
            prune_ratio: self.prune_ratio.unwrap_or(DEFAULT_TARGET_RATIO),
            verbose: self.verbose,
            quiet: self.quiet,
            dry_run: self.dry_run,
            no_reap: self.no_reap,
        })
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks (preserves user intent)
/// - Does NOT require the path to exist
fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                if matches!(components.last(), Some(Component::RootDir)) {
                    // `/..` is `/`
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}
