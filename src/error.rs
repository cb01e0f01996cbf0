//! Error types for cache-prune.
//!
//! Only conditions that end the run are errors. Per-entry races and
//! failures during enumeration or removal are logged and tallied in the
//! [`RemovalReport`](crate::prune::RemovalReport) instead.
//!
//! # Error Handling Strategy
//!
//! - All fatal errors are variants of [`PruneError`]
//! - Each variant carries a diagnostic code and, where useful, help text
//! - `main` converts them to `miette::Result`, which exits with status 1
//!   after printing the report on one line via [`OneLineReportHandler`]
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cache_prune::error::{PruneError, Result};
//!
//! fn check_root(path: &Path) -> Result<()> {
//!     if !path.exists() {
//!         return Err(PruneError::CacheDirNotFound(path.to_path_buf()));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Fatal errors that abort a prune run
#[derive(Error, Debug, Diagnostic)]
pub enum PruneError {
    /// A run parameter is outside its accepted range.
    ///
    /// Raised while validating a [`PruneRequest`](crate::prune::PruneRequest),
    /// both by the CLI driver before touching the filesystem and by the
    /// planner, which refuses to produce a partial plan.
    #[error("Invalid input: {message}")]
    #[diagnostic(
        code(cache_prune::invalid_input),
        help("The prune ratio must be strictly between 0 and 1 (for example 0.8).")
    )]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// A required option was never set.
    ///
    /// Only reachable through the programmatic builders; clap enforces the
    /// same options on the command line.
    #[error("Missing required option: {name}")]
    #[diagnostic(
        code(cache_prune::missing_option),
        help("Set it on the builder before calling build().")
    )]
    MissingOption {
        /// The option that was not provided
        name: &'static str,
    },

    /// The cache directory does not exist.
    #[error("Cache directory '{0}' does not exist")]
    #[diagnostic(
        code(cache_prune::cache_dir::not_found),
        help("Pass the cache root with --cache-dir.")
    )]
    CacheDirNotFound(
        /// The path that was given
        PathBuf,
    ),

    /// The cache directory path exists but is not a directory.
    #[error("Cache directory '{0}' is not a directory")]
    #[diagnostic(code(cache_prune::cache_dir::not_a_directory))]
    NotADirectory(
        /// The path that was given
        PathBuf,
    ),

    /// File system I/O error that the run cannot recover from.
    ///
    /// Raised when the cache root itself cannot be listed. Failures on
    /// individual buckets or entries are warnings, not errors.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(cache_prune::io_error))]
    Io {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache root could not be removed wholesale.
    #[error("Failed to remove cache root '{path}'")]
    #[diagnostic(
        code(cache_prune::wipe_failed),
        help("Check permissions on the cache directory, then run the pruner again.")
    )]
    WipeFailed {
        /// The cache root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PruneError>;

/// Render a diagnostic as a single line: the message, its source chain
/// joined with `: `, and the help text in parentheses.
pub fn one_line(diagnostic: &dyn Diagnostic) -> String {
    let mut line = diagnostic.to_string();

    let mut source = diagnostic.source();
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }

    if let Some(help) = diagnostic.help() {
        line.push_str(&format!(" (help: {help})"));
    }

    line.replace('\n', " ")
}

/// miette report handler printing every report on one line
#[derive(Debug, Default, Clone, Copy)]
pub struct OneLineReportHandler;

impl miette::ReportHandler for OneLineReportHandler {
    fn debug(&self, diagnostic: &dyn Diagnostic, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&one_line(diagnostic))
    }
}
