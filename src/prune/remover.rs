use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::planner::EvictionPlan;
use super::probe::{CacheEntry, DEL_SUFFIX};
use super::size::format_size;
use crate::error::{PruneError, Result};
use crate::logging::Logger;

/// Mutating filesystem calls used by the remover.
///
/// [`StdFilesystem`] is the real implementation; tests wrap it to inject
/// failures.
pub trait Filesystem {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`Filesystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

/// Result of evicting one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Renamed and unlinked; its bytes count as reclaimed
    Removed,
    /// Left alone, usually because someone else got there first
    Skipped,
    /// Claimed but the unlink failed; the `.del` file is left behind
    Errored,
}

/// Statistics about an applied plan
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Bytes actually freed
    pub bytes_reclaimed: u64,
    /// Entries renamed and unlinked
    pub entries_removed: usize,
    /// Entries not touched
    pub entries_skipped: usize,
    /// Entries whose unlink failed after the rename
    pub entries_errored: usize,
}

impl RemovalReport {
    fn record(&mut self, outcome: RemovalOutcome, size: u64) {
        match outcome {
            RemovalOutcome::Removed => {
                self.entries_removed += 1;
                self.bytes_reclaimed = self.bytes_reclaimed.saturating_add(size);
            }
            RemovalOutcome::Skipped => self.entries_skipped += 1,
            RemovalOutcome::Errored => self.entries_errored += 1,
        }
    }
}

/// Statistics about a stale `.del` sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReapReport {
    pub files_reaped: usize,
    pub bytes_reaped: u64,
}

/// Applies eviction plans with the rename-then-unlink protocol
#[derive(Debug, Clone)]
pub struct Remover<F = StdFilesystem> {
    cache_root: PathBuf,
    fs: F,
    log: Logger,
}

impl Remover<StdFilesystem> {
    pub fn new(cache_root: impl Into<PathBuf>, log: Logger) -> Self {
        Self::with_filesystem(cache_root, StdFilesystem, log)
    }
}

impl<F: Filesystem> Remover<F> {
    pub fn with_filesystem(cache_root: impl Into<PathBuf>, fs: F, log: Logger) -> Self {
        Self {
            cache_root: cache_root.into(),
            fs,
            log,
        }
    }

    /// Apply `plan` in order.
    ///
    /// Per-entry failures are logged and tallied, never returned. The only
    /// error is a failed wholesale removal of the cache root.
    pub fn apply(&self, plan: &EvictionPlan) -> Result<RemovalReport> {
        match plan {
            EvictionPlan::Evict { entries, .. } => {
                let mut report = RemovalReport::default();
                for entry in entries {
                    let outcome = self.evict(entry);
                    report.record(outcome, entry.size());
                }
                Ok(report)
            }
            EvictionPlan::WipeAll { total_bytes } => self.wipe(*total_bytes),
        }
    }

    /// Evict a single entry: claim it by renaming to `<path>.del`, then
    /// unlink the claimed file.
    pub fn evict(&self, entry: &CacheEntry) -> RemovalOutcome {
        let path = entry.path();
        let claimed = entry.claim_path();

        match self.fs.rename(path, &claimed) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.log
                    .debug(format!("  {} already gone, skipping", path.display()));
                return RemovalOutcome::Skipped;
            }
            Err(err) => {
                self.log.warning(format!(
                    "Failed to claim {} for removal: {err}",
                    path.display()
                ));
                return RemovalOutcome::Skipped;
            }
        }

        match self.fs.remove_file(&claimed) {
            Ok(()) => {
                self.log.debug(format!(
                    "  Removed {} ({})",
                    path.display(),
                    format_size(entry.size())
                ));
                RemovalOutcome::Removed
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.log.debug(format!(
                    "  {} vanished after being claimed, skipping",
                    claimed.display()
                ));
                RemovalOutcome::Skipped
            }
            Err(err) => {
                self.log.error(format!(
                    "Failed to unlink claimed entry {}: {err}",
                    claimed.display()
                ));
                RemovalOutcome::Errored
            }
        }
    }

    fn wipe(&self, total_bytes: u64) -> Result<RemovalReport> {
        self.log.info(format!(
            "Removing entire cache root {}",
            self.cache_root.display()
        ));
        self.fs
            .remove_dir_all(&self.cache_root)
            .map_err(|source| PruneError::WipeFailed {
                path: self.cache_root.clone(),
                source,
            })?;

        Ok(RemovalReport {
            bytes_reclaimed: total_bytes,
            ..RemovalReport::default()
        })
    }

    /// Delete `.del` files left inside buckets by interrupted runs.
    ///
    /// Best effort: failures are warnings and a file that disappears first
    /// is ignored.
    pub fn reap_stale(&self) -> ReapReport {
        let mut report = ReapReport::default();

        let leftovers = WalkDir::new(&self.cache_root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(DEL_SUFFIX));

        for leftover in leftovers {
            let size = leftover.metadata().map(|m| m.len()).unwrap_or(0);
            match self.fs.remove_file(leftover.path()) {
                Ok(()) => {
                    self.log
                        .debug(format!("  Reaped {}", leftover.path().display()));
                    report.files_reaped += 1;
                    report.bytes_reaped = report.bytes_reaped.saturating_add(size);
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => self.log.warning(format!(
                    "Failed to reap {}: {err}",
                    leftover.path().display()
                )),
            }
        }

        report
    }
}
