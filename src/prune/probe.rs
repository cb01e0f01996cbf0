use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PruneError, Result};
use crate::logging::Logger;
use crate::timestamp::system_time_to_nanos;

/// Suffix marking an entry that a pruner has claimed but not yet unlinked
pub const DEL_SUFFIX: &str = ".del";

/// A single cached artifact, as seen at enumeration time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    path: PathBuf,
    atime: i128,
    size: u64,
}

impl CacheEntry {
    /// `atime` is in nanoseconds relative to the Unix epoch.
    pub fn new(path: impl Into<PathBuf>, atime: i128, size: u64) -> Self {
        Self {
            path: path.into(),
            atime,
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn atime(&self) -> i128 {
        self.atime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Where the remover parks this entry between rename and unlink.
    pub fn claim_path(&self) -> PathBuf {
        let mut claimed = self.path.clone().into_os_string();
        claimed.push(DEL_SUFFIX);
        PathBuf::from(claimed)
    }
}

/// All entries of a cache, most recently used first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheIndex {
    entries: Vec<CacheEntry>,
    total_bytes: u64,
}

impl CacheIndex {
    /// Build an index, dropping repeated paths (first occurrence wins) and
    /// sorting by `(atime, path)` descending.
    pub fn from_entries(entries: impl IntoIterator<Item = CacheEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<CacheEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.path.clone()))
            .collect();

        entries.sort_by(|a, b| {
            b.atime
                .cmp(&a.atime)
                .then_with(|| b.path.cmp(&a.path))
        });

        let total_bytes = entries
            .iter()
            .fold(0u64, |sum, entry| sum.saturating_add(entry.size));

        Self {
            entries,
            total_bytes,
        }
    }

    /// Entries, most recently used first.
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Entries, least recently used first; ties in ascending path order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter().rev()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Enumerates the two-level `<root>/<bucket>/<entry>` cache layout
#[derive(Debug, Clone)]
pub struct Probe {
    log: Logger,
}

impl Probe {
    pub fn new(log: Logger) -> Self {
        Self { log }
    }

    /// Scan `cache_root` and build its [`CacheIndex`].
    ///
    /// Only a failure to list `cache_root` itself is an error. Unreadable
    /// buckets and unexpected subdirectories are warnings; entries that
    /// vanish between listing and stat are dropped.
    pub fn enumerate(&self, cache_root: &Path) -> Result<CacheIndex> {
        let buckets = fs::read_dir(cache_root).map_err(|source| PruneError::Io {
            path: cache_root.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        let mut bucket_count = 0usize;

        for bucket in buckets {
            let bucket = match bucket {
                Ok(bucket) => bucket,
                Err(err) => {
                    self.log.warning(format!(
                        "Failed to read an entry of {}: {err}",
                        cache_root.display()
                    ));
                    continue;
                }
            };

            // Top-level files and symlinks are not part of the layout.
            match bucket.file_type() {
                Ok(file_type) if file_type.is_dir() => {}
                Ok(_) => {
                    self.log
                        .debug(format!("Ignoring top-level {}", bucket.path().display()));
                    continue;
                }
                Err(err) => {
                    self.log.debug(format!(
                        "Ignoring top-level {}: {err}",
                        bucket.path().display()
                    ));
                    continue;
                }
            }

            bucket_count += 1;
            self.scan_bucket(&bucket.path(), &mut entries);
        }

        let index = CacheIndex::from_entries(entries);
        self.log.debug(format!(
            "Found {} entries in {bucket_count} buckets under {}",
            index.len(),
            cache_root.display()
        ));
        Ok(index)
    }

    fn scan_bucket(&self, bucket: &Path, entries: &mut Vec<CacheEntry>) {
        let listing = match fs::read_dir(bucket) {
            Ok(listing) => listing,
            Err(err) => {
                self.log.warning(format!(
                    "Skipping unreadable bucket {}: {err}",
                    bucket.display()
                ));
                return;
            }
        };

        for item in listing {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    self.log.warning(format!(
                        "Failed to read an entry of bucket {}: {err}",
                        bucket.display()
                    ));
                    continue;
                }
            };

            let path = item.path();
            if path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(DEL_SUFFIX))
            {
                continue;
            }

            if let Some(entry) = self.stat_entry(path) {
                entries.push(entry);
            }
        }
    }

    fn stat_entry(&self, path: PathBuf) -> Option<CacheEntry> {
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            // Lost a race with a concurrent writer or pruner.
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                self.log
                    .debug(format!("Dropping {}: stat failed: {err}", path.display()));
                return None;
            }
        };

        if metadata.is_dir() {
            self.log.warning(format!(
                "Skipping unexpected directory {} inside a bucket",
                path.display()
            ));
            return None;
        }

        if !metadata.is_file() {
            self.log
                .debug(format!("Ignoring non-regular file {}", path.display()));
            return None;
        }

        let atime = match metadata.accessed() {
            Ok(atime) => system_time_to_nanos(atime),
            Err(err) => {
                self.log.debug(format!(
                    "Dropping {}: no access time: {err}",
                    path.display()
                ));
                return None;
            }
        };

        Some(CacheEntry::new(path, atime, metadata.len()))
    }
}
