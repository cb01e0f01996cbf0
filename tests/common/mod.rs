#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use cache_prune::prune::DEL_SUFFIX;
use filetime::FileTime;
use walkdir::WalkDir;

pub const GIB: u64 = 1024 * 1024 * 1024;
pub const MIB: u64 = 1024 * 1024;

/// Create `<root>/<bucket>/<name>` as a sparse file of `size` bytes with the
/// given access time in seconds since the epoch.
///
/// Sparse files let the scenarios use gigabyte-sized entries without
/// writing gigabytes.
pub fn sparse_entry(root: &Path, bucket: &str, name: &str, size: u64, atime_secs: i64) -> PathBuf {
    let dir = root.join(bucket);
    fs::create_dir_all(&dir).expect("failed to create bucket");
    let path = dir.join(name);
    File::create(&path)
        .and_then(|file| file.set_len(size))
        .expect("failed to create entry");
    filetime::set_file_atime(&path, FileTime::from_unix_time(atime_secs, 0))
        .expect("failed to set atime");
    path
}

/// All regular files under `root`, sorted.
pub fn cache_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Apparent size of every regular file under `root`.
pub fn cache_size(root: &Path) -> u64 {
    cache_files(root)
        .iter()
        .filter_map(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .sum()
}

/// File names (not paths) still present in `bucket`.
pub fn names_in(root: &Path, bucket: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root.join(bucket))
        .expect("bucket should exist")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Panics if any entry is visible both under its own name and as a claimed
/// `.del` file.
pub fn assert_no_claimed_pairs(root: &Path) {
    for file in cache_files(root) {
        let name = file.to_string_lossy();
        if let Some(original) = name.strip_suffix(DEL_SUFFIX) {
            assert!(
                !Path::new(original).exists(),
                "{original} and its claimed copy are both present"
            );
        }
    }
}
