use std::collections::{BTreeMap, HashSet};

use tracing::{debug, error, info, warn};

use crate::cancel::CancelFlag;
use crate::datetime;
use crate::error::Error;
use crate::mapper::{self, collapse_slashes};
use crate::model::{DuplicateSet, DuplicateSets, FileRecord, ScanOutcome, ScanStats};
use crate::progress::ProgressReporter;
use crate::provider::{FilesystemProvider, SHA1_HASH_KEY};

/// Progress callback cadence, in processed directory entries.
const PROGRESS_INTERVAL: u64 = 200;

/// Digests shorter than a SHA-1 hex string are junk from the API.
const MIN_HASH_LEN: usize = 40;

/// Attribute errors are logged for the first few files, then every tenth,
/// so a systemic provider failure does not flood the log.
const ATTR_ERROR_LOG_LIMIT: u64 = 5;

/// Joins a folder path and an entry name with a single forward slash.
pub fn build_full_path(folder: &str, name: &str) -> String {
    let folder = folder.replace('\\', "/");
    let folder = folder.trim_end_matches('/');
    let name = name.replace('\\', "/");
    let name = name.trim_start_matches('/');
    if folder.is_empty() {
        format!("/{name}")
    } else {
        format!("{folder}/{name}")
    }
}

fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or("");
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

/// Walks one resolved remote root and appends matching files to `by_hash`.
///
/// Per-file problems (attribute errors, missing or short hashes, unparseable
/// dates, bad sizes) are counted and skipped; an error from the walk itself
/// is returned and makes this root fail as a whole.
pub fn scan_root(
    fs: &dyn FilesystemProvider,
    fs_dir_path: &str,
    filter: &HashSet<String>,
    reporter: &dyn ProgressReporter,
    cancel: &CancelFlag,
    stats: &mut ScanStats,
    by_hash: &mut BTreeMap<String, Vec<FileRecord>>,
) -> Result<(), Error> {
    reporter.on_root_start(fs_dir_path);
    let mut items = 0u64;
    let mut videos = 0u64;
    let mut attr_errors = 0u64;

    let walk = fs.walk(fs_dir_path)?;
    'walk: for entry in walk {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            break 'walk;
        }
        let entry = entry?;

        for name in &entry.files {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break 'walk;
            }
            items += 1;
            stats.items_seen += 1;
            if items % PROGRESS_INTERVAL == 0 {
                reporter.on_scan_progress(fs_dir_path, items, videos);
            }
            if name.is_empty() {
                continue;
            }

            let full_path = if name.starts_with('/') {
                name.clone()
            } else if name.contains('/') {
                format!("/{name}")
            } else {
                build_full_path(&entry.folder, name)
            };
            let full_path = collapse_slashes(&full_path);
            if full_path == "/" {
                continue;
            }
            if !filter.contains(&extension_of(&full_path)) {
                continue;
            }
            videos += 1;
            stats.videos_processed += 1;

            let attrs = match fs.get_attributes(&full_path) {
                Ok(attrs) => attrs,
                Err(err) => {
                    attr_errors += 1;
                    stats.attr_errors += 1;
                    if attr_errors <= ATTR_ERROR_LOG_LIMIT || attr_errors % 10 == 0 {
                        warn!(path = %full_path, error = %err, "error getting attributes, skipping file");
                    }
                    continue;
                }
            };

            let hash = attrs
                .file_hashes
                .get(SHA1_HASH_KEY)
                .filter(|h| h.len() >= MIN_HASH_LEN)
                .map(|h| h.to_uppercase());
            let Some(hash) = hash else {
                stats.hash_skips += 1;
                debug!(path = %full_path, "missing or suspiciously short content hash, skipping file");
                continue;
            };

            let modified = match attrs.modified_time.as_deref() {
                Some(raw) if !raw.trim().is_empty() => {
                    let parsed = datetime::parse_modified(raw);
                    if parsed.is_none() {
                        stats.unparsed_dates += 1;
                        warn!(path = %full_path, value = raw, "could not parse modification date");
                    }
                    parsed
                }
                _ => None,
            };

            let size = if attrs.size < 0 {
                warn!(path = %full_path, size = attrs.size, "invalid size value, using 0");
                0
            } else {
                attrs.size as u64
            };

            by_hash.entry(hash.clone()).or_default().push(FileRecord {
                path: full_path,
                modified,
                size,
                content_hash: hash,
            });
        }
    }

    reporter.on_root_complete(fs_dir_path, items, videos);
    info!(path = fs_dir_path, items, videos, "finished scanning root");
    Ok(())
}

/// Scans every configured raw scan root against the mount point and groups
/// matching files by content hash. Singleton hash groups are dropped; each
/// surviving group becomes a [`DuplicateSet`].
///
/// A root whose path calculation fails, or whose walk raises, is skipped
/// with a logged warning; the remaining roots still scan.
pub fn scan_paths(
    fs: &dyn FilesystemProvider,
    scan_roots: &[String],
    mount_point: &str,
    filter: &HashSet<String>,
    reporter: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> ScanOutcome {
    info!(roots = scan_roots.len(), "starting duplicate file scan");
    reporter.on_scan_start(scan_roots.len());

    let mut stats = ScanStats::default();
    let mut by_hash: BTreeMap<String, Vec<FileRecord>> = BTreeMap::new();

    for raw_root in scan_roots {
        if stats.cancelled {
            break;
        }
        let fs_dir_path = match mapper::calculate_fs_path(raw_root, mount_point) {
            Ok(path) => path,
            Err(err) => {
                warn!(scan_root = %raw_root, error = %err, "cannot determine scan path, skipping root");
                stats.roots_skipped += 1;
                continue;
            }
        };
        match scan_root(fs, &fs_dir_path, filter, reporter, cancel, &mut stats, &mut by_hash) {
            Ok(()) => stats.roots_scanned += 1,
            Err(err) => {
                error!(path = %fs_dir_path, error = %err, "error walking scan path, skipping root");
                stats.roots_failed += 1;
            }
        }
    }

    let sets: DuplicateSets = by_hash
        .into_iter()
        .filter(|(_, records)| records.len() >= 2)
        .map(|(hash, members)| {
            let set = DuplicateSet {
                content_hash: hash.clone(),
                members,
            };
            (hash, set)
        })
        .collect();

    let outcome = ScanOutcome { sets, stats };
    info!(
        items = outcome.stats.items_seen,
        videos = outcome.stats.videos_processed,
        attr_errors = outcome.stats.attr_errors,
        hash_skips = outcome.stats.hash_skips,
        roots_skipped = outcome.stats.roots_skipped,
        roots_failed = outcome.stats.roots_failed,
        "scan summary"
    );
    if outcome.sets.is_empty() {
        info!("no duplicate video files found");
    } else {
        info!(
            sets = outcome.set_count(),
            files = outcome.file_count(),
            "duplicate sets found"
        );
    }
    reporter.on_scan_complete(outcome.set_count(), outcome.file_count());
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_full_path_joins_with_single_slash() {
        assert_eq!(build_full_path("/movies", "a.mp4"), "/movies/a.mp4");
        assert_eq!(build_full_path("/movies/", "a.mp4"), "/movies/a.mp4");
        assert_eq!(build_full_path("/", "a.mp4"), "/a.mp4");
        assert_eq!(build_full_path("", "a.mp4"), "/a.mp4");
        assert_eq!(build_full_path("/movies", "/a.mp4"), "/movies/a.mp4");
        assert_eq!(build_full_path("\\movies\\hd", "a.mp4"), "/movies/hd/a.mp4");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("/a/b/Movie.MKV"), ".mkv");
        assert_eq!(extension_of("/a/b/archive.tar.gz"), ".gz");
        assert_eq!(extension_of("/a/b/noext"), "");
        assert_eq!(extension_of("/a/b/.hidden"), "");
    }
}
