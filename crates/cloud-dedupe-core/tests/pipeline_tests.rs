use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tempfile::tempdir;

use cloud_dedupe_core::provider::{FileAttributes, FilesystemProvider, WalkEntry, SHA1_HASH_KEY};
use cloud_dedupe_core::{
    deleter, resolve, scanner, AppConfig, CancelFlag, Decision, DedupeEngine, Error, LocalProvider,
    ProgressReporter, Rule, ScanOutcome, SilentReporter,
};

fn hash(seed: char) -> String {
    seed.to_ascii_uppercase().to_string().repeat(40)
}

fn mp4_filter() -> HashSet<String> {
    [".mp4", ".mkv"].iter().map(|s| s.to_string()).collect()
}

/// In-memory provider with per-path failure injection.
#[derive(Default)]
struct MockProvider {
    entries: Vec<WalkEntry>,
    attrs: HashMap<String, FileAttributes>,
    fail_attrs: HashSet<String>,
    fail_walks: HashSet<String>,
    fail_removes: HashSet<String>,
    removed: Mutex<Vec<String>>,
}

impl MockProvider {
    fn add_dir(&mut self, folder: &str, files: &[&str]) {
        self.entries.push(WalkEntry {
            folder: folder.to_string(),
            subfolders: Vec::new(),
            files: files.iter().map(|f| f.to_string()).collect(),
        });
    }

    fn add_file(&mut self, path: &str, digest: &str, modified: Option<&str>, size: i64) {
        let mut file_hashes = HashMap::new();
        if !digest.is_empty() {
            file_hashes.insert(SHA1_HASH_KEY.to_string(), digest.to_string());
        }
        self.attrs.insert(
            path.to_string(),
            FileAttributes {
                file_hashes,
                modified_time: modified.map(|m| m.to_string()),
                size,
            },
        );
    }
}

impl FilesystemProvider for MockProvider {
    fn list_root(&self) -> Result<Vec<String>, Error> {
        Ok(self.entries.iter().map(|e| e.folder.clone()).collect())
    }

    fn walk(
        &self,
        path: &str,
    ) -> Result<Box<dyn Iterator<Item = Result<WalkEntry, Error>> + '_>, Error> {
        if self.fail_walks.contains(path) {
            return Err(Error::Walk {
                path: path.to_string(),
                message: "simulated walk failure".to_string(),
            });
        }
        let prefix = if path == "/" {
            "/".to_string()
        } else {
            format!("{path}/")
        };
        let matching: Vec<Result<WalkEntry, Error>> = self
            .entries
            .iter()
            .filter(|e| e.folder == path || e.folder.starts_with(&prefix))
            .cloned()
            .map(Ok)
            .collect();
        Ok(Box::new(matching.into_iter()))
    }

    fn get_attributes(&self, path: &str) -> Result<FileAttributes, Error> {
        if self.fail_attrs.contains(path) {
            return Err(Error::Provider(format!("simulated attribute failure: {path}")));
        }
        self.attrs
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Provider(format!("no attributes for {path}")))
    }

    fn remove(&self, path: &str) -> Result<(), Error> {
        if self.fail_removes.contains(path) {
            return Err(Error::Provider(format!("simulated remove failure: {path}")));
        }
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

fn scan_single_root(provider: &MockProvider, root: &str) -> ScanOutcome {
    scanner::scan_paths(
        provider,
        &[root.to_string()],
        "/",
        &mp4_filter(),
        &SilentReporter,
        &CancelFlag::new(),
    )
}

#[test]
fn test_scan_groups_by_hash_and_drops_singletons() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4", "c.mp4"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), Some("2024-01-01T00:00:00Z"), 100);
    provider.add_file("/Movies/b.mp4", &hash('a'), Some("2024-01-02T00:00:00Z"), 100);
    provider.add_file("/Movies/c.mp4", &hash('c'), Some("2024-01-03T00:00:00Z"), 200);

    let outcome = scan_single_root(&provider, "/Movies");

    assert_eq!(outcome.set_count(), 1);
    let set = outcome.sets.get(&hash('a')).unwrap();
    assert_eq!(set.members.len(), 2);
    assert_eq!(outcome.stats.videos_processed, 3);
    assert_eq!(outcome.stats.items_seen, 3);
    assert_eq!(outcome.stats.roots_scanned, 1);
}

#[test]
fn test_scan_ignores_non_video_extensions() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4", "notes.txt", "cover.jpg"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), None, 100);
    provider.add_file("/Movies/b.mp4", &hash('a'), None, 100);

    let outcome = scan_single_root(&provider, "/Movies");

    assert_eq!(outcome.stats.items_seen, 4);
    assert_eq!(outcome.stats.videos_processed, 2);
    assert_eq!(outcome.set_count(), 1);
}

#[test]
fn test_scan_skips_missing_and_short_hashes() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4", "short.mp4", "none.mp4"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), None, 100);
    provider.add_file("/Movies/b.mp4", &hash('a'), None, 100);
    provider.add_file("/Movies/short.mp4", "ABC123", None, 100);
    provider.add_file("/Movies/none.mp4", "", None, 100);

    let outcome = scan_single_root(&provider, "/Movies");

    assert_eq!(outcome.stats.hash_skips, 2);
    assert_eq!(outcome.set_count(), 1);
    assert!(outcome
        .sets
        .values()
        .all(|s| s.members.iter().all(|m| m.content_hash.len() >= 40)));
}

#[test]
fn test_scan_standardizes_hash_case() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4"]);
    provider.add_file("/Movies/a.mp4", &"a".repeat(40), None, 100);
    provider.add_file("/Movies/b.mp4", &"A".repeat(40), None, 100);

    let outcome = scan_single_root(&provider, "/Movies");

    // Same digest in different case is the same content.
    assert_eq!(outcome.set_count(), 1);
    assert!(outcome.sets.contains_key(&"A".repeat(40)));
}

#[test]
fn test_scan_keeps_file_with_unparseable_date() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), Some("not a date"), 100);
    provider.add_file("/Movies/b.mp4", &hash('a'), Some("2024-01-01 10:00:00"), 100);

    let outcome = scan_single_root(&provider, "/Movies");

    assert_eq!(outcome.stats.unparsed_dates, 1);
    let set = outcome.sets.get(&hash('a')).unwrap();
    let a = set.members.iter().find(|m| m.path == "/Movies/a.mp4").unwrap();
    let b = set.members.iter().find(|m| m.path == "/Movies/b.mp4").unwrap();
    assert!(a.modified.is_none());
    assert!(b.modified.is_some());
}

#[test]
fn test_scan_clamps_negative_size() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), None, -5);
    provider.add_file("/Movies/b.mp4", &hash('a'), None, 100);

    let outcome = scan_single_root(&provider, "/Movies");
    let set = outcome.sets.get(&hash('a')).unwrap();
    let a = set.members.iter().find(|m| m.path == "/Movies/a.mp4").unwrap();
    assert_eq!(a.size, 0);
}

#[test]
fn test_attribute_error_skips_file_and_continues() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4", "c.mp4"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), None, 100);
    provider.add_file("/Movies/b.mp4", &hash('a'), None, 100);
    provider.add_file("/Movies/c.mp4", &hash('a'), None, 100);
    provider.fail_attrs.insert("/Movies/b.mp4".to_string());

    let outcome = scan_single_root(&provider, "/Movies");

    assert_eq!(outcome.stats.attr_errors, 1);
    let set = outcome.sets.get(&hash('a')).unwrap();
    assert_eq!(set.members.len(), 2);
    assert!(set.members.iter().all(|m| m.path != "/Movies/b.mp4"));
}

#[test]
fn test_walk_failure_is_isolated_per_root() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Good", &["a.mp4", "b.mp4"]);
    provider.add_file("/Good/a.mp4", &hash('a'), None, 100);
    provider.add_file("/Good/b.mp4", &hash('a'), None, 100);
    provider.fail_walks.insert("/Bad".to_string());

    let outcome = scanner::scan_paths(
        &provider,
        &["/Bad".to_string(), "/Good".to_string()],
        "/",
        &mp4_filter(),
        &SilentReporter,
        &CancelFlag::new(),
    );

    assert_eq!(outcome.stats.roots_failed, 1);
    assert_eq!(outcome.stats.roots_scanned, 1);
    assert_eq!(outcome.set_count(), 1);
}

#[test]
fn test_path_mismatch_root_skipped_others_scan() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Media", &["a.mp4", "b.mp4"]);
    provider.add_file("/Media/a.mp4", &hash('a'), None, 100);
    provider.add_file("/Media/b.mp4", &hash('a'), None, 100);

    let outcome = scanner::scan_paths(
        &provider,
        &["/Other".to_string(), "/Cloud/Media".to_string()],
        "/Cloud",
        &mp4_filter(),
        &SilentReporter,
        &CancelFlag::new(),
    );

    assert_eq!(outcome.stats.roots_skipped, 1);
    assert_eq!(outcome.stats.roots_scanned, 1);
    assert_eq!(outcome.set_count(), 1);
}

struct CountingReporter {
    progress_calls: AtomicUsize,
}

impl ProgressReporter for CountingReporter {
    fn on_scan_progress(&self, _fs_path: &str, _items: u64, _videos: u64) {
        self.progress_calls.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_scan_reports_progress_periodically() {
    let mut provider = MockProvider::default();
    let names: Vec<String> = (0..450).map(|i| format!("file{i:04}.mp4")).collect();
    let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    provider.add_dir("/Movies", &name_refs);
    for (i, name) in names.iter().enumerate() {
        // Unique hashes: progress cadence must not depend on duplicates.
        let digest = format!("{i:040X}");
        provider.add_file(&format!("/Movies/{name}"), &digest, None, 10);
    }

    let reporter = CountingReporter {
        progress_calls: AtomicUsize::new(0),
    };
    scanner::scan_paths(
        &provider,
        &["/Movies".to_string()],
        "/",
        &mp4_filter(),
        &reporter,
        &CancelFlag::new(),
    );

    assert_eq!(reporter.progress_calls.load(Ordering::Relaxed), 2);
}

#[test]
fn test_cancelled_scan_stops_issuing_work() {
    let mut provider = MockProvider::default();
    provider.add_dir("/Movies", &["a.mp4", "b.mp4"]);
    provider.add_file("/Movies/a.mp4", &hash('a'), None, 100);
    provider.add_file("/Movies/b.mp4", &hash('a'), None, 100);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let outcome = scanner::scan_paths(
        &provider,
        &["/Movies".to_string()],
        "/",
        &mp4_filter(),
        &SilentReporter,
        &cancel,
    );

    assert!(outcome.stats.cancelled);
    assert_eq!(outcome.stats.items_seen, 0);
    assert!(outcome.sets.is_empty());
}

#[test]
fn test_delete_isolates_per_file_failures() {
    let mut provider = MockProvider::default();
    provider.fail_removes.insert("/Movies/bad.mp4".to_string());
    let paths = vec![
        "/Movies/one.mp4".to_string(),
        "/Movies/bad.mp4".to_string(),
        "/Movies/two.mp4".to_string(),
    ];

    let outcome = deleter::delete_files(&provider, &paths, &SilentReporter, &CancelFlag::new());

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.deleted, 2);
    assert_eq!(outcome.failures, vec!["/Movies/bad.mp4".to_string()]);
    let removed = provider.removed.lock().unwrap();
    assert_eq!(removed.len(), 2);
}

#[test]
fn test_delete_normalizes_backslashes() {
    let provider = MockProvider::default();
    let paths = vec!["\\Movies\\one.mp4".to_string()];
    let outcome = deleter::delete_files(&provider, &paths, &SilentReporter, &CancelFlag::new());

    assert_eq!(outcome.deleted, 1);
    assert_eq!(
        *provider.removed.lock().unwrap(),
        vec!["/Movies/one.mp4".to_string()]
    );
}

#[test]
fn test_cancelled_delete_touches_nothing() {
    let provider = MockProvider::default();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let paths = vec!["/Movies/one.mp4".to_string()];

    let outcome = deleter::delete_files(&provider, &paths, &SilentReporter, &cancel);
    assert_eq!(outcome.attempted, 0);
    assert_eq!(outcome.deleted, 0);
    assert!(provider.removed.lock().unwrap().is_empty());
}

fn test_config(scan_paths: Vec<String>, mount_point: &str) -> AppConfig {
    AppConfig {
        address: "127.0.0.1:19798".to_string(),
        account: String::new(),
        password: String::new(),
        scan_paths,
        mount_point: mount_point.to_string(),
        video_extensions: vec![".mp4".to_string()],
    }
}

#[test]
fn test_engine_requires_connection() {
    let engine = DedupeEngine::new(test_config(vec!["/Movies".to_string()], "/"));
    assert!(!engine.is_connected());
    assert!(matches!(
        engine.scan(&SilentReporter, &CancelFlag::new()),
        Err(Error::NotConnected)
    ));
    assert!(matches!(
        engine.delete(&["/a.mp4".to_string()], &SilentReporter, &CancelFlag::new()),
        Err(Error::NotConnected)
    ));
}

#[test]
fn test_engine_rejects_empty_scan_roots() {
    let mut engine = DedupeEngine::new(test_config(Vec::new(), "/"));
    engine.connect(Box::new(MockProvider::default())).unwrap();
    assert!(matches!(
        engine.scan(&SilentReporter, &CancelFlag::new()),
        Err(Error::NoScanRoots)
    ));
}

#[test]
fn test_end_to_end_scan_resolve_delete_on_local_tree() {
    let tmp = tempdir().unwrap();
    let movies = tmp.path().join("Movies");
    fs::create_dir_all(movies.join("sub")).unwrap();
    fs::write(movies.join("dup.mp4"), b"identical video bytes").unwrap();
    fs::write(movies.join("sub").join("dup-copy.mp4"), b"identical video bytes").unwrap();
    fs::write(movies.join("unique.mp4"), b"different video bytes").unwrap();

    let mount = tmp.path().to_string_lossy().into_owned();
    let config = test_config(vec![format!("{mount}/Movies")], &mount);

    let mut engine = DedupeEngine::new(config);
    engine
        .connect(Box::new(LocalProvider::new(tmp.path())))
        .unwrap();

    let cancel = CancelFlag::new();
    let outcome = engine.scan(&SilentReporter, &cancel).unwrap();
    assert_eq!(outcome.set_count(), 1);
    let set = outcome.sets.values().next().unwrap();
    assert_eq!(set.members.len(), 2);

    let decisions = resolve(&outcome.sets, &Rule::ShortestPath).unwrap();
    assert_eq!(decisions.get("/Movies/dup.mp4"), Some(Decision::Keep));
    assert_eq!(decisions.get("/Movies/sub/dup-copy.mp4"), Some(Decision::Delete));

    let deletions = decisions.deletions();
    let delete_outcome = engine.delete(&deletions, &SilentReporter, &cancel).unwrap();
    assert_eq!(delete_outcome.deleted, 1);
    assert!(delete_outcome.failures.is_empty());

    assert!(movies.join("dup.mp4").exists());
    assert!(movies.join("unique.mp4").exists());
    assert!(!movies.join("sub").join("dup-copy.mp4").exists());
}
