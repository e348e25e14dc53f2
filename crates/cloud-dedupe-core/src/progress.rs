/// Trait for reporting scan and delete progress.
///
/// The CLI implements this with indicatif bars; a GUI host would forward the
/// callbacks to its event loop. All methods have default no-op
/// implementations, and delivery is advisory only: the algorithms never
/// depend on a callback being observed.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _roots: usize) {}
    fn on_root_start(&self, _fs_path: &str) {}
    fn on_scan_progress(&self, _fs_path: &str, _items: u64, _videos: u64) {}
    fn on_root_complete(&self, _fs_path: &str, _items: u64, _videos: u64) {}
    fn on_scan_complete(&self, _sets: usize, _files: usize) {}
    fn on_delete_start(&self, _total: usize) {}
    fn on_delete_progress(&self, _current: usize, _total: usize, _path: &str) {}
    fn on_delete_complete(&self, _deleted: usize, _attempted: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
