use std::sync::Mutex;

use cloud_dedupe_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

/// CLI progress reporter using indicatif.
///
/// - Scan phase: spinner (total file count unknown upfront)
/// - Delete phase: progress bar (total known from the decision map)
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, roots: usize) {
        self.set_bar(Self::spinner(&format!(
            "Scanning {roots} root path(s) for duplicate videos..."
        )));
    }

    fn on_root_start(&self, fs_path: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Scanning '{fs_path}'..."));
        }
    }

    fn on_scan_progress(&self, fs_path: &str, items: u64, videos: u64) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!(
                "'{fs_path}': {items} items scanned, {videos} videos found"
            ));
        }
    }

    fn on_root_complete(&self, fs_path: &str, items: u64, videos: u64) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m '{}': {} items scanned, {} videos",
            fs_path, items, videos
        );
    }

    fn on_scan_complete(&self, sets: usize, files: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} duplicate sets ({} files)",
            sets, files
        );
    }

    fn on_delete_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Deleting [{bar:30.cyan/dim}] {pos}/{len} files {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_delete_progress(&self, current: usize, _total: usize, path: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(current as u64);
            pb.set_message(path.to_string());
        }
    }

    fn on_delete_complete(&self, deleted: usize, attempted: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Deletion complete: {} of {} files removed",
            deleted, attempted
        );
    }
}
