use tracing::info;

use crate::cancel::CancelFlag;
use crate::config::AppConfig;
use crate::deleter;
use crate::error::Error;
use crate::model::{DeleteOutcome, ScanOutcome};
use crate::progress::ProgressReporter;
use crate::provider::FilesystemProvider;
use crate::scanner;

/// Facade over the scan → resolve → delete pipeline.
///
/// Owns the configuration and, once [`connect`](DedupeEngine::connect) has
/// succeeded, the drive provider. Scanning and deleting on a disconnected
/// engine fail fast with [`Error::NotConnected`].
///
/// One scan or one deletion in flight at a time: the outputs are immutable
/// snapshots, and the engine itself is not meant to be shared across threads
/// running overlapping operations.
pub struct DedupeEngine {
    config: AppConfig,
    fs: Option<Box<dyn FilesystemProvider>>,
}

impl DedupeEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config, fs: None }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.fs.is_some()
    }

    /// Adopts a provider after validating connectivity by listing the remote
    /// root.
    pub fn connect(&mut self, provider: Box<dyn FilesystemProvider>) -> Result<(), Error> {
        info!("testing connection by listing the remote root");
        provider.list_root()?;
        info!("connection successful");
        self.fs = Some(provider);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.fs = None;
    }

    fn provider(&self) -> Result<&dyn FilesystemProvider, Error> {
        self.fs.as_deref().ok_or(Error::NotConnected)
    }

    /// Scans every configured root and returns the duplicate sets found.
    pub fn scan(
        &self,
        reporter: &dyn ProgressReporter,
        cancel: &CancelFlag,
    ) -> Result<ScanOutcome, Error> {
        let fs = self.provider()?;
        if self.config.scan_paths.is_empty() {
            return Err(Error::NoScanRoots);
        }
        let filter = self.config.extension_filter();
        Ok(scanner::scan_paths(
            fs,
            &self.config.scan_paths,
            &self.config.mount_point,
            &filter,
            reporter,
            cancel,
        ))
    }

    /// Deletes the given remote paths, isolating per-file failures.
    pub fn delete(
        &self,
        paths: &[String],
        reporter: &dyn ProgressReporter,
        cancel: &CancelFlag,
    ) -> Result<DeleteOutcome, Error> {
        let fs = self.provider()?;
        Ok(deleter::delete_files(fs, paths, reporter, cancel))
    }
}
