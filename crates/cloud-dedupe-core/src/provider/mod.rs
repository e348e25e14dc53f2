pub mod local;

use std::collections::HashMap;

use crate::error::Error;

pub use local::LocalProvider;

/// Attribute-map key under which the drive API reports the SHA-1 digest.
pub const SHA1_HASH_KEY: &str = "2";

/// Per-file metadata as reported by the drive.
#[derive(Debug, Clone, Default)]
pub struct FileAttributes {
    /// Digests keyed by algorithm id; SHA-1 lives under [`SHA1_HASH_KEY`].
    pub file_hashes: HashMap<String, String>,
    /// Raw modification-time string, parsed leniently by the scanner.
    pub modified_time: Option<String>,
    /// Size in bytes as reported; negative values are treated as 0.
    pub size: i64,
}

/// One directory visited during a recursive walk.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub folder: String,
    pub subfolders: Vec<String>,
    pub files: Vec<String>,
}

/// Access to the remote drive. Implemented over the cloud API in the host
/// application and over a local directory tree by [`LocalProvider`].
///
/// Calls may block for as long as the remote takes; no timeout is imposed
/// here. Callers run scans and deletions off the interactive thread.
pub trait FilesystemProvider: Send + Sync {
    /// Lists the names directly under `/`. Used only to validate
    /// connectivity.
    fn list_root(&self) -> Result<Vec<String>, Error>;

    /// Lazy recursive walk rooted at `path`. Errors yielded mid-iteration
    /// abort the walk of that root only.
    fn walk(&self, path: &str)
        -> Result<Box<dyn Iterator<Item = Result<WalkEntry, Error>> + '_>, Error>;

    fn get_attributes(&self, path: &str) -> Result<FileAttributes, Error>;

    fn remove(&self, path: &str) -> Result<(), Error>;
}
