pub mod cancel;
pub mod config;
pub mod datetime;
pub mod decisions;
pub mod deleter;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod model;
pub mod progress;
pub mod provider;
pub mod report;
pub mod resolver;
pub mod scanner;

pub use cancel::CancelFlag;
pub use config::AppConfig;
pub use decisions::{Decision, Decisions, ToggleOutcome};
pub use engine::DedupeEngine;
pub use error::Error;
pub use model::{DeleteOutcome, DuplicateSet, DuplicateSets, FileRecord, ScanOutcome, ScanStats};
pub use progress::{ProgressReporter, SilentReporter};
pub use provider::{FileAttributes, FilesystemProvider, LocalProvider, WalkEntry};
pub use resolver::{resolve, Rule};
