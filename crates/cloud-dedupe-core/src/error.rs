use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid characters in path input: {details}")]
    InvalidCharacters { details: String },

    #[error("scan path '{scan_root}' does not resolve under mount point '{mount_point}'")]
    PathMismatch {
        scan_root: String,
        mount_point: String,
    },

    #[error("a suffix is required for the keep-suffix rule")]
    MissingSuffix,

    #[error("not connected to the drive provider")]
    NotConnected,

    #[error("no scan roots configured")]
    NoScanRoots,

    #[error("error walking '{path}': {message}")]
    Walk { path: String, message: String },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
